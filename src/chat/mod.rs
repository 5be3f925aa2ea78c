//! Chat application module for the moderated customer-service assistant.
//!
//! This module provides a REPL chat interface built on top of the
//! parcelchat client library. It supports:
//!
//! - A moderation gate in front of every question
//! - A bounded context window replayed on each completion request
//! - Seeding the history from a YAML knowledge base
//! - Slash commands for inspecting the session
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`history`]: Conversation turns and context window construction
//! - [`knowledge`]: Seed turns loaded before the first question
//! - [`session`]: Moderation, completion and history bookkeeping per turn
//! - [`audit`]: Optional record of blocked inputs
//! - [`commands`]: Slash command parsing
//! - [`interrupt`]: Ctrl+C cancellation of an in-flight turn
//! - [`render`]: Terminal output

mod audit;
mod commands;
mod config;
mod history;
mod interrupt;
mod knowledge;
mod render;
mod session;

pub use audit::{AuditLog, AuditRecord};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{
    ChatArgs, ChatArgsError, ChatConfig, DEFAULT_FREQUENCY_PENALTY, DEFAULT_INSTRUCTIONS,
    DEFAULT_MAX_TOKENS, DEFAULT_PRESENCE_PENALTY, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
    MAX_CONTEXT_QUESTIONS, SeedSource,
};
pub use history::{ConversationHistory, ConversationTurn, build_context};
pub use interrupt::Interrupt;
pub use knowledge::KnowledgeBase;
pub use render::{ANSWER_LABEL, BLOCKED_HEADER, PROMPT_LABEL, PlainTextRenderer, Renderer};
pub use session::{
    ChatSession, ModerationVerdict, SessionStats, TurnError, TurnOutcome, completion_params,
};
