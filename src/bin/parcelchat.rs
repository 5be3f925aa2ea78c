//! Interactive customer-service chat with a moderation gate.
//!
//! Every question is checked by the moderation endpoint before it reaches the
//! model. Answered turns are kept and the most recent ones are replayed as
//! context on each request.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with the built-in knowledge base
//! parcelchat
//!
//! # Start from an empty history and replay only the last 3 turns
//! parcelchat --no-seed --max-context-questions 3
//!
//! # Seed from your own FAQ and keep a record of blocked questions
//! parcelchat --knowledge-base faq.yaml --audit-log blocked.jsonl
//!
//! # Disable colors (useful for piping output)
//! parcelchat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/history [n]` - Show recent turns
//! - `/stats` - Show session statistics
//! - `/config` - Show the configuration
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::time::Duration;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use parcelchat::chat::{
    AuditLog, ChatArgs, ChatCommand, ChatConfig, ChatSession, Interrupt, KnowledgeBase,
    PlainTextRenderer, Renderer, TurnOutcome, help_text, parse_command,
};
use parcelchat::{ChatService, JsonLinesLogger, OpenAi};

/// Main entry point for the parcelchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let (args, _) = ChatArgs::from_command_line_relaxed("parcelchat [OPTIONS]");
    let explicit_instructions = args.instructions.is_some();
    let instructions_file = args.instructions_file.clone();
    let mut config = ChatConfig::try_from(args)?;

    let knowledge = KnowledgeBase::load(&config.seed)?;
    if !explicit_instructions {
        if let Some(path) = instructions_file {
            let text = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read instructions file {path}: {err}"))?;
            config = config.with_instructions(text.trim());
        } else if let Some(instructions) = knowledge.instructions.clone() {
            config = config.with_instructions(instructions);
        }
    }

    let mut client = OpenAi::with_options(
        None,
        config.base_url.clone(),
        config.timeout_secs.map(Duration::from_secs),
    )?;
    if let Some(path) = &config.request_log {
        client = client.with_logger(Arc::new(JsonLinesLogger::open(path)?));
    }

    let audit = match &config.audit_log {
        Some(path) => Some(AuditLog::open(path)?),
        None => None,
    };

    let use_color = config.use_color;
    let mut session = ChatSession::with_history(client, config, knowledge.into_history());
    if let Some(audit) = audit {
        session = session.with_audit_log(audit);
    }
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Ctrl+C while a request is in flight cancels the turn
    let interrupt = Arc::new(Interrupt::new());

    let interrupt_clone = interrupt.clone();
    ctrlc::set_handler(move || {
        interrupt_clone.trigger();
    })?;

    println!("Parcel Chat (model: {})", session.model());
    println!(
        "{} seed turns loaded, replaying up to {} per question",
        session.stats().seeded_turns,
        session.config().max_context_questions
    );
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline(&renderer.prompt());

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line.as_str());

                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for help_line in help_text().lines() {
                                println!("    {}", help_line);
                            }
                        }
                        ChatCommand::Stats => print_stats(&session),
                        ChatCommand::ShowConfig => print_config(&session),
                        ChatCommand::History(count) => print_history(&session, count),
                        ChatCommand::Invalid(message) => renderer.print_error(&message),
                    }
                    continue;
                }

                let result = tokio::select! {
                    result = session.submit(&line) => Some(result),
                    _ = interrupt.triggered() => None,
                };

                match result {
                    Some(Ok(TurnOutcome::Answered(answer))) => renderer.print_answer(&answer),
                    Some(Ok(TurnOutcome::Blocked {
                        categories,
                        audit_error,
                    })) => {
                        let descriptions: Vec<&str> =
                            categories.iter().map(|c| c.description()).collect();
                        renderer.print_blocked(&descriptions);
                        if let Some(err) = audit_error {
                            renderer.print_error(&format!("Failed to record blocked input: {err}"));
                        }
                    }
                    Some(Err(err)) => {
                        renderer.print_error(&err.to_string());
                        if err.is_retryable() {
                            renderer.print_info("You can ask the question again.");
                        }
                    }
                    None => {
                        println!();
                        renderer.print_info("Request cancelled.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats<S: ChatService>(session: &ChatSession<S>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!(
        "      Turns: {} ({} seeded, {} answered this session)",
        stats.turn_count,
        stats.seeded_turns,
        stats.turn_count.saturating_sub(stats.seeded_turns)
    );
    println!("      Blocked by moderation: {}", stats.blocked_count);
    println!("      Failed: {}", stats.failed_count);
    println!(
        "      Total tokens: {} in / {} out ({} requests)",
        stats.total_prompt_tokens, stats.total_completion_tokens, stats.total_requests
    );
    if let Some(usage) = stats.last_turn_usage {
        println!(
            "      Last turn tokens: {} in / {} out",
            usage.prompt_tokens, usage.completion_tokens
        );
    }
}

fn print_config<S: ChatService>(session: &ChatSession<S>) {
    let config = session.config();
    println!("    Current Configuration:");
    println!("      Model: {}", config.model);
    println!("      Temperature: {:.2}", config.temperature);
    println!("      Max tokens: {}", config.max_tokens);
    println!("      Top-p: {:.2}", config.top_p);
    println!("      Frequency penalty: {:.2}", config.frequency_penalty);
    println!("      Presence penalty: {:.2}", config.presence_penalty);
    println!("      Context window: {} turns", config.max_context_questions);
    println!("      Instructions: {}", config.instructions);
    match session.audit_log() {
        Some(audit) => println!("      Audit log: {}", audit.path().display()),
        None => println!("      Audit log: (disabled)"),
    }
    match config.request_log {
        Some(ref path) => println!("      Request log: {}", path.display()),
        None => println!("      Request log: (disabled)"),
    }
}

fn print_history<S: ChatService>(session: &ChatSession<S>, count: Option<usize>) {
    let count = count.unwrap_or(session.config().max_context_questions);
    let turns = session.history().recent(count);
    if turns.is_empty() {
        println!("    (no turns)");
        return;
    }
    let first = session.history().len() - turns.len();
    for (offset, turn) in turns.iter().enumerate() {
        println!("    [{}] Q: {}", first + offset + 1, turn.question());
        println!("        A: {}", turn.answer());
    }
}
