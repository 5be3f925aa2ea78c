//! Core chat session management.
//!
//! This module provides the `ChatSession` struct, which owns the
//! conversation history and runs each operator input through moderation and
//! then completion.

use std::error;
use std::fmt;

use crate::chat::audit::AuditLog;
use crate::chat::config::ChatConfig;
use crate::chat::history::{ConversationHistory, ConversationTurn, build_context};
use crate::error::Error;
use crate::observability::{
    COMPLETION_MALFORMED, MODERATION_BLOCKED, SESSION_CONTEXT_MESSAGES, SESSION_TURNS,
};
use crate::service::ChatService;
use crate::types::{ChatCompletionParams, ModerationCategory, ModerationParams, Model, Usage};

/// Outcome of a moderation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationVerdict {
    /// The input may be sent to the model.
    Clear,
    /// The input was flagged; never empty.
    Blocked(Vec<ModerationCategory>),
}

impl ModerationVerdict {
    /// Returns true if the input may be sent to the model.
    pub fn is_clear(&self) -> bool {
        matches!(self, ModerationVerdict::Clear)
    }

    /// Flagged categories, empty when clear.
    pub fn categories(&self) -> &[ModerationCategory] {
        match self {
            ModerationVerdict::Clear => &[],
            ModerationVerdict::Blocked(categories) => categories,
        }
    }

    /// Operator-facing descriptions of every flagged category.
    pub fn descriptions(&self) -> Vec<&'static str> {
        self.categories()
            .iter()
            .map(ModerationCategory::description)
            .collect()
    }
}

/// Successful result of submitting one input.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model answered and the turn was appended to history.
    Answered(String),
    /// Moderation rejected the input; history is unchanged.
    Blocked {
        /// Categories the input was flagged for.
        categories: Vec<ModerationCategory>,
        /// Set when the blocked input could not be written to the audit log.
        audit_error: Option<Error>,
    },
}

/// A turn that failed; history is unchanged and the session stays usable.
#[derive(Debug, Clone)]
pub enum TurnError {
    /// The moderation call itself failed.
    ModerationService(Error),
    /// The completion call failed (transport, auth, rate limit, ...).
    CompletionService(Error),
    /// The completion service answered without usable text.
    MalformedResponse(String),
}

impl TurnError {
    /// Returns true if asking again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnError::ModerationService(err) | TurnError::CompletionService(err) => {
                err.is_retryable()
            }
            TurnError::MalformedResponse(_) => true,
        }
    }
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::ModerationService(err) => write!(f, "moderation service failed: {err}"),
            TurnError::CompletionService(err) => write!(f, "completion service failed: {err}"),
            TurnError::MalformedResponse(message) => {
                write!(f, "malformed completion response: {message}")
            }
        }
    }
}

impl error::Error for TurnError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            TurnError::ModerationService(err) | TurnError::CompletionService(err) => Some(err),
            TurnError::MalformedResponse(_) => None,
        }
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// Turns in history, seed turns included.
    pub turn_count: usize,
    /// Turns that came from the knowledge base.
    pub seeded_turns: usize,
    /// Upper bound on turns replayed per request.
    pub max_context_questions: usize,
    /// Inputs rejected by moderation.
    pub blocked_count: u64,
    /// Inputs that failed with a service error.
    pub failed_count: u64,
    /// Completion requests sent.
    pub total_requests: u64,
    /// Prompt tokens across all completions.
    pub total_prompt_tokens: u64,
    /// Completion tokens across all completions.
    pub total_completion_tokens: u64,
    /// Token usage for the last answered turn, if reported.
    pub last_turn_usage: Option<Usage>,
}

/// Builds the completion request for `new_question` from the session config.
pub fn completion_params(
    config: &ChatConfig,
    history: &ConversationHistory,
    new_question: &str,
) -> ChatCompletionParams {
    ChatCompletionParams::new(
        config.model.clone(),
        build_context(config, history, new_question),
    )
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens)
    .with_top_p(config.top_p)
    .with_frequency_penalty(config.frequency_penalty)
    .with_presence_penalty(config.presence_penalty)
}

/// A chat session that owns the conversation and talks to the services.
pub struct ChatSession<S: ChatService> {
    service: S,
    config: ChatConfig,
    history: ConversationHistory,
    seeded_turns: usize,
    audit: Option<AuditLog>,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
    blocked_count: u64,
    failed_count: u64,
}

impl<S: ChatService> ChatSession<S> {
    /// Creates a new chat session with an empty history.
    pub fn new(service: S, config: ChatConfig) -> Self {
        Self::with_history(service, config, ConversationHistory::new())
    }

    /// Creates a chat session whose history starts with `history`.
    ///
    /// Those turns count as seed turns in [`SessionStats`].
    pub fn with_history(service: S, config: ChatConfig, history: ConversationHistory) -> Self {
        let seeded_turns = history.len();
        Self {
            service,
            config,
            history,
            seeded_turns,
            audit: None,
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
            blocked_count: 0,
            failed_count: 0,
        }
    }

    /// Records blocked inputs to `audit`.
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Runs `text` through the moderation service.
    ///
    /// Flagged results whose categories all fall outside the taxonomy are
    /// treated as clear.
    pub async fn check_moderation(&self, text: &str) -> Result<ModerationVerdict, TurnError> {
        let response = self
            .service
            .moderate(ModerationParams::new(text))
            .await
            .map_err(TurnError::ModerationService)?;
        let Some(result) = response.results.first() else {
            return Err(TurnError::ModerationService(Error::serialization(
                "moderation response contained no results",
                None,
            )));
        };
        if !result.flagged {
            return Ok(ModerationVerdict::Clear);
        }
        let categories = result.flagged_categories();
        if categories.is_empty() {
            Ok(ModerationVerdict::Clear)
        } else {
            Ok(ModerationVerdict::Blocked(categories))
        }
    }

    /// Asks the model `question` with the current context window.
    ///
    /// Does not touch history; see [`ChatSession::submit`].
    pub async fn respond(&self, question: &str) -> Result<String, TurnError> {
        self.request_answer(question).await.map(|(answer, _)| answer)
    }

    /// Handles one operator input end to end.
    ///
    /// A clear input that gets an answer appends exactly one turn. A blocked
    /// or failed input appends nothing.
    pub async fn submit(&mut self, input: &str) -> Result<TurnOutcome, TurnError> {
        let verdict = match self.check_moderation(input).await {
            Ok(verdict) => verdict,
            Err(err) => {
                self.failed_count += 1;
                return Err(err);
            }
        };

        if let ModerationVerdict::Blocked(categories) = verdict {
            MODERATION_BLOCKED.click();
            self.blocked_count += 1;
            let audit_error = match self.audit.as_mut() {
                Some(audit) => audit.record(input, &categories).err(),
                None => None,
            };
            return Ok(TurnOutcome::Blocked {
                categories,
                audit_error,
            });
        }

        self.request_count += 1;
        match self.request_answer(input).await {
            Ok((answer, usage)) => {
                if let Some(usage) = usage {
                    self.usage_totals = self.usage_totals + usage;
                }
                self.last_turn_usage = usage;
                self.history.push(ConversationTurn::new(input, answer.as_str()));
                SESSION_TURNS.click();
                Ok(TurnOutcome::Answered(answer))
            }
            Err(err) => {
                self.failed_count += 1;
                Err(err)
            }
        }
    }

    async fn request_answer(&self, question: &str) -> Result<(String, Option<Usage>), TurnError> {
        let params = completion_params(&self.config, &self.history, question);
        SESSION_CONTEXT_MESSAGES.add(params.messages.len() as f64);
        let completion = self.service.complete(params).await.map_err(|err| {
            if err.is_serialization() {
                COMPLETION_MALFORMED.click();
                TurnError::MalformedResponse(err.to_string())
            } else {
                TurnError::CompletionService(err)
            }
        })?;
        if completion.choices.is_empty() {
            COMPLETION_MALFORMED.click();
            return Err(TurnError::MalformedResponse(
                "response contained no choices".to_string(),
            ));
        }
        match completion.first_text() {
            Some(text) => Ok((text.to_string(), completion.usage)),
            None => {
                COMPLETION_MALFORMED.click();
                Err(TurnError::MalformedResponse(
                    "top choice has no text content".to_string(),
                ))
            }
        }
    }

    /// The conversation so far, oldest first.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Returns the audit log, if one is attached.
    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            turn_count: self.history.len(),
            seeded_turns: self.seeded_turns,
            max_context_questions: self.config.max_context_questions,
            blocked_count: self.blocked_count,
            failed_count: self.failed_count,
            total_requests: self.request_count,
            total_prompt_tokens: u64::from(self.usage_totals.prompt_tokens),
            total_completion_tokens: u64::from(self.usage_totals.completion_tokens),
            last_turn_usage: self.last_turn_usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn completion_params_carry_sampling_settings() {
        let config = ChatConfig::new();
        let params = completion_params(&config, &ConversationHistory::new(), "Hello");
        assert_eq!(params.model, Model::Known(KnownModel::Gpt35Turbo));
        assert_eq!(params.temperature, Some(0.5));
        assert_eq!(params.max_tokens, Some(500));
        assert_eq!(params.top_p, Some(1.0));
        assert_eq!(params.frequency_penalty, Some(0.0));
        assert_eq!(params.presence_penalty, Some(0.6));
        assert_eq!(params.messages.len(), 2);
    }

    #[test]
    fn verdict_descriptions() {
        let verdict = ModerationVerdict::Blocked(vec![ModerationCategory::Violence]);
        assert!(!verdict.is_clear());
        assert_eq!(
            verdict.descriptions(),
            vec![ModerationCategory::Violence.description()]
        );
        assert!(ModerationVerdict::Clear.descriptions().is_empty());
    }

    #[test]
    fn turn_error_display() {
        let err = TurnError::CompletionService(Error::rate_limit("slow down", None));
        assert_eq!(
            err.to_string(),
            "completion service failed: Rate limit exceeded: slow down"
        );
        assert!(err.is_retryable());
        assert!(error::Error::source(&err).is_some());

        let err = TurnError::ModerationService(Error::authentication("bad key"));
        assert!(!err.is_retryable());
    }
}
