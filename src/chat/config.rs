//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the immutable
//! configuration a chat session is constructed with.

use std::fmt;
use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::types::{KnownModel, Model};

/// Default persona handed to the model as the system message.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a friendly customer service assistant for an online store. \
Answer questions about shipping, delivery, returns, refunds and payments. \
Keep answers short and accurate, and if you do not know the answer, \
ask the customer to contact customer service.";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Default maximum tokens per response.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Default nucleus sampling value.
pub const DEFAULT_TOP_P: f32 = 1.0;

/// Default frequency penalty.
pub const DEFAULT_FREQUENCY_PENALTY: f32 = 0.0;

/// Default presence penalty.
pub const DEFAULT_PRESENCE_PENALTY: f32 = 0.6;

/// Default number of prior turns replayed on each request.
pub const MAX_CONTEXT_QUESTIONS: usize = 10;

/// Command-line arguments for the parcelchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gpt-3.5-turbo)", "MODEL")]
    pub model: Option<String>,

    /// Persona instructions sent as the system message.
    #[arrrg(optional, "Assistant instructions (persona)", "TEXT")]
    pub instructions: Option<String>,

    /// File containing the persona instructions.
    #[arrrg(optional, "Read assistant instructions from a file", "PATH")]
    pub instructions_file: Option<String>,

    /// YAML knowledge base used to seed the conversation.
    #[arrrg(optional, "YAML knowledge base to seed history with", "PATH")]
    pub knowledge_base: Option<String>,

    /// Start with an empty history.
    #[arrrg(flag, "Do not seed history with the knowledge base")]
    pub no_seed: bool,

    /// Sampling temperature.
    #[arrrg(optional, "Sampling temperature 0.0-2.0 (default: 0.5)", "VALUE")]
    pub temperature: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 500)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling value.
    #[arrrg(optional, "Nucleus sampling 0.0-1.0 (default: 1.0)", "VALUE")]
    pub top_p: Option<String>,

    /// Frequency penalty.
    #[arrrg(optional, "Frequency penalty -2.0-2.0 (default: 0)", "VALUE")]
    pub frequency_penalty: Option<String>,

    /// Presence penalty.
    #[arrrg(optional, "Presence penalty -2.0-2.0 (default: 0.6)", "VALUE")]
    pub presence_penalty: Option<String>,

    /// Number of prior turns replayed on each request.
    #[arrrg(optional, "Prior turns replayed per request (default: 10)", "N")]
    pub max_context_questions: Option<usize>,

    /// Override the API base URL.
    #[arrrg(optional, "API base URL (default: https://api.openai.com/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Append blocked inputs to this file.
    #[arrrg(optional, "Record blocked inputs as JSON lines", "PATH")]
    pub audit_log: Option<String>,

    /// Append every API request and response to this file.
    #[arrrg(optional, "Record API traffic as JSON lines", "PATH")]
    pub request_log: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Error raised when command-line arguments fail validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatArgsError {
    /// The offending option, without the leading dashes.
    pub option: &'static str,
    /// What was wrong with it.
    pub message: String,
}

impl ChatArgsError {
    fn new(option: &'static str, message: impl Into<String>) -> Self {
        Self {
            option,
            message: message.into(),
        }
    }
}

impl fmt::Display for ChatArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}: {}", self.option.replace('_', "-"), self.message)
    }
}

impl std::error::Error for ChatArgsError {}

/// Where the session's seed turns come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// Start with an empty history.
    None,
    /// The built-in shipping and customer-service knowledge base.
    BuiltIn,
    /// A YAML knowledge base file.
    File(PathBuf),
}

/// Configuration for a chat session.
///
/// Every value is fixed once the session is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Persona instructions, sent as the system message on every request.
    pub instructions: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Nucleus sampling value.
    pub top_p: f32,

    /// Frequency penalty.
    pub frequency_penalty: f32,

    /// Presence penalty.
    pub presence_penalty: f32,

    /// Upper bound on prior turns replayed per request.
    pub max_context_questions: usize,

    /// Source of the turns the history starts with.
    pub seed: SeedSource,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Path to the blocked-input audit log, if enabled.
    pub audit_log: Option<PathBuf>,

    /// Path to the API traffic log, if enabled.
    pub request_log: Option<PathBuf>,

    /// Base URL override for the API.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gpt-3.5-turbo
    /// - Temperature 0.5, max tokens 500, top-p 1.0
    /// - Frequency penalty 0, presence penalty 0.6
    /// - 10 prior turns replayed
    /// - Built-in knowledge base seeded, color enabled
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::Gpt35Turbo),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            frequency_penalty: DEFAULT_FREQUENCY_PENALTY,
            presence_penalty: DEFAULT_PRESENCE_PENALTY,
            max_context_questions: MAX_CONTEXT_QUESTIONS,
            seed: SeedSource::BuiltIn,
            use_color: true,
            audit_log: None,
            request_log: None,
            base_url: None,
            timeout_secs: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the persona instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the nucleus sampling value.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the frequency penalty.
    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    /// Sets the presence penalty.
    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = penalty;
        self
    }

    /// Sets how many prior turns are replayed per request.
    pub fn with_max_context_questions(mut self, max_context_questions: usize) -> Self {
        self.max_context_questions = max_context_questions;
        self
    }

    /// Sets where the seed turns come from.
    pub fn with_seed(mut self, seed: SeedSource) -> Self {
        self.seed = seed;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the blocked-input audit log path.
    pub fn with_audit_log(mut self, path: Option<PathBuf>) -> Self {
        self.audit_log = path;
        self
    }

    /// Sets the API traffic log path.
    pub fn with_request_log(mut self, path: Option<PathBuf>) -> Self {
        self.request_log = path;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = ChatArgsError;

    /// Resolves arguments against the defaults.
    ///
    /// `--instructions` wins over `--instructions-file`; the file is read by
    /// the caller so this conversion stays free of I/O.
    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let defaults = ChatConfig::new();
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or(defaults.model.clone());

        let temperature =
            parse_f32_option("temperature", args.temperature, 0.0, 2.0, DEFAULT_TEMPERATURE)?;
        let top_p = parse_f32_option("top_p", args.top_p, 0.0, 1.0, DEFAULT_TOP_P)?;
        let frequency_penalty = parse_f32_option(
            "frequency_penalty",
            args.frequency_penalty,
            -2.0,
            2.0,
            DEFAULT_FREQUENCY_PENALTY,
        )?;
        let presence_penalty = parse_f32_option(
            "presence_penalty",
            args.presence_penalty,
            -2.0,
            2.0,
            DEFAULT_PRESENCE_PENALTY,
        )?;

        let max_tokens = args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(ChatArgsError::new(
                "max_tokens",
                "expects a positive integer",
            ));
        }

        if args.timeout_secs == Some(0) {
            return Err(ChatArgsError::new(
                "timeout_secs",
                "expects a positive number of seconds",
            ));
        }

        let seed = if args.no_seed {
            SeedSource::None
        } else if let Some(path) = args.knowledge_base {
            SeedSource::File(PathBuf::from(path))
        } else {
            SeedSource::BuiltIn
        };

        Ok(ChatConfig {
            model,
            instructions: args.instructions.unwrap_or(defaults.instructions),
            temperature,
            max_tokens,
            top_p,
            frequency_penalty,
            presence_penalty,
            max_context_questions: args
                .max_context_questions
                .unwrap_or(MAX_CONTEXT_QUESTIONS),
            seed,
            use_color: !args.no_color,
            audit_log: args.audit_log.map(PathBuf::from),
            request_log: args.request_log.map(PathBuf::from),
            base_url: args.base_url,
            timeout_secs: args.timeout_secs,
        })
    }
}

fn parse_f32_option(
    option: &'static str,
    value: Option<String>,
    min: f32,
    max: f32,
    default: f32,
) -> Result<f32, ChatArgsError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let parsed: f32 = value
        .trim()
        .parse()
        .map_err(|_| ChatArgsError::new(option, format!("expects a value between {min} and {max}")))?;
    if parsed.is_finite() && parsed >= min && parsed <= max {
        Ok(parsed)
    } else {
        Err(ChatArgsError::new(
            option,
            format!("expects a value between {min} and {max}"),
        ))
    }
}
