//! Logging trait for client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows callers to
//! capture every request and response passing through the [`OpenAi`]
//! client, plus [`JsonLinesLogger`], which appends them to a file.
//!
//! [`OpenAi`]: crate::OpenAi

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::{ChatCompletion, ChatCompletionParams, ModerationParams, ModerationResponse};

/// A trait for logging client operations.
///
/// Loggers observe traffic; they cannot fail a request. Implementations
/// should swallow their own I/O errors.
pub trait ClientLogger: Send + Sync {
    /// Log an outbound chat completion request, including the replayed context.
    fn log_completion_request(&self, params: &ChatCompletionParams);

    /// Log a successful chat completion response.
    fn log_completion(&self, completion: &ChatCompletion);

    /// Log a moderation request together with its verdict.
    fn log_moderation(&self, params: &ModerationParams, response: &ModerationResponse);
}

/// Appends one JSON object per event to a file.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use parcelchat::{JsonLinesLogger, OpenAi};
///
/// # fn main() -> parcelchat::Result<()> {
/// let logger = JsonLinesLogger::open("requests.jsonl")?;
/// let client = OpenAi::new(None)?.with_logger(Arc::new(logger));
/// # Ok(())
/// # }
/// ```
pub struct JsonLinesLogger {
    file: Mutex<File>,
}

#[derive(Serialize)]
struct LogRecord<'a> {
    #[serde(with = "crate::utils::time")]
    timestamp: OffsetDateTime,
    event: &'a str,
    payload: Value,
}

impl JsonLinesLogger {
    /// Opens `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .map_err(|err| Error::io("failed to open request log", err))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn write_record<T: Serialize>(&self, event: &str, payload: &T) {
        let Ok(payload) = serde_json::to_value(payload) else {
            return;
        };
        let record = LogRecord {
            timestamp: OffsetDateTime::now_utc(),
            event,
            payload,
        };
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl ClientLogger for JsonLinesLogger {
    fn log_completion_request(&self, params: &ChatCompletionParams) {
        self.write_record("completion_request", params);
    }

    fn log_completion(&self, completion: &ChatCompletion) {
        self.write_record("completion", completion);
    }

    fn log_moderation(&self, params: &ModerationParams, response: &ModerationResponse) {
        #[derive(Serialize)]
        struct Moderation<'a> {
            request: &'a ModerationParams,
            response: &'a ModerationResponse,
        }
        self.write_record(
            "moderation",
            &Moderation {
                request: params,
                response,
            },
        );
    }
}
