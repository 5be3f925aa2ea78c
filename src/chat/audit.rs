//! Audit trail of inputs rejected by moderation.
//!
//! Blocked inputs never enter the conversation history. When an audit log is
//! configured, each one is appended here as a single JSON line instead.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::ModerationCategory;

/// One blocked input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the input was blocked.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,

    /// The rejected input, verbatim.
    pub input: String,

    /// Taxonomy categories the input was flagged for.
    pub categories: Vec<ModerationCategory>,
}

/// Append-only JSON-lines file of blocked inputs.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| Error::io("failed to open audit log", err))?;
        Ok(Self { path, file })
    }

    /// The file records are appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record for `input`.
    pub fn record(&mut self, input: &str, categories: &[ModerationCategory]) -> Result<()> {
        let record = AuditRecord {
            timestamp: OffsetDateTime::now_utc(),
            input: input.to_string(),
            categories: categories.to_vec(),
        };
        let line = serde_json::to_string(&record)?;
        writeln!(self.file, "{line}")
            .map_err(|err| Error::io("failed to write audit record", err))?;
        self.file
            .flush()
            .map_err(|err| Error::io("failed to flush audit log", err))
    }

    /// Reads every record from an audit log file.
    pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<AuditRecord>> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|err| Error::io("failed to read audit log", err))?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_append_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.record("first", &[ModerationCategory::Violence]).unwrap();
        drop(log);

        let mut log = AuditLog::open(&path).unwrap();
        log.record(
            "second",
            &[ModerationCategory::Hate, ModerationCategory::HateThreatening],
        )
        .unwrap();
        assert_eq!(log.path(), path.as_path());

        let records = AuditLog::read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].input, "first");
        assert_eq!(records[0].categories, vec![ModerationCategory::Violence]);
        assert_eq!(records[1].categories.len(), 2);
    }

    #[test]
    fn record_format_uses_category_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked.jsonl");
        let mut log = AuditLog::open(&path).unwrap();
        log.record("x", &[ModerationCategory::ViolenceGraphic]).unwrap();

        let line = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["categories"], serde_json::json!(["violence/graphic"]));
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }
}
