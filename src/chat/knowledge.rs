//! Seed knowledge base for new conversations.
//!
//! A knowledge base is a list of canned question/answer turns placed in the
//! history before the operator asks anything, optionally with persona
//! instructions. The YAML layout is:
//!
//! ```yaml
//! instructions: You answer shipping questions.
//! turns:
//!   - question: Do you ship abroad?
//!     answer: Yes, to select countries.
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chat::config::SeedSource;
use crate::chat::history::{ConversationHistory, ConversationTurn};
use crate::error::{Error, Result};

const BUILT_IN_YAML: &str = include_str!("../../data/knowledge_base.yaml");

/// Canned turns plus optional instructions that seed a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Persona instructions carried by the file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Seed turns, oldest first.
    #[serde(default)]
    pub turns: Vec<ConversationTurn>,
}

impl KnowledgeBase {
    /// The shipping and customer-service FAQ bundled with the crate.
    pub fn built_in() -> Result<Self> {
        Self::from_yaml(BUILT_IN_YAML)
    }

    /// Parses and validates a YAML knowledge base.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let kb: KnowledgeBase = serde_yaml::from_str(content)?;
        kb.validate()?;
        Ok(kb)
    }

    /// Reads a YAML knowledge base from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::io(
                format!("failed to read knowledge base {}", path.display()),
                err,
            )
        })?;
        Self::from_yaml(&content)
    }

    /// Loads the knowledge base named by `seed`.
    pub fn load(seed: &SeedSource) -> Result<Self> {
        match seed {
            SeedSource::None => Ok(Self::default()),
            SeedSource::BuiltIn => Self::built_in(),
            SeedSource::File(path) => Self::from_file(path),
        }
    }

    /// Converts the seed turns into a fresh history.
    pub fn into_history(self) -> ConversationHistory {
        ConversationHistory::seeded(self.turns)
    }

    fn validate(&self) -> Result<()> {
        if let Some(instructions) = &self.instructions
            && instructions.trim().is_empty()
        {
            return Err(Error::validation(
                "instructions must not be blank",
                Some("instructions".to_string()),
            ));
        }
        for (index, turn) in self.turns.iter().enumerate() {
            if turn.question().trim().is_empty() || turn.answer().trim().is_empty() {
                return Err(Error::validation(
                    format!("turn {index} has an empty question or answer"),
                    Some(format!("turns[{index}]")),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn built_in_knowledge_base_parses() {
        let kb = KnowledgeBase::built_in().unwrap();
        assert_eq!(kb.turns.len(), 104);
        assert!(kb.instructions.is_none());
        assert_eq!(kb.turns[0].question(), "What are your shipping options?");
        assert_eq!(
            kb.turns.last().unwrap().question(),
            "How can I provide feedback about the packaging of my order?"
        );
    }

    #[test]
    fn yaml_with_instructions() {
        let kb = KnowledgeBase::from_yaml(
            "instructions: Only answer parcel questions.\n\
             turns:\n  - question: Do you ship abroad?\n    answer: Yes.\n",
        )
        .unwrap();
        assert_eq!(
            kb.instructions.as_deref(),
            Some("Only answer parcel questions.")
        );
        assert_eq!(kb.turns, vec![ConversationTurn::new("Do you ship abroad?", "Yes.")]);
    }

    #[test]
    fn empty_answer_is_rejected() {
        let err = KnowledgeBase::from_yaml("turns:\n  - question: Hi\n    answer: ''\n").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn malformed_yaml_is_a_serialization_error() {
        let err = KnowledgeBase::from_yaml("turns: [ {question: ").unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn load_from_file_and_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "turns:\n  - question: A?\n    answer: B.").unwrap();
        let kb = KnowledgeBase::load(&SeedSource::File(file.path().to_path_buf())).unwrap();
        assert_eq!(kb.into_history().len(), 1);

        let kb = KnowledgeBase::load(&SeedSource::None).unwrap();
        assert!(kb.into_history().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = KnowledgeBase::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
