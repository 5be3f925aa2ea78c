//! Conversation history and the context window replayed to the model.
//!
//! The completion endpoint is stateless, so every request carries the persona
//! instructions plus the most recent turns. History itself only ever grows;
//! the window is what gets bounded.

use serde::{Deserialize, Serialize};

use crate::chat::config::ChatConfig;
use crate::types::ChatMessage;

/// One question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    question: String,
    answer: String,
}

impl ConversationTurn {
    /// Creates a turn from a question and its answer.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// The question as the operator asked it.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The answer as the model returned it.
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Append-only, oldest-first sequence of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history pre-seeded with `turns`, order preserved.
    pub fn seeded(turns: impl IntoIterator<Item = ConversationTurn>) -> Self {
        Self {
            turns: turns.into_iter().collect(),
        }
    }

    /// Appends a turn at the newest end.
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Number of turns recorded.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The newest `max_turns` turns, oldest first.
    pub fn recent(&self, max_turns: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(max_turns);
        &self.turns[start..]
    }

    /// The most recently recorded turn.
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}

/// Builds the ordered message list for one completion request.
///
/// The result is the system message, then each of the last
/// `config.max_context_questions` turns as a user/assistant pair, then the
/// new question as a final user message.
pub fn build_context(
    config: &ChatConfig,
    history: &ConversationHistory,
    new_question: &str,
) -> Vec<ChatMessage> {
    let window = history.recent(config.max_context_questions);
    let mut messages = Vec::with_capacity(2 + window.len() * 2);
    messages.push(ChatMessage::system(config.instructions.as_str()));
    for turn in window {
        messages.push(ChatMessage::user(turn.question()));
        messages.push(ChatMessage::assistant(turn.answer()));
    }
    messages.push(ChatMessage::user(new_question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    fn numbered(count: usize) -> ConversationHistory {
        ConversationHistory::seeded(
            (0..count).map(|i| ConversationTurn::new(format!("q{i}"), format!("a{i}"))),
        )
    }

    #[test]
    fn empty_history_yields_system_and_question() {
        let config = ChatConfig::new().with_instructions("Be helpful.");
        let messages = build_context(
            &config,
            &ConversationHistory::new(),
            "What are your shipping options?",
        );
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("Be helpful."),
                ChatMessage::user("What are your shipping options?"),
            ]
        );
    }

    #[test]
    fn window_keeps_last_turns_in_order() {
        let config = ChatConfig::new().with_max_context_questions(10);
        let messages = build_context(&config, &numbered(12), "Q");

        assert_eq!(messages.len(), 22);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1], ChatMessage::user("q2"));
        assert_eq!(messages[2], ChatMessage::assistant("a2"));
        assert_eq!(messages[19], ChatMessage::user("q11"));
        assert_eq!(messages[20], ChatMessage::assistant("a11"));
        assert_eq!(messages[21], ChatMessage::user("Q"));
        assert!(
            messages
                .iter()
                .all(|m| m.content != "q0" && m.content != "q1")
        );
    }

    #[test]
    fn short_history_is_replayed_in_full() {
        let config = ChatConfig::new().with_max_context_questions(10);
        let messages = build_context(&config, &numbered(3), "Q");
        assert_eq!(messages.len(), 1 + 3 * 2 + 1);
        assert_eq!(messages[1], ChatMessage::user("q0"));
    }

    #[test]
    fn roles_alternate_inside_the_window() {
        let config = ChatConfig::new().with_max_context_questions(4);
        let messages = build_context(&config, &numbered(9), "Q");
        for pair in messages[1..messages.len() - 1].chunks(2) {
            assert_eq!(pair[0].role, ChatRole::User);
            assert_eq!(pair[1].role, ChatRole::Assistant);
        }
    }

    #[test]
    fn zero_window_replays_nothing() {
        let config = ChatConfig::new().with_max_context_questions(0);
        let messages = build_context(&config, &numbered(5), "Q");
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn recent_returns_newest_turn_last() {
        let mut history = ConversationHistory::new();
        for n in 1..=15 {
            history.push(ConversationTurn::new(format!("question {n}"), "answer"));
            let window = history.recent(10);
            assert_eq!(window.len(), n.min(10));
            assert_eq!(window.last().unwrap().question(), format!("question {n}"));
        }
    }
}
