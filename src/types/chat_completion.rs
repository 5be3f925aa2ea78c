use serde::{Deserialize, Serialize};

use crate::types::{ChatRole, Usage};

/// The message carried by a completion choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseMessage {
    /// Role of the author; the service always answers as the assistant.
    pub role: ChatRole,

    /// Text of the reply. The service sends `null` for refusals and tool calls.
    #[serde(default)]
    pub content: Option<String>,
}

/// A single candidate completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Position of this candidate in the response.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: ResponseMessage,

    /// Why generation stopped (`stop`, `length`, `content_filter`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response body from the chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletion {
    /// Unique identifier for the completion.
    #[serde(default)]
    pub id: String,

    /// Model that produced the completion.
    #[serde(default)]
    pub model: String,

    /// Candidate completions, top candidate first.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token accounting, when reported.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Text of the top candidate, if there is one and it carries text.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_deserialization() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1677652288,
            "model": "gpt-3.5-turbo-0613",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "We ship worldwide."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
        }))
        .unwrap();

        assert_eq!(completion.id, "chatcmpl-123");
        assert_eq!(completion.first_text(), Some("We ship worldwide."));
        assert_eq!(completion.usage, Some(Usage::new(9, 12)));
        assert_eq!(completion.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn first_text_is_none_without_choices() {
        let completion: ChatCompletion =
            serde_json::from_value(json!({"id": "x", "choices": []})).unwrap();
        assert!(completion.first_text().is_none());
    }

    #[test]
    fn first_text_is_none_for_null_content() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(completion.first_text().is_none());
    }
}
