use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Token accounting reported by the completion endpoint.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// The number of tokens in the prompt, including replayed history.
    pub prompt_tokens: u32,

    /// The number of tokens in the generated completion.
    pub completion_tokens: u32,

    /// Sum of prompt and completion tokens.
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Create a new `Usage` with the given prompt and completion tokens.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens.saturating_add(rhs.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(rhs.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn usage_deserialization() {
        let usage: Usage = serde_json::from_value(json!({
            "prompt_tokens": 120,
            "completion_tokens": 30,
            "total_tokens": 150
        }))
        .unwrap();
        assert_eq!(usage, Usage::new(120, 30));
    }

    #[test]
    fn usage_total_defaults_when_missing() {
        let usage: Usage = serde_json::from_value(json!({
            "prompt_tokens": 1,
            "completion_tokens": 2
        }))
        .unwrap();
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn usage_adds() {
        let total = Usage::new(10, 5) + Usage::new(1, 2);
        assert_eq!(total, Usage::new(11, 7));
    }
}
