use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Request body for the moderation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModerationParams {
    /// The text to classify.
    pub input: String,

    /// Moderation model; the service picks its latest when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ModerationParams {
    /// Create a moderation request for the given text.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: None,
        }
    }

    /// Pin the moderation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response body from the moderation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationResponse {
    /// Unique identifier for the moderation request.
    #[serde(default)]
    pub id: String,

    /// Model that classified the input.
    #[serde(default)]
    pub model: String,

    /// One result per input; a single-string request yields one result.
    #[serde(default)]
    pub results: Vec<ModerationResult>,
}

/// Classification of one input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationResult {
    /// Whether the service considers the input disallowed overall.
    pub flagged: bool,

    /// Per-category flags keyed by category code (`hate`, `violence/graphic`, ...).
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,

    /// Per-category confidence scores.
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

impl ModerationResult {
    /// Flagged categories from the fixed taxonomy, in taxonomy order.
    ///
    /// Categories the service reports outside the taxonomy are ignored, and a
    /// taxonomy category missing from the response counts as not flagged.
    pub fn flagged_categories(&self) -> Vec<ModerationCategory> {
        ModerationCategory::ALL
            .into_iter()
            .filter(|category| {
                self.categories
                    .get(category.code())
                    .copied()
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// The fixed moderation taxonomy the assistant enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModerationCategory {
    /// `hate`
    Hate,
    /// `hate/threatening`
    HateThreatening,
    /// `self-harm`
    SelfHarm,
    /// `sexual`
    Sexual,
    /// `sexual/minors`
    SexualMinors,
    /// `violence`
    Violence,
    /// `violence/graphic`
    ViolenceGraphic,
}

impl ModerationCategory {
    /// Every category in taxonomy order.
    pub const ALL: [ModerationCategory; 7] = [
        ModerationCategory::Hate,
        ModerationCategory::HateThreatening,
        ModerationCategory::SelfHarm,
        ModerationCategory::Sexual,
        ModerationCategory::SexualMinors,
        ModerationCategory::Violence,
        ModerationCategory::ViolenceGraphic,
    ];

    /// The category code used by the moderation service.
    pub fn code(&self) -> &'static str {
        match self {
            ModerationCategory::Hate => "hate",
            ModerationCategory::HateThreatening => "hate/threatening",
            ModerationCategory::SelfHarm => "self-harm",
            ModerationCategory::Sexual => "sexual",
            ModerationCategory::SexualMinors => "sexual/minors",
            ModerationCategory::Violence => "violence",
            ModerationCategory::ViolenceGraphic => "violence/graphic",
        }
    }

    /// The operator-facing explanation shown when the category is flagged.
    pub fn description(&self) -> &'static str {
        match self {
            ModerationCategory::Hate => {
                "Content that expresses, incites, or promotes hate based on race, gender, ethnicity, religion, nationality, sexual orientation, disability status, or caste."
            }
            ModerationCategory::HateThreatening => {
                "Hateful content that also includes violence or serious harm towards the targeted group."
            }
            ModerationCategory::SelfHarm => {
                "Content that promotes, encourages, or depicts acts of self-harm, such as suicide, cutting, and eating disorders."
            }
            ModerationCategory::Sexual => {
                "Content meant to arouse sexual excitement, such as the description of sexual activity, or that promotes sexual services (excluding sex education and wellness)."
            }
            ModerationCategory::SexualMinors => {
                "Sexual content that includes an individual who is under 18 years old."
            }
            ModerationCategory::Violence => {
                "Content that promotes or glorifies violence or celebrates the suffering or humiliation of others."
            }
            ModerationCategory::ViolenceGraphic => {
                "Violent content that depicts death, violence, or serious physical injury in extreme graphic detail."
            }
        }
    }
}

impl fmt::Display for ModerationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ModerationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModerationCategory::ALL
            .into_iter()
            .find(|category| category.code() == s)
            .ok_or_else(|| format!("unknown moderation category: {s}"))
    }
}

impl Serialize for ModerationCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ModerationCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    fn result_with(flags: &[(&str, bool)]) -> ModerationResult {
        ModerationResult {
            flagged: true,
            categories: flags
                .iter()
                .map(|(code, flag)| (code.to_string(), *flag))
                .collect(),
            category_scores: BTreeMap::new(),
        }
    }

    #[test]
    fn params_serialization() {
        assert_eq!(
            to_value(ModerationParams::new("hello")).unwrap(),
            json!({"input": "hello"})
        );
        assert_eq!(
            to_value(ModerationParams::new("hello").with_model("text-moderation-latest")).unwrap(),
            json!({"input": "hello", "model": "text-moderation-latest"})
        );
    }

    #[test]
    fn response_deserialization() {
        let response: ModerationResponse = serde_json::from_value(json!({
            "id": "modr-1",
            "model": "text-moderation-007",
            "results": [{
                "flagged": true,
                "categories": {
                    "hate": false,
                    "violence": true,
                    "harassment": true
                },
                "category_scores": {"violence": 0.97}
            }]
        }))
        .unwrap();
        let result = &response.results[0];
        assert!(result.flagged);
        assert_eq!(
            result.flagged_categories(),
            vec![ModerationCategory::Violence]
        );
    }

    #[test]
    fn flagged_categories_follow_taxonomy_order() {
        let result = result_with(&[
            ("violence/graphic", true),
            ("hate", true),
            ("self-harm", true),
        ]);
        assert_eq!(
            result.flagged_categories(),
            vec![
                ModerationCategory::Hate,
                ModerationCategory::SelfHarm,
                ModerationCategory::ViolenceGraphic,
            ]
        );
    }

    #[test]
    fn missing_categories_are_not_flagged() {
        let result = result_with(&[]);
        assert!(result.flagged_categories().is_empty());
    }

    #[test]
    fn category_codes_round_trip_through_from_str() {
        for category in ModerationCategory::ALL {
            assert_eq!(category.code().parse::<ModerationCategory>(), Ok(category));
        }
        assert!("harassment".parse::<ModerationCategory>().is_err());
    }

    #[test]
    fn category_serializes_as_code() {
        assert_eq!(
            to_value(ModerationCategory::SexualMinors).unwrap(),
            json!("sexual/minors")
        );
    }
}
