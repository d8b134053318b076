//! Content moderation types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /moderations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationRequest {
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub results: Vec<ModerationResult>,
}

impl ModerationResponse {
    /// Whether any input was flagged.
    pub fn flagged(&self) -> bool {
        self.results.iter().any(|r| r.flagged)
    }
}

/// Verdict for one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    #[serde(default)]
    pub category_scores: HashMap<String, f64>,
}

impl ModerationResult {
    /// Names of the categories the input was flagged for, sorted.
    pub fn flagged_categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flagged_categories_are_sorted() {
        let result: ModerationResult = serde_json::from_str(
            r#"{"flagged":true,"categories":{"violence":true,"hate":true,"sexual":false},"category_scores":{"violence":0.9,"hate":0.7,"sexual":0.01}}"#,
        )
        .unwrap();
        assert_eq!(result.flagged_categories(), vec!["hate", "violence"]);
        assert_eq!(result.category_scores["violence"], 0.9);
    }
}
