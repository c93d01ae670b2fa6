//! Configuration for the targeting compiler.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// What a criteria with no rules and no ID lists selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCriteriaPolicy {
    /// Select no household
    #[default]
    MatchNone,
    /// Select every non-withdrawn household
    MatchAll,
}

/// Configuration for the targeting compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Behaviour of a criteria without rules or ID lists
    pub empty_criteria_policy: EmptyCriteriaPolicy,
    /// Individual fields matched through full-text search
    pub full_text_fields: Vec<String>,
    /// Ticket categories that trigger the adjudication exclusion
    pub adjudication_categories: Vec<String>,
    /// Prefix every explicit household ID must carry
    pub household_id_prefix: String,
    /// Prefix every explicit individual ID must carry
    pub individual_id_prefix: String,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            empty_criteria_policy: EmptyCriteriaPolicy::MatchNone,
            full_text_fields: vec!["observed_disability".to_string(), "full_name".to_string()],
            adjudication_categories: vec![
                "duplicate".to_string(),
                "golden_record".to_string(),
            ],
            household_id_prefix: "HH-".to_string(),
            individual_id_prefix: "IND-".to_string(),
        }
    }
}

impl TargetingConfig {
    /// Load a configuration file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read targeting config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid targeting config {}", path.display()))
    }

    /// Whether an individual field is diverted to full-text search
    #[must_use]
    pub fn is_full_text_field(&self, name: &str) -> bool {
        self.full_text_fields.iter().any(|field| field == name)
    }
}
