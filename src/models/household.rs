//! Household entity model

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Record;

/// Payment role an individual holds for a household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectorRole {
    Primary,
    Alternate,
}

/// An individual collecting on behalf of a household
///
/// The collector need not be a member of the household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collector {
    pub individual_id: String,
    pub role: CollectorRole,
}

/// A registered household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    /// Household unicef ID (`HH-...`)
    pub unicef_id: String,
    #[serde(default)]
    pub withdrawn: bool,
    /// Number of current members
    #[serde(default)]
    pub size: Option<i64>,
    /// Other core field values
    #[serde(default)]
    pub attributes: FxHashMap<String, Value>,
    /// Flexible field values; periodic fields nest `{round: {"value": ..}}`
    #[serde(default)]
    pub flex_fields: FxHashMap<String, Value>,
    #[serde(default)]
    pub collectors: Vec<Collector>,
}

impl Household {
    pub fn new(unicef_id: impl Into<String>) -> Self {
        Self {
            unicef_id: unicef_id.into(),
            withdrawn: false,
            size: None,
            attributes: FxHashMap::default(),
            flex_fields: FxHashMap::default(),
            collectors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn withdrawn(mut self) -> Self {
        self.withdrawn = true;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_flex_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.flex_fields.insert(name.into(), value);
        self
    }

    /// Record the value of one round of a periodic field
    #[must_use]
    pub fn with_round_value(mut self, name: &str, round: u32, value: Value) -> Self {
        let rounds = self
            .flex_fields
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Value::Object(rounds) = rounds {
            let mut entry = serde_json::Map::new();
            entry.insert("value".to_string(), value);
            rounds.insert(round.to_string(), Value::Object(entry));
        }
        self
    }

    #[must_use]
    pub fn with_collector(mut self, individual_id: impl Into<String>, role: CollectorRole) -> Self {
        self.collectors.push(Collector {
            individual_id: individual_id.into(),
            role,
        });
        self
    }
}

impl Record for Household {
    fn unicef_id(&self) -> &str {
        &self.unicef_id
    }

    fn core_value(&self, name: &str) -> Option<Value> {
        match name {
            "unicef_id" => Some(Value::String(self.unicef_id.clone())),
            "withdrawn" => Some(Value::Bool(self.withdrawn)),
            "size" => self.size.map(Value::from),
            other => self.attributes.get(other).cloned(),
        }
    }

    fn flex_fields(&self) -> &FxHashMap<String, Value> {
        &self.flex_fields
    }
}
