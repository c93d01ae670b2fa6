//! Individual entity model
//!
//! An Individual is a person registered in a household. Members are linked
//! to their household by `household_id`; collector roles are held on the
//! household side.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{AdjudicationTicket, Record};

/// A registered person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Individual unicef ID (`IND-...`)
    pub unicef_id: String,
    /// Household the individual is a member of
    #[serde(default)]
    pub household_id: Option<String>,
    /// Relationship to the head of household, `HEAD` for the head
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub withdrawn: bool,
    #[serde(default)]
    pub duplicate: bool,
    /// Confirmed match against the sanction list
    #[serde(default)]
    pub sanction_list_confirmed_match: bool,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Other core field values
    #[serde(default)]
    pub attributes: FxHashMap<String, Value>,
    #[serde(default)]
    pub flex_fields: FxHashMap<String, Value>,
    #[serde(default)]
    pub tickets: Vec<AdjudicationTicket>,
}

impl Individual {
    pub fn new(unicef_id: impl Into<String>) -> Self {
        Self {
            unicef_id: unicef_id.into(),
            household_id: None,
            relationship: None,
            withdrawn: false,
            duplicate: false,
            sanction_list_confirmed_match: false,
            birth_date: None,
            full_name: None,
            attributes: FxHashMap::default(),
            flex_fields: FxHashMap::default(),
            tickets: Vec::new(),
        }
    }

    #[must_use]
    pub fn member_of(mut self, household_id: impl Into<String>) -> Self {
        self.household_id = Some(household_id.into());
        self
    }

    #[must_use]
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    #[must_use]
    pub fn born(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    #[must_use]
    pub fn named(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
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

    #[must_use]
    pub fn with_ticket(mut self, ticket: AdjudicationTicket) -> Self {
        self.tickets.push(ticket);
        self
    }

    #[must_use]
    pub fn sanctioned(mut self) -> Self {
        self.sanction_list_confirmed_match = true;
        self
    }

    #[must_use]
    pub fn withdrawn(mut self) -> Self {
        self.withdrawn = true;
        self
    }

    #[must_use]
    pub fn duplicate(mut self) -> Self {
        self.duplicate = true;
        self
    }

    /// Open ticket in one of `categories`
    #[must_use]
    pub fn has_open_ticket(&self, categories: &[String]) -> bool {
        self.tickets.iter().any(|ticket| ticket.is_open_in(categories))
    }
}

impl Record for Individual {
    fn unicef_id(&self) -> &str {
        &self.unicef_id
    }

    fn core_value(&self, name: &str) -> Option<Value> {
        match name {
            "unicef_id" => Some(Value::String(self.unicef_id.clone())),
            "household_id" => self.household_id.clone().map(Value::String),
            "relationship" => self.relationship.clone().map(Value::String),
            "withdrawn" => Some(Value::Bool(self.withdrawn)),
            "duplicate" => Some(Value::Bool(self.duplicate)),
            "sanction_list_confirmed_match" => Some(Value::Bool(self.sanction_list_confirmed_match)),
            "birth_date" => self
                .birth_date
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string())),
            "full_name" => self.full_name.clone().map(Value::String),
            other => self.attributes.get(other).cloned(),
        }
    }

    fn flex_fields(&self) -> &FxHashMap<String, Value> {
        &self.flex_fields
    }
}
