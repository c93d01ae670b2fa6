//! Field definitions for targeting
//!
//! This module defines the typed description every registry produces when a
//! field name is resolved, so the compiler never has to inspect where a
//! field came from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::filter::{FieldPath, Predicate};
use crate::targeting::CustomQuery;

/// Represents the value type of a targetable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    /// Whole number
    Integer,
    /// Decimal number
    Decimal,
    /// Calendar date, compared as ISO string
    Date,
    /// Free text
    String,
    /// Boolean flag
    #[serde(rename = "BOOL")]
    Boolean,
    /// One value out of a choice list
    SelectOne,
    /// Any number of values out of a choice list
    SelectMany,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Integer => write!(f, "INTEGER"),
            ValueType::Decimal => write!(f, "DECIMAL"),
            ValueType::Date => write!(f, "DATE"),
            ValueType::String => write!(f, "STRING"),
            ValueType::Boolean => write!(f, "BOOL"),
            ValueType::SelectOne => write!(f, "SELECT_ONE"),
            ValueType::SelectMany => write!(f, "SELECT_MANY"),
        }
    }
}

/// Entity level a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Association {
    /// Household record
    Household,
    /// Individual record
    Individual,
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Association::Household => write!(f, "household"),
            Association::Individual => write!(f, "individual"),
        }
    }
}

/// How a comparator names its field's origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldClassification {
    /// Fixed schema field
    #[default]
    NotFlexField,
    /// Flexible field
    FlexField,
    /// Periodic flexible field, recorded per round
    FlexFieldPdu,
}

/// Identifies the field a comparator targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef<'a> {
    /// Field name as authored
    pub name: &'a str,
    /// Registry the field is resolved through
    pub classification: FieldClassification,
    /// One-based round, periodic fields only
    pub round: Option<u32>,
}

/// Builds a predicate for a field that has no plain storage path
pub type CustomQueryBuilder = fn(&CustomQuery<'_>) -> Result<Predicate, CompileError>;

/// How a resolved field is queried
#[derive(Debug, Clone)]
pub enum QueryLookup {
    /// Compare the value stored at a path
    Path(FieldPath),
    /// Delegate predicate construction to a custom builder
    Custom(CustomQueryBuilder),
}

/// A resolved, typed field description
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Name of the field
    pub name: String,
    /// Human readable label
    pub label: String,
    /// Value type, drives coercion and legal comparisons
    pub value_type: ValueType,
    /// Entity level the field belongs to
    pub association: Association,
    /// Query lookup, `None` when the field cannot be queried
    pub lookup: Option<QueryLookup>,
    /// Declared round count for periodic fields
    pub rounds: Option<u32>,
}

impl FieldInfo {
    /// Create a core field stored under its own name
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        value_type: ValueType,
        association: Association,
    ) -> Self {
        let name = name.into();
        Self {
            lookup: Some(QueryLookup::Path(FieldPath::Core(name.clone()))),
            name,
            label: label.into(),
            value_type,
            association,
            rounds: None,
        }
    }

    /// Store the field under a different path (e.g. a relation)
    #[must_use]
    pub fn with_lookup(mut self, path: impl Into<String>) -> Self {
        self.lookup = Some(QueryLookup::Path(FieldPath::Core(path.into())));
        self
    }

    /// Build predicates with a custom builder instead of a path
    #[must_use]
    pub fn with_custom_query(mut self, builder: CustomQueryBuilder) -> Self {
        self.lookup = Some(QueryLookup::Custom(builder));
        self
    }

    /// Mark the field as not queryable
    #[must_use]
    pub fn without_lookup(mut self) -> Self {
        self.lookup = None;
        self
    }

    /// Whether the field is recorded per round
    #[must_use]
    pub fn is_periodic(&self) -> bool {
        self.rounds.is_some()
    }
}
