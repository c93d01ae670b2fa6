//! Flexible field registry
//!
//! Flexible fields are defined at runtime, optionally scoped to a program.
//! Periodic fields are flexible fields recorded once per collection round.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::field::{Association, FieldInfo, QueryLookup, ValueType};
use crate::filter::FieldPath;

/// Runtime definition of a flexible field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexFieldDefinition {
    /// Name of the field
    pub name: String,
    /// Human readable label
    #[serde(default)]
    pub label: String,
    /// Value type
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Entity level the field belongs to
    pub associated_with: Association,
    /// Owning program, `None` for global fields
    #[serde(default)]
    pub program: Option<String>,
    /// Round count, set for periodic fields only
    #[serde(default)]
    pub number_of_rounds: Option<u32>,
}

impl FlexFieldDefinition {
    /// Create a global flexible field
    pub fn new(name: impl Into<String>, value_type: ValueType, associated_with: Association) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            value_type,
            associated_with,
            program: None,
            number_of_rounds: None,
        }
    }

    /// Scope the field to a program
    #[must_use]
    pub fn for_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Record the field per round
    #[must_use]
    pub fn periodic(mut self, number_of_rounds: u32) -> Self {
        self.number_of_rounds = Some(number_of_rounds);
        self
    }

    /// Typed description of the field, queried through its flex path.
    /// Periodic fields get their per-round path once a round is known.
    #[must_use]
    pub fn to_field_info(&self) -> FieldInfo {
        FieldInfo {
            name: self.name.clone(),
            label: self.label.clone(),
            value_type: self.value_type,
            association: self.associated_with,
            lookup: Some(QueryLookup::Path(FieldPath::Flex(self.name.clone()))),
            rounds: self.number_of_rounds,
        }
    }
}

/// Registry of flexible field definitions keyed by name and owning program
#[derive(Debug, Clone, Default)]
pub struct FlexFieldRegistry {
    definitions: FxHashMap<(String, Option<String>), FlexFieldDefinition>,
}

impl FlexFieldRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, replacing one with the same name and program
    #[must_use]
    pub fn with_definition(mut self, definition: FlexFieldDefinition) -> Self {
        self.register(definition);
        self
    }

    /// Add a definition, replacing one with the same name and program
    pub fn register(&mut self, definition: FlexFieldDefinition) {
        log::trace!(
            "registering flex field '{}' (program {:?})",
            definition.name,
            definition.program
        );
        self.definitions.insert(
            (definition.name.clone(), definition.program.clone()),
            definition,
        );
    }

    /// Look up a non-periodic flexible field
    ///
    /// A definition owned by `program` wins over a global one of the same name.
    #[must_use]
    pub fn get(&self, name: &str, program: Option<&str>) -> Option<&FlexFieldDefinition> {
        let non_periodic =
            |definition: &&FlexFieldDefinition| definition.number_of_rounds.is_none();
        program
            .and_then(|program| {
                self.definitions
                    .get(&(name.to_string(), Some(program.to_string())))
                    .filter(non_periodic)
            })
            .or_else(|| {
                self.definitions
                    .get(&(name.to_string(), None))
                    .filter(non_periodic)
            })
    }

    /// Look up a periodic field, which only exists within its program
    #[must_use]
    pub fn get_periodic(&self, name: &str, program: Option<&str>) -> Option<&FlexFieldDefinition> {
        let program = program?;
        self.definitions
            .get(&(name.to_string(), Some(program.to_string())))
            .filter(|definition| definition.number_of_rounds.is_some())
    }

    /// Number of registered definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
