//! Error handling for targeting criteria compilation.
//!
//! Every error here is an authoring or configuration error. Nothing is
//! transient, so nothing is retried: the first failing comparator aborts the
//! build of its enclosing rule and criteria.

use thiserror::Error;

use crate::schema::field_def::{Association, ValueType};
use crate::targeting::ComparisonMethod;

/// Errors raised while turning a criteria definition into a predicate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The field name is not known to any registry in the requested scope
    #[error("unknown {scope} field '{name}'")]
    UnknownField {
        /// Field name as authored
        name: String,
        /// Entity level the field was looked up for
        scope: Association,
    },

    /// The field resolves but declares nothing that can be queried
    #[error("field '{name}' cannot be used in a query")]
    UnsupportedQuery {
        /// Field name as authored
        name: String,
    },

    /// The argument list does not match the method's arity
    #[error("comparison {method} on '{field}' expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Field name as authored
        field: String,
        /// Comparison method in use
        method: ComparisonMethod,
        /// Human readable expectation ("2", "at least 1")
        expected: String,
        /// Number of arguments supplied
        actual: usize,
    },

    /// A periodic field was referenced without a round
    #[error("periodic field '{field}' requires a round number")]
    MissingRoundNumber {
        /// Field name as authored
        field: String,
    },

    /// The round is zero or beyond the field's declared round count
    #[error("round {round} is out of range for periodic field '{field}' (1..={rounds})")]
    RoundOutOfRange {
        /// Field name as authored
        field: String,
        /// Requested round
        round: u32,
        /// Number of rounds the field declares
        rounds: u32,
    },

    /// The method is not legal against the field's value type
    #[error("comparison {method} is not supported for {value_type} field '{field}'")]
    UnsupportedComparisonForType {
        /// Field name as authored
        field: String,
        /// Comparison method in use
        method: ComparisonMethod,
        /// Value type of the resolved field
        value_type: ValueType,
    },

    /// A raw argument could not be coerced to the field's value type
    #[error("argument {value} for '{field}' is not a valid {expected}")]
    InvalidArgument {
        /// Field name as authored
        field: String,
        /// Raw argument, rendered as JSON
        value: String,
        /// Value type the argument was coerced to
        expected: ValueType,
    },

    /// A custom query builder does not implement the method
    #[error("field '{field}' does not support comparison {method}")]
    UnsupportedCustomComparison {
        /// Field name as authored
        field: String,
        /// Comparison method in use
        method: ComparisonMethod,
    },
}

/// Errors raised by the criteria validator before a criteria is stored
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Neither rules nor explicit ID lists were given
    #[error("targeting criteria needs at least one rule or an explicit ID list")]
    EmptyCriteria,

    /// A rule has neither household comparators nor individual blocks
    #[error("rule {index} needs at least one filter or individual block")]
    EmptyRule {
        /// Zero-based position of the rule
        index: usize,
    },

    /// An explicit ID does not carry the expected prefix
    #[error("'{id}' is not a valid identifier, expected prefix '{expected_prefix}'")]
    InvalidIdentifier {
        /// Offending identifier
        id: String,
        /// Prefix configured for the list
        expected_prefix: String,
    },

    /// The criteria failed to compile
    #[error("rule {rule}: {source}")]
    Compile {
        /// Zero-based position of the failing rule
        rule: usize,
        /// Underlying compile error
        #[source]
        source: CompileError,
    },
}

/// Errors raised by the reference store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An entity with this ID is already stored
    #[error("{entity} '{id}' is already stored")]
    DuplicateId {
        /// Entity level
        entity: Association,
        /// Conflicting unicef ID
        id: String,
    },

    /// A predicate node was used at a level it cannot be evaluated at
    #[error("'{predicate}' cannot be evaluated against a {level}")]
    MisplacedPredicate {
        /// Rendered predicate node
        predicate: String,
        /// Level it was evaluated at
        level: Association,
    },
}

/// Umbrella error for the public API
#[derive(Debug, Error)]
pub enum TargetingError {
    /// Predicate construction failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Criteria validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A definition could not be parsed
    #[error("invalid criteria definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// The store could not run a predicate
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for targeting operations
pub type Result<T, E = TargetingError> = std::result::Result<T, E>;
