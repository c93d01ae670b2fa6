//! A Rust library for compiling household targeting criteria into
//! composable query predicates.
//!
//! Criteria are authored as rules over household and individual fields
//! (core, flexible and periodic), compiled against field registries into a
//! [`Predicate`], and handed to a [`HouseholdStore`] to select households.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod schema;
pub mod store;
pub mod targeting;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{EmptyCriteriaPolicy, TargetingConfig};
pub use error::{CompileError, Result, StoreError, TargetingError, ValidationError};

// Predicates
pub use filter::{FieldPath, LiteralValue, Lookup, LookupOp, Predicate, SearchTerm};

// Field schema
pub use schema::{
    Association, CoreFieldRegistry, FieldCatalog, FieldClassification, FieldInfo,
    FieldResolver, FlexFieldDefinition, FlexFieldRegistry, ValueType,
};

// Criteria definitions and compilation
pub use targeting::{
    Comparator, ComparisonMethod, CompileScope, Compiler, Criteria, CriteriaValidator,
    FilterBlock, IdList, IndividualFilterBlock, NativeSearch, PopulationState,
    PopulationStatus, Rule, SearchBackend,
};

// Reference store
pub use models::{AdjudicationTicket, Collector, CollectorRole, Household, Individual, TicketStatus};
pub use store::{HouseholdStore, InMemoryStore};

// Utility functions
pub use utils::logging::init_logging;
