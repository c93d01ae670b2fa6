//! Field schema for targeting criteria.
//!
//! Registries describing which fields exist, how they are typed and where
//! their values are stored, plus the resolver the compiler queries.

pub mod field_def;
pub mod resolver;

pub use field_def::{
    Association, CoreFieldRegistry, FieldClassification, FieldInfo, FieldRef,
    FlexFieldDefinition, FlexFieldRegistry, QueryLookup, ValueType,
};
pub use resolver::{FieldCatalog, FieldResolver};
