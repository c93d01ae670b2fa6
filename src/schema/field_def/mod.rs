//! Module for targetable field definitions
//!
//! This module provides the typed field description shared by the core and
//! flexible field registries.

pub mod core_fields;
pub mod field;
pub mod flex;

pub use core_fields::CoreFieldRegistry;
pub use field::{
    Association, CustomQueryBuilder, FieldClassification, FieldInfo, FieldRef, QueryLookup,
    ValueType,
};
pub use flex::{FlexFieldDefinition, FlexFieldRegistry};
