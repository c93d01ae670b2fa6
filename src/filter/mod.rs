//! Predicate expressions produced by the targeting compiler
//!
//! This module provides the expression tree a household store evaluates.
//! See [`expr`] for the node types and the simplifying constructors.

pub mod expr;

pub use expr::{FieldPath, LiteralValue, Lookup, LookupOp, Predicate, SearchTerm};
