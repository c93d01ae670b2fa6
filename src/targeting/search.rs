//! Full-text search backend seam

use crate::filter::{Predicate, SearchTerm};
use crate::schema::field_def::Association;

/// Turns free-text terms into a predicate the store understands
pub trait SearchBackend: Send + Sync {
    /// Predicate matching entities that satisfy every term
    fn search(&self, entity: Association, terms: Vec<SearchTerm>) -> Predicate;
}

/// Backend that leaves text matching to the store
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSearch;

impl SearchBackend for NativeSearch {
    fn search(&self, entity: Association, terms: Vec<SearchTerm>) -> Predicate {
        if terms.is_empty() {
            return Predicate::AlwaysTrue;
        }
        Predicate::TextSearch { entity, terms }
    }
}
