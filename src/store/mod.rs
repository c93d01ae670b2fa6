//! Household stores
//!
//! A store is the collaborator a compiled predicate is handed to. The crate
//! ships [`InMemoryStore`], a reference implementation used by the tests and
//! by embedders that keep their registration data in memory.

pub mod memory;

pub use memory::InMemoryStore;

use crate::filter::Predicate;
use crate::models::Household;

/// Anything that can select households matching a predicate
pub trait HouseholdStore {
    /// Error raised when the predicate cannot be run
    type Error: std::error::Error + Send + Sync + 'static;

    /// Households matching `predicate`, in store order
    fn select(&self, predicate: &Predicate) -> Result<Vec<&Household>, Self::Error>;
}
