//! Targeting criteria compiler
//!
//! Definitions are composed bottom-up: [`Comparator`] → [`FilterBlock`] /
//! [`IndividualFilterBlock`] → [`Rule`] → [`Criteria`]. A [`Compiler`]
//! turns a criteria into one household [`Predicate`](crate::filter::Predicate).

pub mod age;
pub mod block;
pub mod comparator;
pub mod comparison;
pub mod compiler;
pub mod criteria;
pub mod ids;
pub mod rule;
pub mod search;
pub mod validation;

pub use age::CustomQuery;
pub use block::{FilterBlock, IndividualFilterBlock, HEAD_OF_HOUSEHOLD};
pub use comparator::Comparator;
pub use comparison::{Arity, ComparisonMethod, MethodAttributes, OperatorKind};
pub use compiler::{CompileScope, Compiler, PopulationState, PopulationStatus};
pub use criteria::Criteria;
pub use ids::IdList;
pub use rule::Rule;
pub use search::{NativeSearch, SearchBackend};
pub use validation::CriteriaValidator;
