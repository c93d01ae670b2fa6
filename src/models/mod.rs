//! Reference data model
//!
//! Households, their members and the adjudication tickets raised on them,
//! as seen by the reference store. Field values are addressed through
//! [`Record::value_at`] with the same [`FieldPath`](crate::filter::FieldPath)
//! a compiled predicate carries.

pub mod household;
pub mod individual;
pub mod record;
pub mod ticket;

pub use household::{Collector, CollectorRole, Household};
pub use individual::Individual;
pub use record::Record;
pub use ticket::{AdjudicationTicket, TicketStatus};
