//! Adjudication tickets raised on individuals

use serde::{Deserialize, Serialize};

/// Ticket workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    New,
    Assigned,
    InProgress,
    OnHold,
    ForApproval,
    Closed,
}

/// A needs-adjudication ticket on an individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationTicket {
    /// Category the ticket was raised under, e.g. `duplicate`
    pub category: String,
    pub status: TicketStatus,
}

impl AdjudicationTicket {
    pub fn new(category: impl Into<String>, status: TicketStatus) -> Self {
        Self {
            category: category.into(),
            status,
        }
    }

    /// Anything not closed is still active
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status != TicketStatus::Closed
    }

    /// Open and raised under one of `categories`
    #[must_use]
    pub fn is_open_in(&self, categories: &[String]) -> bool {
        self.is_open() && categories.iter().any(|category| *category == self.category)
    }
}
