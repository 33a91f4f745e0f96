use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{BorrowerId, LoanId, LoanStatus, PaymentId};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // borrower events
    BorrowerAdded {
        borrower_id: BorrowerId,
        name: String,
    },
    BorrowerUpdated {
        borrower_id: BorrowerId,
        loans_resynced: usize,
    },
    BorrowerDeleted {
        borrower_id: BorrowerId,
    },

    // loan events
    LoanAdded {
        loan_id: LoanId,
        borrower_id: BorrowerId,
        principal: Money,
    },
    LoanUpdated {
        loan_id: LoanId,
    },
    LoanDeleted {
        loan_id: LoanId,
        payments_removed: usize,
    },

    // payment events
    PaymentRecorded {
        payment_id: PaymentId,
        loan_id: LoanId,
        amount: Money,
        payment_date: DateTime<Utc>,
    },
    PaymentUpdated {
        payment_id: PaymentId,
        loan_id: LoanId,
    },
    PaymentDeleted {
        payment_id: PaymentId,
        loan_id: LoanId,
    },

    // derived state events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
    },

    // settings and bulk events
    SettingsUpdated,
    DataImported {
        borrowers: usize,
        loans: usize,
        payments: usize,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_take_events_drains_store() {
        let mut store = EventStore::new();
        store.emit(Event::BorrowerAdded {
            borrower_id: Uuid::new_v4(),
            name: "Ana".to_string(),
        });
        store.emit(Event::SettingsUpdated);

        assert_eq!(store.events().len(), 2);

        let taken = store.take_events();
        assert_eq!(taken.len(), 2);
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_status_changed_round_trips_json() {
        let event = Event::StatusChanged {
            loan_id: Uuid::new_v4(),
            old_status: crate::types::LoanStatus::Active,
            new_status: crate::types::LoanStatus::Paid,
            reason: "payment recorded".to_string(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
