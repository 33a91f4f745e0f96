use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a borrower
pub type BorrowerId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// loan lifecycle status, always derived from terms and payment history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// performing, due date not yet passed
    Active,
    /// payments cover the principal (or the record-payment override fired)
    Paid,
    /// past due date, within the grace threshold
    Overdue,
    /// past due date beyond the grace threshold
    Defaulted,
}

impl LoanStatus {
    /// overdue and defaulted loans both count as late exposure
    pub fn is_late(&self) -> bool {
        matches!(self, LoanStatus::Overdue | LoanStatus::Defaulted)
    }
}

/// payment cadence agreed for a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

/// placeholder schedule record carrying only the next expected payment date.
/// no generator exists for this; it is set by the caller and read by the
/// upcoming-due filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleInfo {
    pub next_payment_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LoanStatus::Defaulted).unwrap(),
            "\"defaulted\""
        );
        assert_eq!(
            serde_json::from_str::<LoanStatus>("\"active\"").unwrap(),
            LoanStatus::Active
        );
    }

    #[test]
    fn test_frequency_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentFrequency::Biweekly).unwrap(),
            "\"biweekly\""
        );
    }

    #[test]
    fn test_is_late() {
        assert!(LoanStatus::Overdue.is_late());
        assert!(LoanStatus::Defaulted.is_late());
        assert!(!LoanStatus::Active.is_late());
        assert!(!LoanStatus::Paid.is_late());
    }
}
