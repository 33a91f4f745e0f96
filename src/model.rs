use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppSettings;
use crate::decimal::{Money, Rate};
use crate::types::{
    BorrowerId, LoanId, LoanStatus, PaymentFrequency, PaymentId, PaymentScheduleInfo,
};

/// a person or entity money has been lent to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// insert shape for borrowers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBorrower {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewBorrower {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }
}

impl Borrower {
    pub fn new(details: NewBorrower, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: details.name,
            email: details.email,
            phone: details.phone,
            created_at,
        }
    }
}

/// a loan extended to a borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower_id: BorrowerId,
    /// cached borrower display name, re-synced whenever the borrower
    /// reference (or the borrower itself) changes
    pub borrower_name: String,
    pub principal: Money,
    pub interest_rate: Rate,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: LoanStatus,
    pub frequency: PaymentFrequency,
    pub schedule: Option<PaymentScheduleInfo>,
    pub installments: Option<u32>,
    pub installment_amount: Option<Money>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// insert shape for loans; status and borrower name are assigned by the
/// ledger, not the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub borrower_id: BorrowerId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub frequency: PaymentFrequency,
    pub schedule: Option<PaymentScheduleInfo>,
    pub installments: Option<u32>,
    pub installment_amount: Option<Money>,
    pub notes: Option<String>,
}

impl LoanTerms {
    /// new terms pre-filled from the app settings defaults
    pub fn from_settings(
        borrower_id: BorrowerId,
        principal: Money,
        issue_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        settings: &AppSettings,
    ) -> Self {
        Self {
            borrower_id,
            principal,
            interest_rate: settings.default_interest_rate,
            issue_date,
            due_date,
            frequency: settings.default_frequency,
            schedule: None,
            installments: Some(settings.default_installments),
            installment_amount: None,
            notes: None,
        }
    }
}

impl Loan {
    /// new loans always start active; the next resolution pass corrects
    /// loans issued past their due date
    pub fn new(terms: LoanTerms, borrower_name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            borrower_id: terms.borrower_id,
            borrower_name,
            principal: terms.principal,
            interest_rate: terms.interest_rate,
            issue_date: terms.issue_date,
            due_date: terms.due_date,
            status: LoanStatus::Active,
            frequency: terms.frequency,
            schedule: terms.schedule,
            installments: terms.installments,
            installment_amount: terms.installment_amount,
            notes: terms.notes,
            created_at,
        }
    }

    /// overwrite the mutable terms, keeping id, status and created_at
    pub fn apply_terms(&mut self, terms: LoanTerms, borrower_name: String) {
        self.borrower_id = terms.borrower_id;
        self.borrower_name = borrower_name;
        self.principal = terms.principal;
        self.interest_rate = terms.interest_rate;
        self.issue_date = terms.issue_date;
        self.due_date = terms.due_date;
        self.frequency = terms.frequency;
        self.schedule = terms.schedule;
        self.installments = terms.installments;
        self.installment_amount = terms.installment_amount;
        self.notes = terms.notes;
    }
}

/// a payment recorded against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub date: DateTime<Utc>,
    /// total amount received
    pub amount: Money,
    /// principal component of the amount
    pub principal: Money,
    /// interest component of the amount
    pub interest: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// insert shape for payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub loan_id: LoanId,
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub principal: Money,
    pub interest: Money,
    pub notes: Option<String>,
}

impl PaymentDetails {
    /// payment with the full amount treated as principal
    pub fn principal_only(loan_id: LoanId, date: DateTime<Utc>, amount: Money) -> Self {
        Self {
            loan_id,
            date,
            amount,
            principal: amount,
            interest: Money::ZERO,
            notes: None,
        }
    }
}

impl Payment {
    pub fn new(details: PaymentDetails, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id: details.loan_id,
            date: details.date,
            amount: details.amount,
            principal: details.principal,
            interest: details.interest,
            notes: details.notes,
            created_at,
        }
    }

    /// overwrite the mutable fields, keeping id and created_at
    pub fn apply_details(&mut self, details: PaymentDetails) {
        self.loan_id = details.loan_id;
        self.date = details.date;
        self.amount = details.amount;
        self.principal = details.principal;
        self.interest = details.interest;
        self.notes = details.notes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_new_loan_starts_active() {
        let now = day(2024, 1, 1);
        let borrower = Borrower::new(NewBorrower::named("Ana"), now);
        let terms = LoanTerms {
            borrower_id: borrower.id,
            principal: Money::from_major(1_000),
            interest_rate: Rate::from_percentage(5),
            // issued already past its due date; still starts active
            issue_date: day(2023, 1, 1),
            due_date: day(2023, 6, 1),
            frequency: PaymentFrequency::Monthly,
            schedule: None,
            installments: None,
            installment_amount: None,
            notes: None,
        };

        let loan = Loan::new(terms, borrower.name.clone(), now);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.borrower_name, "Ana");
    }

    #[test]
    fn test_terms_from_settings_prefill() {
        let settings = AppSettings::default();
        let now = day(2024, 3, 1);
        let terms = LoanTerms::from_settings(
            Uuid::new_v4(),
            Money::from_major(500),
            now,
            day(2024, 9, 1),
            &settings,
        );

        assert_eq!(terms.interest_rate, settings.default_interest_rate);
        assert_eq!(terms.frequency, PaymentFrequency::Monthly);
        assert_eq!(terms.installments, Some(12));
    }

    #[test]
    fn test_apply_terms_keeps_identity() {
        let now = day(2024, 1, 1);
        let borrower_id = Uuid::new_v4();
        let terms = LoanTerms {
            borrower_id,
            principal: Money::from_major(1_000),
            interest_rate: Rate::from_percentage(5),
            issue_date: now,
            due_date: day(2024, 7, 1),
            frequency: PaymentFrequency::Monthly,
            schedule: None,
            installments: None,
            installment_amount: None,
            notes: None,
        };

        let mut loan = Loan::new(terms.clone(), "Ana".to_string(), now);
        let id = loan.id;

        let mut updated = terms;
        updated.principal = Money::from_major(2_000);
        updated.notes = Some("extended".to_string());
        loan.apply_terms(updated, "Ana".to_string());

        assert_eq!(loan.id, id);
        assert_eq!(loan.created_at, now);
        assert_eq!(loan.principal, Money::from_major(2_000));
        assert_eq!(loan.notes.as_deref(), Some("extended"));
    }

    #[test]
    fn test_principal_only_payment() {
        let details =
            PaymentDetails::principal_only(Uuid::new_v4(), day(2024, 2, 1), Money::from_major(300));
        assert_eq!(details.principal, Money::from_major(300));
        assert_eq!(details.interest, Money::ZERO);
    }
}
