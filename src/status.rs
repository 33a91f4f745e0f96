use chrono::{DateTime, Utc};

use crate::balance::total_paid;
use crate::config::LedgerConfig;
use crate::model::{Loan, Payment};
use crate::types::LoanStatus;

/// calendar days the loan is past its due date as of `today`;
/// zero or negative while the due date has not passed
pub fn days_past_due(loan: &Loan, today: DateTime<Utc>) -> i64 {
    (today.date_naive() - loan.due_date.date_naive()).num_days()
}

/// classify the loan from its terms and payment history. pure and
/// idempotent; recomputed from scratch on every call, so any status is
/// reachable from any other when the underlying facts change.
///
/// priority order, first match wins:
/// 1. payments cover the principal -> paid, regardless of due date
/// 2. past due beyond the grace threshold -> defaulted
/// 3. past due within the grace threshold -> overdue
/// 4. otherwise -> active
pub fn resolve_status(
    loan: &Loan,
    payments: &[Payment],
    today: DateTime<Utc>,
    config: &LedgerConfig,
) -> LoanStatus {
    if total_paid(loan, payments) >= loan.principal {
        return LoanStatus::Paid;
    }

    let days_late = days_past_due(loan, today);
    if days_late > config.grace_period_days as i64 {
        LoanStatus::Defaulted
    } else if days_late >= 1 {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}
