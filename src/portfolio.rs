use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::balance::remaining_balance;
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::model::{Borrower, Loan, Payment};
use crate::types::LoanStatus;

/// dashboard-level portfolio summary, recomputed on demand and never
/// persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_loaned: Money,
    pub total_interest_accrued: Money,
    /// outstanding balance across overdue and defaulted loans
    pub total_overdue: Money,
    pub total_borrowers: usize,
    pub active_loan_count: usize,
    pub paid_loan_count: usize,
    pub overdue_loan_count: usize,
    pub defaulted_loan_count: usize,
    /// payments received in today's calendar month and year
    pub total_received_this_month: Money,
}

/// compute the full dashboard summary over the portfolio collections.
/// pure; relies on the statuses stored on the loans, which the ledger
/// keeps in sync with the resolver.
pub fn dashboard_metrics(
    loans: &[Loan],
    payments: &[Payment],
    borrowers: &[Borrower],
    today: DateTime<Utc>,
    config: &LedgerConfig,
) -> DashboardMetrics {
    let total_loaned = loans.iter().map(|l| l.principal).sum();
    let total_interest_accrued = payments.iter().map(|p| p.interest).sum();

    let total_overdue = loans
        .iter()
        .filter(|l| l.status.is_late())
        .map(|l| remaining_balance(l, payments, config))
        .sum();

    let month = today.date_naive().month();
    let year = today.date_naive().year();
    let total_received_this_month = payments
        .iter()
        .filter(|p| p.date.date_naive().month() == month && p.date.date_naive().year() == year)
        .map(|p| p.amount)
        .sum();

    let count_of = |status: LoanStatus| loans.iter().filter(|l| l.status == status).count();

    DashboardMetrics {
        total_loaned,
        total_interest_accrued,
        total_overdue,
        total_borrowers: borrowers.len(),
        active_loan_count: count_of(LoanStatus::Active),
        paid_loan_count: count_of(LoanStatus::Paid),
        overdue_loan_count: count_of(LoanStatus::Overdue),
        defaulted_loan_count: count_of(LoanStatus::Defaulted),
        total_received_this_month,
    }
}

/// loans currently classified overdue or defaulted
pub fn overdue_loans(loans: &[Loan]) -> Vec<&Loan> {
    loans.iter().filter(|l| l.status.is_late()).collect()
}

/// active loans whose schedule has a next payment date within
/// `[today, today + horizon_days]` inclusive. loans without a schedule
/// record are excluded even if otherwise due soon.
pub fn upcoming_due_loans(loans: &[Loan], horizon_days: u32, today: DateTime<Utc>) -> Vec<&Loan> {
    let start = today.date_naive();
    let end = start + Duration::days(horizon_days as i64);

    loans
        .iter()
        .filter(|l| l.status == LoanStatus::Active)
        .filter(|l| {
            l.schedule.is_some_and(|s| {
                let next = s.next_payment_date.date_naive();
                next >= start && next <= end
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::model::{LoanTerms, NewBorrower, PaymentDetails};
    use crate::types::{PaymentFrequency, PaymentScheduleInfo};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn loan_with(
        principal: i64,
        status: LoanStatus,
        schedule: Option<PaymentScheduleInfo>,
    ) -> Loan {
        let terms = LoanTerms {
            borrower_id: Uuid::new_v4(),
            principal: Money::from_major(principal),
            interest_rate: Rate::from_percentage(5),
            issue_date: day(2024, 1, 1),
            due_date: day(2024, 7, 1),
            frequency: PaymentFrequency::Monthly,
            schedule,
            installments: None,
            installment_amount: None,
            notes: None,
        };
        let mut loan = Loan::new(terms, "Ana".to_string(), day(2024, 1, 1));
        loan.status = status;
        loan
    }

    fn payment_of(loan: &Loan, amount: i64, interest: i64, date: DateTime<Utc>) -> Payment {
        Payment::new(
            PaymentDetails {
                loan_id: loan.id,
                date,
                amount: Money::from_major(amount),
                principal: Money::from_major(amount - interest),
                interest: Money::from_major(interest),
                notes: None,
            },
            date,
        )
    }

    #[test]
    fn test_dashboard_totals_and_counts() {
        let config = LedgerConfig::default();
        let borrowers = vec![
            Borrower::new(NewBorrower::named("Ana"), day(2024, 1, 1)),
            Borrower::new(NewBorrower::named("Bruno"), day(2024, 1, 2)),
        ];
        let active = loan_with(1_000, LoanStatus::Active, None);
        let overdue = loan_with(2_000, LoanStatus::Overdue, None);
        let defaulted = loan_with(3_000, LoanStatus::Defaulted, None);
        let paid = loan_with(500, LoanStatus::Paid, None);

        let payments = vec![
            payment_of(&overdue, 500, 50, day(2024, 7, 10)),
            payment_of(&paid, 500, 25, day(2024, 6, 10)),
        ];
        let loans = vec![active, overdue, defaulted, paid];

        let metrics = dashboard_metrics(&loans, &payments, &borrowers, day(2024, 7, 20), &config);

        assert_eq!(metrics.total_loaned, Money::from_major(6_500));
        assert_eq!(metrics.total_interest_accrued, Money::from_major(75));
        // overdue 2000 - 500 paid, defaulted 3000 untouched
        assert_eq!(metrics.total_overdue, Money::from_major(4_500));
        assert_eq!(metrics.total_borrowers, 2);
        assert_eq!(metrics.active_loan_count, 1);
        assert_eq!(metrics.paid_loan_count, 1);
        assert_eq!(metrics.overdue_loan_count, 1);
        assert_eq!(metrics.defaulted_loan_count, 1);
        // only the july payment lands in july's bucket
        assert_eq!(metrics.total_received_this_month, Money::from_major(500));
    }

    #[test]
    fn test_monthly_receipts_use_calendar_month_not_rolling_window() {
        let config = LedgerConfig::default();
        let loan = loan_with(10_000, LoanStatus::Active, None);
        let payments = vec![
            // june 30th: one day before "today" but outside the bucket
            payment_of(&loan, 100, 0, day(2024, 6, 30)),
            payment_of(&loan, 200, 0, day(2024, 7, 1)),
            // july of a previous year does not count
            payment_of(&loan, 400, 0, day(2023, 7, 15)),
        ];
        let loans = vec![loan.clone()];

        let metrics = dashboard_metrics(&loans, &payments, &[], day(2024, 7, 1), &config);
        assert_eq!(metrics.total_received_this_month, Money::from_major(200));
    }

    #[test]
    fn test_borrower_count_tracks_collection_length() {
        let config = LedgerConfig::default();
        let borrowers: Vec<Borrower> = (0..5)
            .map(|i| Borrower::new(NewBorrower::named(format!("b{i}")), day(2024, 1, 1)))
            .collect();

        let metrics = dashboard_metrics(&[], &[], &borrowers, day(2024, 7, 1), &config);
        assert_eq!(metrics.total_borrowers, borrowers.len());
    }

    #[test]
    fn test_overdue_loans_filter() {
        let loans = vec![
            loan_with(1_000, LoanStatus::Active, None),
            loan_with(1_000, LoanStatus::Overdue, None),
            loan_with(1_000, LoanStatus::Defaulted, None),
            loan_with(1_000, LoanStatus::Paid, None),
        ];

        let late = overdue_loans(&loans);
        assert_eq!(late.len(), 2);
        assert!(late.iter().all(|l| l.status.is_late()));
    }

    #[test]
    fn test_upcoming_due_window_is_inclusive() {
        let today = day(2024, 7, 1);
        let at = |d: DateTime<Utc>| {
            Some(PaymentScheduleInfo {
                next_payment_date: d,
            })
        };
        let on_start = loan_with(1_000, LoanStatus::Active, at(day(2024, 7, 1)));
        let on_end = loan_with(1_000, LoanStatus::Active, at(day(2024, 7, 8)));
        let beyond = loan_with(1_000, LoanStatus::Active, at(day(2024, 7, 9)));
        let past = loan_with(1_000, LoanStatus::Active, at(day(2024, 6, 30)));
        let loans = vec![on_start.clone(), on_end.clone(), beyond, past];

        let upcoming = upcoming_due_loans(&loans, 7, today);
        let ids: Vec<_> = upcoming.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![on_start.id, on_end.id]);
    }

    #[test]
    fn test_upcoming_due_excludes_scheduleless_and_inactive() {
        let today = day(2024, 7, 1);
        let schedule = Some(PaymentScheduleInfo {
            next_payment_date: day(2024, 7, 3),
        });
        let no_schedule = loan_with(1_000, LoanStatus::Active, None);
        let overdue = loan_with(1_000, LoanStatus::Overdue, schedule);
        let active = loan_with(1_000, LoanStatus::Active, schedule);
        let loans = vec![no_schedule, overdue, active.clone()];

        let upcoming = upcoming_due_loans(&loans, 7, today);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, active.id);
    }
}
