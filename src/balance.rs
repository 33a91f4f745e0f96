use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::model::{Loan, Payment};

/// sum of payment amounts recorded against the loan.
/// payments belonging to other loans are ignored.
pub fn total_paid(loan: &Loan, payments: &[Payment]) -> Money {
    payments
        .iter()
        .filter(|p| p.loan_id == loan.id)
        .map(|p| p.amount)
        .sum()
}

/// principal minus everything paid so far. no interest compounding is
/// applied; accrued interest is tracked from the payments' interest
/// components for reporting only. over-paid loans yield a negative
/// balance unless the config clamps at zero.
pub fn remaining_balance(loan: &Loan, payments: &[Payment], config: &LedgerConfig) -> Money {
    let balance = loan.principal - total_paid(loan, payments);
    if config.clamp_overpaid_balance {
        balance.max(Money::ZERO)
    } else {
        balance
    }
}

/// per-loan financial summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanMetrics {
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub remaining_balance: Money,
}

pub fn loan_metrics(loan: &Loan, payments: &[Payment], config: &LedgerConfig) -> LoanMetrics {
    let own_payments: Vec<&Payment> = payments.iter().filter(|p| p.loan_id == loan.id).collect();

    LoanMetrics {
        total_principal: loan.principal,
        total_interest: own_payments.iter().map(|p| p.interest).sum(),
        total_paid: own_payments.iter().map(|p| p.amount).sum(),
        remaining_balance: remaining_balance(loan, payments, config),
    }
}
