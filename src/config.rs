use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::types::PaymentFrequency;

/// days past due before an overdue loan is reclassified as defaulted
pub const DEFAULT_GRACE_PERIOD_DAYS: u32 = 15;

/// ledger behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// grace threshold separating overdue from defaulted
    pub grace_period_days: u32,
    /// clamp remaining balance at zero for over-paid loans.
    /// off by default: over-payments show as negative balances.
    pub clamp_overpaid_balance: bool,
    /// when set, recording a payment runs the general balance-based
    /// resolver instead of unconditionally marking the loan paid.
    /// off by default: any recorded payment marks the loan paid
    /// immediately, even a partial one.
    pub strict_paid_resolution: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            clamp_overpaid_balance: false,
            strict_paid_resolution: false,
        }
    }
}

impl LedgerConfig {
    pub fn with_grace_period(days: u32) -> Self {
        Self {
            grace_period_days: days,
            ..Self::default()
        }
    }
}

/// user-facing defaults used to pre-fill new loans; never consulted by
/// the calculation core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub default_interest_rate: Rate,
    pub default_frequency: PaymentFrequency,
    pub default_installments: u32,
    pub currency_symbol: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_interest_rate: Rate::from_decimal(dec!(0.05)),
            default_frequency: PaymentFrequency::Monthly,
            default_installments: 12,
            currency_symbol: "R$".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.grace_period_days, DEFAULT_GRACE_PERIOD_DAYS);
        assert!(!config.clamp_overpaid_balance);
        assert!(!config.strict_paid_resolution);
    }

    #[test]
    fn test_with_grace_period() {
        let config = LedgerConfig::with_grace_period(5);
        assert_eq!(config.grace_period_days, 5);
        assert!(!config.strict_paid_resolution);
    }

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.default_interest_rate, Rate::from_percentage(5));
        assert_eq!(settings.default_frequency, PaymentFrequency::Monthly);
        assert_eq!(settings.default_installments, 12);
        assert_eq!(settings.currency_symbol, "R$");
    }
}
