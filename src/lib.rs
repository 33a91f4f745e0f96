pub mod balance;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interchange;
pub mod ledger;
pub mod model;
pub mod portfolio;
pub mod status;
pub mod types;

// re-export key types
pub use balance::{loan_metrics, remaining_balance, LoanMetrics};
pub use config::{AppSettings, LedgerConfig, DEFAULT_GRACE_PERIOD_DAYS};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use interchange::{export_portfolio, import_portfolio, ImportedData};
pub use ledger::{LedgerSnapshot, LoanLedger};
pub use model::{Borrower, Loan, LoanTerms, NewBorrower, Payment, PaymentDetails};
pub use portfolio::{dashboard_metrics, overdue_loans, upcoming_due_loans, DashboardMetrics};
pub use status::{days_past_due, resolve_status};
pub use types::{
    BorrowerId, LoanId, LoanStatus, PaymentFrequency, PaymentId, PaymentScheduleInfo,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
