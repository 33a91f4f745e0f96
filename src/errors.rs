use thiserror::Error;

use crate::types::{BorrowerId, LoanId, PaymentId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("borrower not found: {id}")]
    BorrowerNotFound {
        id: BorrowerId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: PaymentId,
    },

    #[error("borrower {id} has {loan_count} associated loan(s) and cannot be deleted")]
    BorrowerHasLoans {
        id: BorrowerId,
        loan_count: usize,
    },

    #[error("import is missing required section [{section}]")]
    ImportMissingSection {
        section: String,
    },

    #[error("import failed in section [{section}] at line {line}: {message}")]
    ImportRow {
        section: String,
        line: usize,
        message: String,
    },

    #[error("import references an unknown entity: {message}")]
    ImportReference {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
