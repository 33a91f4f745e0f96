use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::model::{Borrower, Loan, Payment};
use crate::types::{
    BorrowerId, LoanId, LoanStatus, PaymentFrequency, PaymentId, PaymentScheduleInfo,
};

const BORROWERS_SECTION: &str = "BORROWERS";
const LOANS_SECTION: &str = "LOANS";
const PAYMENTS_SECTION: &str = "PAYMENTS";

/// the three collections parsed out of one import document
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedData {
    pub borrowers: Vec<Borrower>,
    pub loans: Vec<Loan>,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BorrowerRow {
    id: BorrowerId,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoanRow {
    id: LoanId,
    borrower_id: BorrowerId,
    borrower_name: String,
    principal: Money,
    interest_rate: Rate,
    issue_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    status: LoanStatus,
    frequency: PaymentFrequency,
    next_payment_date: Option<DateTime<Utc>>,
    installments: Option<u32>,
    installment_amount: Option<Money>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PaymentRow {
    id: PaymentId,
    loan_id: LoanId,
    date: DateTime<Utc>,
    amount: Money,
    principal: Money,
    interest: Money,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&Borrower> for BorrowerRow {
    fn from(b: &Borrower) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            created_at: b.created_at,
        }
    }
}

impl From<BorrowerRow> for Borrower {
    fn from(row: BorrowerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

impl From<&Loan> for LoanRow {
    fn from(l: &Loan) -> Self {
        Self {
            id: l.id,
            borrower_id: l.borrower_id,
            borrower_name: l.borrower_name.clone(),
            principal: l.principal,
            interest_rate: l.interest_rate,
            issue_date: l.issue_date,
            due_date: l.due_date,
            status: l.status,
            frequency: l.frequency,
            next_payment_date: l.schedule.map(|s| s.next_payment_date),
            installments: l.installments,
            installment_amount: l.installment_amount,
            notes: l.notes.clone(),
            created_at: l.created_at,
        }
    }
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Self {
            id: row.id,
            borrower_id: row.borrower_id,
            borrower_name: row.borrower_name,
            principal: row.principal,
            interest_rate: row.interest_rate,
            issue_date: row.issue_date,
            due_date: row.due_date,
            status: row.status,
            frequency: row.frequency,
            schedule: row
                .next_payment_date
                .map(|d| PaymentScheduleInfo {
                    next_payment_date: d,
                }),
            installments: row.installments,
            installment_amount: row.installment_amount,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

impl From<&Payment> for PaymentRow {
    fn from(p: &Payment) -> Self {
        Self {
            id: p.id,
            loan_id: p.loan_id,
            date: p.date,
            amount: p.amount,
            principal: p.principal,
            interest: p.interest,
            notes: p.notes.clone(),
            created_at: p.created_at,
        }
    }
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            loan_id: row.loan_id,
            date: row.date,
            amount: row.amount,
            principal: row.principal,
            interest: row.interest,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

fn write_section<R: Serialize>(out: &mut String, name: &str, rows: impl Iterator<Item = R>) {
    out.push('[');
    out.push_str(name);
    out.push_str("]\n");

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        // writing to an in-memory buffer cannot fail
        writer.serialize(row).expect("csv write to vec");
    }
    let bytes = writer.into_inner().expect("csv flush to vec");
    out.push_str(&String::from_utf8(bytes).expect("csv output is utf-8"));
}

/// render the three collections into the sectioned text format:
/// a `[BORROWERS]`, `[LOANS]` and `[PAYMENTS]` header each followed by
/// csv rows (rfc 3339 dates, plain decimal amounts, empty cell = none)
pub fn export_portfolio(borrowers: &[Borrower], loans: &[Loan], payments: &[Payment]) -> String {
    let mut out = String::new();
    write_section(&mut out, BORROWERS_SECTION, borrowers.iter().map(BorrowerRow::from));
    write_section(&mut out, LOANS_SECTION, loans.iter().map(LoanRow::from));
    write_section(&mut out, PAYMENTS_SECTION, payments.iter().map(PaymentRow::from));
    out
}

fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

fn split_sections(data: &str) -> Result<[String; 3]> {
    let mut sections: [Option<String>; 3] = [None, None, None];
    let mut current: Option<usize> = None;

    for line in data.lines() {
        if let Some(name) = section_header(line) {
            let index = match name {
                BORROWERS_SECTION => 0,
                LOANS_SECTION => 1,
                PAYMENTS_SECTION => 2,
                other => {
                    return Err(LedgerError::ImportRow {
                        section: other.to_string(),
                        line: 0,
                        message: "unknown section".to_string(),
                    })
                }
            };
            sections[index] = Some(String::new());
            current = Some(index);
            continue;
        }

        if let Some(index) = current {
            let body = sections[index].as_mut().expect("section started");
            body.push_str(line);
            body.push('\n');
        }
    }

    let [b, l, p] = sections;
    let require = |section: Option<String>, name: &str| {
        section.ok_or_else(|| LedgerError::ImportMissingSection {
            section: name.to_string(),
        })
    };

    Ok([
        require(b, BORROWERS_SECTION)?,
        require(l, LOANS_SECTION)?,
        require(p, PAYMENTS_SECTION)?,
    ])
}

fn parse_section<R, T>(body: &str, section: &str) -> Result<Vec<T>>
where
    R: for<'de> Deserialize<'de>,
    T: From<R>,
{
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut out = Vec::new();

    for (index, record) in reader.deserialize::<R>().enumerate() {
        // header is line 1 of the section body
        let line = index + 2;
        let row = record.map_err(|e| LedgerError::ImportRow {
            section: section.to_string(),
            line,
            message: e.to_string(),
        })?;
        out.push(T::from(row));
    }

    Ok(out)
}

/// parse and validate a whole import document. fails closed: any
/// invalid content rejects the entire document and nothing is returned.
pub fn import_portfolio(data: &str) -> Result<ImportedData> {
    let [borrowers_body, loans_body, payments_body] = split_sections(data)?;

    let borrowers: Vec<Borrower> = parse_section::<BorrowerRow, _>(&borrowers_body, BORROWERS_SECTION)?;
    let loans: Vec<Loan> = parse_section::<LoanRow, _>(&loans_body, LOANS_SECTION)?;
    let payments: Vec<Payment> = parse_section::<PaymentRow, _>(&payments_body, PAYMENTS_SECTION)?;

    let borrower_ids: HashSet<BorrowerId> = borrowers.iter().map(|b| b.id).collect();
    for loan in &loans {
        if !borrower_ids.contains(&loan.borrower_id) {
            return Err(LedgerError::ImportReference {
                message: format!(
                    "loan {} references unknown borrower {}",
                    loan.id, loan.borrower_id
                ),
            });
        }
    }

    let loan_ids: HashSet<LoanId> = loans.iter().map(|l| l.id).collect();
    for payment in &payments {
        if !loan_ids.contains(&payment.loan_id) {
            return Err(LedgerError::ImportReference {
                message: format!(
                    "payment {} references unknown loan {}",
                    payment.id, payment.loan_id
                ),
            });
        }
    }

    Ok(ImportedData {
        borrowers,
        loans,
        payments,
    })
}
