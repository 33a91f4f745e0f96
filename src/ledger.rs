use hourglass_rs::SafeTimeProvider;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::balance::{self, LoanMetrics};
use crate::config::{AppSettings, LedgerConfig};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::interchange;
use crate::model::{Borrower, Loan, LoanTerms, NewBorrower, Payment, PaymentDetails};
use crate::portfolio::{self, DashboardMetrics};
use crate::status::resolve_status;
use crate::types::{BorrowerId, LoanId, LoanStatus, PaymentId};

/// serializable snapshot of the whole portfolio, handed to whatever
/// persistence collaborator the application wires in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub borrowers: Vec<Borrower>,
    pub loans: Vec<Loan>,
    pub payments: Vec<Payment>,
    pub settings: AppSettings,
}

/// the mutation coordinator: owns the entity collections, enforces
/// referential integrity and re-derives loan status on every payment
/// mutation. single-writer; every operation completes its dependent
/// recomputation before returning, so no stale status is observable
/// after a committed mutation.
pub struct LoanLedger {
    borrowers: Vec<Borrower>,
    loans: Vec<Loan>,
    payments: Vec<Payment>,
    settings: AppSettings,
    config: LedgerConfig,
    pub events: EventStore,
}

impl LoanLedger {
    /// empty ledger with default settings
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            borrowers: Vec::new(),
            loans: Vec::new(),
            payments: Vec::new(),
            settings: AppSettings::default(),
            config,
            events: EventStore::new(),
        }
    }

    /// rebuild a ledger from a previously captured snapshot
    pub fn from_snapshot(snapshot: LedgerSnapshot, config: LedgerConfig) -> Self {
        Self {
            borrowers: snapshot.borrowers,
            loans: snapshot.loans,
            payments: snapshot.payments,
            settings: snapshot.settings,
            config,
            events: EventStore::new(),
        }
    }

    /// capture the current collections and settings
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            borrowers: self.borrowers.clone(),
            loans: self.loans.clone(),
            payments: self.payments.clone(),
            settings: self.settings.clone(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ---- borrowers ----

    pub fn borrowers(&self) -> &[Borrower] {
        &self.borrowers
    }

    pub fn borrower(&self, id: BorrowerId) -> Option<&Borrower> {
        self.borrowers.iter().find(|b| b.id == id)
    }

    pub fn add_borrower(
        &mut self,
        details: NewBorrower,
        time_provider: &SafeTimeProvider,
    ) -> BorrowerId {
        let borrower = Borrower::new(details, time_provider.now());
        let id = borrower.id;

        debug!("adding borrower {} ({})", borrower.name, id);
        self.events.emit(Event::BorrowerAdded {
            borrower_id: id,
            name: borrower.name.clone(),
        });
        self.borrowers.push(borrower);

        id
    }

    /// update a borrower and re-sync the cached display name on every
    /// loan referencing it
    pub fn update_borrower(&mut self, id: BorrowerId, details: NewBorrower) -> Result<()> {
        let borrower = self
            .borrowers
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LedgerError::BorrowerNotFound { id })?;

        borrower.name = details.name;
        borrower.email = details.email;
        borrower.phone = details.phone;
        let name = borrower.name.clone();

        let mut resynced = 0;
        for loan in self.loans.iter_mut().filter(|l| l.borrower_id == id) {
            if loan.borrower_name != name {
                loan.borrower_name = name.clone();
                resynced += 1;
            }
        }

        self.events.emit(Event::BorrowerUpdated {
            borrower_id: id,
            loans_resynced: resynced,
        });

        Ok(())
    }

    /// rejected while any loan references the borrower; the collections
    /// are left unchanged
    pub fn delete_borrower(&mut self, id: BorrowerId) -> Result<()> {
        if self.borrower(id).is_none() {
            return Err(LedgerError::BorrowerNotFound { id });
        }

        let loan_count = self.loans.iter().filter(|l| l.borrower_id == id).count();
        if loan_count > 0 {
            warn!("refusing to delete borrower {id}: {loan_count} loan(s) reference it");
            return Err(LedgerError::BorrowerHasLoans { id, loan_count });
        }

        self.borrowers.retain(|b| b.id != id);
        self.events.emit(Event::BorrowerDeleted { borrower_id: id });

        Ok(())
    }

    // ---- loans ----

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    pub fn loans_by_borrower(&self, borrower_id: BorrowerId) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.borrower_id == borrower_id)
            .collect()
    }

    /// the referenced borrower must exist; its display name is cached on
    /// the loan. status starts active regardless of dates, until the
    /// next resolution pass.
    pub fn add_loan(&mut self, terms: LoanTerms, time_provider: &SafeTimeProvider) -> Result<LoanId> {
        let borrower = self
            .borrower(terms.borrower_id)
            .ok_or(LedgerError::BorrowerNotFound {
                id: terms.borrower_id,
            })?;

        let loan = Loan::new(terms, borrower.name.clone(), time_provider.now());
        let id = loan.id;

        debug!("adding loan {} for borrower {}", id, loan.borrower_id);
        self.events.emit(Event::LoanAdded {
            loan_id: id,
            borrower_id: loan.borrower_id,
            principal: loan.principal,
        });
        self.loans.push(loan);

        Ok(id)
    }

    /// a changed borrower reference must resolve; the cached name is
    /// overwritten from the (possibly new) borrower
    pub fn update_loan(&mut self, id: LoanId, terms: LoanTerms) -> Result<()> {
        let borrower_name = self
            .borrower(terms.borrower_id)
            .map(|b| b.name.clone())
            .ok_or(LedgerError::BorrowerNotFound {
                id: terms.borrower_id,
            })?;

        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(LedgerError::LoanNotFound { id })?;

        loan.apply_terms(terms, borrower_name);
        self.events.emit(Event::LoanUpdated { loan_id: id });

        Ok(())
    }

    /// cascades: payments referencing the loan are deleted first
    pub fn delete_loan(&mut self, id: LoanId) -> Result<()> {
        if self.loan(id).is_none() {
            return Err(LedgerError::LoanNotFound { id });
        }

        let before = self.payments.len();
        self.payments.retain(|p| p.loan_id != id);
        let payments_removed = before - self.payments.len();

        self.loans.retain(|l| l.id != id);

        debug!("deleted loan {id} and {payments_removed} payment(s)");
        self.events.emit(Event::LoanDeleted {
            loan_id: id,
            payments_removed,
        });

        Ok(())
    }

    // ---- payments ----

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn payments_by_loan(&self, loan_id: LoanId) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|p| p.loan_id == loan_id)
            .collect()
    }

    /// the referenced loan must exist. after insertion the owning loan
    /// is marked paid unconditionally, even for a partial payment.
    /// `strict_paid_resolution` runs the balance-based resolver
    /// instead.
    pub fn add_payment(
        &mut self,
        details: PaymentDetails,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentId> {
        let loan_id = details.loan_id;
        if self.loan(loan_id).is_none() {
            return Err(LedgerError::LoanNotFound { id: loan_id });
        }

        let payment = Payment::new(details, time_provider.now());
        let id = payment.id;

        self.events.emit(Event::PaymentRecorded {
            payment_id: id,
            loan_id,
            amount: payment.amount,
            payment_date: payment.date,
        });
        self.payments.push(payment);

        if self.config.strict_paid_resolution {
            self.resolve_loan(loan_id, time_provider, "payment recorded");
        } else {
            self.mark_paid(loan_id, "payment recorded");
        }

        Ok(id)
    }

    /// re-runs the general resolver against the updated payment set; the
    /// loan is rewritten only when its status changed. moving a payment
    /// to another loan re-resolves both.
    pub fn update_payment(
        &mut self,
        id: PaymentId,
        details: PaymentDetails,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        let new_loan_id = details.loan_id;
        if self.loan(new_loan_id).is_none() {
            return Err(LedgerError::LoanNotFound { id: new_loan_id });
        }

        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LedgerError::PaymentNotFound { id })?;

        let old_loan_id = payment.loan_id;
        payment.apply_details(details);

        self.events.emit(Event::PaymentUpdated {
            payment_id: id,
            loan_id: new_loan_id,
        });

        self.resolve_loan(new_loan_id, time_provider, "payment updated");
        if old_loan_id != new_loan_id {
            self.resolve_loan(old_loan_id, time_provider, "payment moved away");
        }

        Ok(())
    }

    /// re-runs the general resolver for the owning loan after removal
    pub fn delete_payment(&mut self, id: PaymentId, time_provider: &SafeTimeProvider) -> Result<()> {
        let loan_id = self
            .payment(id)
            .map(|p| p.loan_id)
            .ok_or(LedgerError::PaymentNotFound { id })?;

        self.payments.retain(|p| p.id != id);
        self.events.emit(Event::PaymentDeleted {
            payment_id: id,
            loan_id,
        });

        self.resolve_loan(loan_id, time_provider, "payment deleted");

        Ok(())
    }

    // ---- derived state ----

    /// re-resolve every loan from scratch; loans whose computed status
    /// differs from the stored one are rewritten and announced. returns
    /// how many changed.
    pub fn refresh_statuses(&mut self, time_provider: &SafeTimeProvider) -> usize {
        let today = time_provider.now();
        let mut changed = 0;

        for i in 0..self.loans.len() {
            let new_status =
                resolve_status(&self.loans[i], &self.payments, today, &self.config);
            let loan = &mut self.loans[i];
            if loan.status != new_status {
                let old_status = loan.status;
                loan.status = new_status;
                changed += 1;

                self.events.emit(Event::StatusChanged {
                    loan_id: loan.id,
                    old_status,
                    new_status,
                    reason: "status refresh".to_string(),
                });
            }
        }

        if changed > 0 {
            debug!("status refresh reclassified {changed} loan(s)");
        }
        changed
    }

    pub fn remaining_balance(&self, loan_id: LoanId) -> Option<Money> {
        self.loan(loan_id)
            .map(|loan| balance::remaining_balance(loan, &self.payments, &self.config))
    }

    pub fn loan_metrics(&self, loan_id: LoanId) -> Option<LoanMetrics> {
        self.loan(loan_id)
            .map(|loan| balance::loan_metrics(loan, &self.payments, &self.config))
    }

    pub fn dashboard_metrics(&self, time_provider: &SafeTimeProvider) -> DashboardMetrics {
        portfolio::dashboard_metrics(
            &self.loans,
            &self.payments,
            &self.borrowers,
            time_provider.now(),
            &self.config,
        )
    }

    pub fn overdue_loans(&self) -> Vec<&Loan> {
        portfolio::overdue_loans(&self.loans)
    }

    pub fn upcoming_due_loans(
        &self,
        horizon_days: u32,
        time_provider: &SafeTimeProvider,
    ) -> Vec<&Loan> {
        portfolio::upcoming_due_loans(&self.loans, horizon_days, time_provider.now())
    }

    // ---- settings ----

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
        self.events.emit(Event::SettingsUpdated);
    }

    // ---- import / export ----

    /// serialize the three collections into the sectioned text format
    pub fn export_data(&self) -> String {
        interchange::export_portfolio(&self.borrowers, &self.loans, &self.payments)
    }

    /// parse and validate the whole document, then replace the
    /// collections atomically. any failure leaves the existing
    /// collections exactly as they were.
    pub fn import_data(&mut self, data: &str) -> Result<()> {
        let imported = interchange::import_portfolio(data).map_err(|e| {
            warn!("import rejected: {e}");
            e
        })?;

        self.events.emit(Event::DataImported {
            borrowers: imported.borrowers.len(),
            loans: imported.loans.len(),
            payments: imported.payments.len(),
        });

        self.borrowers = imported.borrowers;
        self.loans = imported.loans;
        self.payments = imported.payments;

        Ok(())
    }

    // ---- internal ----

    /// general resolver pass for one loan; rewrites only on change
    fn resolve_loan(&mut self, loan_id: LoanId, time_provider: &SafeTimeProvider, reason: &str) {
        let today = time_provider.now();
        let Some(index) = self.loans.iter().position(|l| l.id == loan_id) else {
            return;
        };

        let new_status = resolve_status(&self.loans[index], &self.payments, today, &self.config);
        let loan = &mut self.loans[index];
        if loan.status != new_status {
            let old_status = loan.status;
            loan.status = new_status;

            self.events.emit(Event::StatusChanged {
                loan_id,
                old_status,
                new_status,
                reason: reason.to_string(),
            });
        }
    }

    /// the record-payment override: paid right away, no balance check
    fn mark_paid(&mut self, loan_id: LoanId, reason: &str) {
        let Some(loan) = self.loans.iter_mut().find(|l| l.id == loan_id) else {
            return;
        };

        if loan.status != LoanStatus::Paid {
            let old_status = loan.status;
            loan.status = LoanStatus::Paid;

            self.events.emit(Event::StatusChanged {
                loan_id,
                old_status,
                new_status: LoanStatus::Paid,
                reason: reason.to_string(),
            });
        }
    }
}
