//! Account cleanup: removes a user and every row that depends on it.
//!
//! Records reach their owner only through a category, so each branch first
//! resolves the user's category ids, removes records pointing at them, then
//! removes the categories. Order is always Record -> Category -> User.

use tracing::{debug, error, info};

use crate::error::Result;
use crate::store::{Column, Filter, Store, Table};

/// Rows removed by one cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub expense_records: usize,
    pub expense_categories: usize,
    pub income_records: usize,
    pub income_categories: usize,
    pub payment_types: usize,
    /// False when the user row was already absent.
    pub user_removed: bool,
}

impl CleanupReport {
    pub fn total_rows(&self) -> usize {
        self.expense_records
            + self.expense_categories
            + self.income_records
            + self.income_categories
            + self.payment_types
            + usize::from(self.user_removed)
    }
}

/// Deletes `user_id` and all dependent rows, leaf tables first.
///
/// Does not check that the user exists: an absent user yields empty lookups
/// and zero-row deletes, and the report comes back with `user_removed ==
/// false`. The first failing step aborts the run with its error; steps that
/// already ran are not undone here, so callers wanting atomicity pass a
/// transaction-backed store.
pub fn delete_user_and_dependents<S: Store + ?Sized>(store: &S, user_id: i64) -> Result<CleanupReport> {
    let owned = Filter::Eq(Column::UserId, user_id);
    let mut report = CleanupReport::default();

    let expense_ids = step(user_id, "select expense categories", || {
        store.select_ids(Table::ExpenseCategories, &owned)
    })?;
    report.expense_records = step(user_id, "delete expense records", || {
        store.delete(Table::ExpenseRecords, &Filter::In(Column::CategoryId, expense_ids))
    })?;
    report.expense_categories = step(user_id, "delete expense categories", || {
        store.delete(Table::ExpenseCategories, &owned)
    })?;

    let income_ids = step(user_id, "select income categories", || {
        store.select_ids(Table::IncomeCategories, &owned)
    })?;
    report.income_records = step(user_id, "delete income records", || {
        store.delete(Table::IncomeRecords, &Filter::In(Column::CategoryId, income_ids))
    })?;
    report.income_categories = step(user_id, "delete income categories", || {
        store.delete(Table::IncomeCategories, &owned)
    })?;

    report.payment_types = step(user_id, "delete payment types", || {
        store.delete(Table::PaymentTypes, &owned)
    })?;

    let removed = step(user_id, "delete user", || {
        store.delete(Table::Users, &Filter::Eq(Column::Id, user_id))
    })?;
    report.user_removed = removed > 0;

    info!(
        user_id,
        user_removed = report.user_removed,
        rows = report.total_rows(),
        "account cleanup finished"
    );
    Ok(report)
}

fn step<T>(user_id: i64, name: &'static str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    debug!(user_id, step = name, "account cleanup step");
    run().map_err(|e| {
        error!(user_id, step = name, error = %e, "account cleanup step failed");
        e
    })
}
