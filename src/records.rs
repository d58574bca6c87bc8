use std::fmt;

use rusqlite::Connection;

use crate::categories::{get_category, get_item, CategoryKind};
use crate::error::{Result, WalletError};
use crate::models::{text_matches, NewExpense, NewIncome, Record};
use crate::session::Session;
use crate::store::Table;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub fn table(&self) -> Table {
        match self {
            RecordKind::Income => Table::IncomeRecords,
            RecordKind::Expense => Table::ExpenseRecords,
        }
    }

    pub fn category_kind(&self) -> CategoryKind {
        match self {
            RecordKind::Income => CategoryKind::Income,
            RecordKind::Expense => CategoryKind::Expense,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RecordKind::Income => "Income record",
            RecordKind::Expense => "Expense record",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        })
    }
}

/// Narrowing applied by `list_records`. Default lists everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub text: Option<String>,
    pub category_id: Option<i64>,
    pub active: Option<bool>,
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn record_date(date: Option<&str>) -> Result<String> {
    match date {
        Some(d) => validate::date(d),
        None => Ok(today()),
    }
}

// Rejects categories that belong to someone else or have been switched off.
fn usable_category(conn: &Connection, session: &Session, kind: CategoryKind, id: i64) -> Result<()> {
    let category = get_category(conn, session, kind, id)?;
    if !category.is_active {
        return Err(WalletError::Validation(format!(
            "{} {id} ({}) is inactive",
            kind.label(),
            category.description
        )));
    }
    Ok(())
}

pub fn add_income(conn: &Connection, session: &Session, new: &NewIncome) -> Result<i64> {
    usable_category(conn, session, CategoryKind::Income, new.category_id)?;
    let description = validate::description(&new.description)?;
    let amount = validate::amount(new.amount)?;
    let date = record_date(new.date.as_deref())?;

    conn.execute(
        "INSERT INTO income_records (category_id, description, amount, date) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![new.category_id, description, amount, date],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = session.user_id, id, amount, "income recorded");
    Ok(id)
}

pub fn add_expense(conn: &Connection, session: &Session, new: &NewExpense) -> Result<i64> {
    usable_category(conn, session, CategoryKind::Expense, new.category_id)?;
    if let Some(payment) = new.payment_type_id {
        usable_category(conn, session, CategoryKind::Payment, payment)?;
    }
    if let Some(item) = new.item_id {
        get_item(conn, item)?;
    }
    let description = validate::description(&new.description)?;
    let amount = validate::amount(new.amount)?;
    let date = record_date(new.date.as_deref())?;

    conn.execute(
        "INSERT INTO expense_records (category_id, item_id, payment_type_id, description, amount, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            new.category_id,
            new.item_id,
            new.payment_type_id,
            description,
            amount,
            date
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = session.user_id, id, amount, "expense recorded");
    Ok(id)
}

/// Records reachable through the session user's categories, newest first.
pub fn list_records(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    filter: &RecordFilter,
) -> Result<Vec<Record>> {
    let sql = match kind {
        RecordKind::Income => {
            "SELECT r.id, r.category_id, c.description, NULL, NULL, r.description, r.amount, r.date, r.is_active
             FROM income_records r
             JOIN income_categories c ON r.category_id = c.id
             WHERE c.user_id = ?1
               AND (?2 IS NULL OR r.category_id = ?2)
               AND (?3 IS NULL OR r.is_active = ?3)
             ORDER BY r.date DESC, r.id DESC"
        }
        RecordKind::Expense => {
            "SELECT r.id, r.category_id, c.description, i.description, p.description,
                    r.description, r.amount, r.date, r.is_active
             FROM expense_records r
             JOIN expense_categories c ON r.category_id = c.id
             LEFT JOIN expense_items i ON r.item_id = i.id
             LEFT JOIN payment_types p ON r.payment_type_id = p.id
             WHERE c.user_id = ?1
               AND (?2 IS NULL OR r.category_id = ?2)
               AND (?3 IS NULL OR r.is_active = ?3)
             ORDER BY r.date DESC, r.id DESC"
        }
    };

    let mut stmt = conn.prepare(sql)?;
    let records = stmt
        .query_map(
            rusqlite::params![session.user_id, filter.category_id, filter.active],
            |row| {
                Ok(Record {
                    id: row.get(0)?,
                    category_id: row.get(1)?,
                    category: row.get(2)?,
                    item: row.get(3)?,
                    payment_type: row.get(4)?,
                    description: row.get(5)?,
                    amount: row.get(6)?,
                    date: row.get(7)?,
                    is_active: row.get(8)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let needle = filter.text.as_deref().unwrap_or_default();
    Ok(records
        .into_iter()
        .filter(|r| text_matches(&r.description, needle))
        .collect())
}

// Record ids are only addressable through a category the session user owns.
fn owned_clause(kind: RecordKind) -> String {
    let categories = kind.category_kind().table();
    format!(
        "id = ?1 AND category_id IN (SELECT id FROM {categories} WHERE user_id = ?2)"
    )
}

pub fn set_record_active(
    conn: &Connection,
    session: &Session,
    kind: RecordKind,
    id: i64,
    active: bool,
) -> Result<()> {
    let updated = conn.execute(
        &format!(
            "UPDATE {} SET is_active = ?3 WHERE {}",
            kind.table(),
            owned_clause(kind)
        ),
        rusqlite::params![id, session.user_id, active],
    )?;
    if updated == 0 {
        return Err(WalletError::not_found(kind.label(), id));
    }
    Ok(())
}

pub fn delete_record(conn: &Connection, session: &Session, kind: RecordKind, id: i64) -> Result<()> {
    let deleted = conn.execute(
        &format!("DELETE FROM {} WHERE {}", kind.table(), owned_clause(kind)),
        [id, session.user_id],
    )?;
    if deleted == 0 {
        return Err(WalletError::not_found(kind.label(), id));
    }
    tracing::info!(user_id = session.user_id, %kind, id, "record deleted");
    Ok(())
}
