use std::fmt;
use std::str::FromStr;

use rusqlite::Connection;

use crate::error::{Result, WalletError};
use crate::models::{text_matches, Category, ExpenseItem};
use crate::session::Session;
use crate::store::Table;
use crate::validate;

/// The three per-user lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
    Payment,
}

impl CategoryKind {
    pub fn table(&self) -> Table {
        match self {
            CategoryKind::Income => Table::IncomeCategories,
            CategoryKind::Expense => Table::ExpenseCategories,
            CategoryKind::Payment => Table::PaymentTypes,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Income => "Income category",
            CategoryKind::Expense => "Expense category",
            CategoryKind::Payment => "Payment type",
        }
    }

    // Records pointing at a row of this kind, and the column they use.
    fn referencing(&self) -> (Table, &'static str) {
        match self {
            CategoryKind::Income => (Table::IncomeRecords, "category_id"),
            CategoryKind::Expense => (Table::ExpenseRecords, "category_id"),
            CategoryKind::Payment => (Table::ExpenseRecords, "payment_type_id"),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Payment => "payment",
        })
    }
}

impl FromStr for CategoryKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            "payment" => Ok(CategoryKind::Payment),
            other => Err(WalletError::Validation(format!(
                "Invalid category kind: {other} (must be 'income', 'expense' or 'payment')"
            ))),
        }
    }
}

pub fn list_categories(
    conn: &Connection,
    session: &Session,
    kind: CategoryKind,
    search: Option<&str>,
) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, user_id, description, is_active FROM {} WHERE user_id = ?1 \
         ORDER BY is_active DESC, description ASC",
        kind.table()
    ))?;
    let rows = stmt
        .query_map([session.user_id], |row| {
            Ok(Category {
                id: row.get(0)?,
                user_id: row.get(1)?,
                description: row.get(2)?,
                is_active: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let needle = search.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter(|c| text_matches(&c.description, needle))
        .collect())
}

/// Fetches a row of `kind` owned by the session user.
pub fn get_category(conn: &Connection, session: &Session, kind: CategoryKind, id: i64) -> Result<Category> {
    conn.query_row(
        &format!(
            "SELECT id, user_id, description, is_active FROM {} WHERE id = ?1 AND user_id = ?2",
            kind.table()
        ),
        [id, session.user_id],
        |row| {
            Ok(Category {
                id: row.get(0)?,
                user_id: row.get(1)?,
                description: row.get(2)?,
                is_active: row.get(3)?,
            })
        },
    )
    .map_err(|e| WalletError::or_not_found(e, kind.label(), id))
}

fn ensure_unique(
    conn: &Connection,
    session: &Session,
    kind: CategoryKind,
    description: &str,
    except: Option<i64>,
) -> Result<()> {
    let exists: bool = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = ?1 AND description = ?2 \
             AND is_active = 1 AND (?3 IS NULL OR id != ?3))",
            kind.table()
        ),
        rusqlite::params![session.user_id, description, except],
        |row| row.get(0),
    )?;
    if exists {
        return Err(WalletError::Validation(format!(
            "{} already exists: {description}",
            kind.label()
        )));
    }
    Ok(())
}

pub fn add_category(conn: &Connection, session: &Session, kind: CategoryKind, description: &str) -> Result<i64> {
    let description = validate::description(description)?;
    ensure_unique(conn, session, kind, &description, None)?;
    conn.execute(
        &format!("INSERT INTO {} (user_id, description) VALUES (?1, ?2)", kind.table()),
        rusqlite::params![session.user_id, description],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = session.user_id, %kind, id, "category added");
    Ok(id)
}

pub fn update_category(
    conn: &Connection,
    session: &Session,
    kind: CategoryKind,
    id: i64,
    description: &str,
    is_active: bool,
) -> Result<()> {
    let description = validate::description(description)?;
    ensure_unique(conn, session, kind, &description, Some(id))?;
    let updated = conn.execute(
        &format!(
            "UPDATE {} SET description = ?1, is_active = ?2 WHERE id = ?3 AND user_id = ?4",
            kind.table()
        ),
        rusqlite::params![description, is_active, id, session.user_id],
    )?;
    if updated == 0 {
        return Err(WalletError::not_found(kind.label(), id));
    }
    Ok(())
}

/// Number of records that reference the row.
pub fn usage_count(conn: &Connection, kind: CategoryKind, id: i64) -> Result<i64> {
    let (table, column) = kind.referencing();
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
        [id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Returns a human-readable reason why a row cannot be deleted, or None if
/// deletion is safe. Payment types never block: their references are cleared.
pub fn blocking_reason(conn: &Connection, kind: CategoryKind, id: i64) -> Result<Option<String>> {
    if kind == CategoryKind::Payment {
        return Ok(None);
    }
    let count = usage_count(conn, kind, id)?;
    if count > 0 {
        let noun = if count == 1 { "record" } else { "records" };
        return Ok(Some(format!(
            "{} {id} has {count} {noun}",
            kind.label().to_lowercase()
        )));
    }
    Ok(None)
}

pub fn delete_category(conn: &Connection, session: &Session, kind: CategoryKind, id: i64) -> Result<()> {
    get_category(conn, session, kind, id)?;
    if let Some(reason) = blocking_reason(conn, kind, id)? {
        return Err(WalletError::Blocked(reason));
    }
    conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", kind.table()),
        [id, session.user_id],
    )?;
    tracing::info!(user_id = session.user_id, %kind, id, "category deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Expense items (global)
// ---------------------------------------------------------------------------

pub fn list_items(conn: &Connection, search: Option<&str>) -> Result<Vec<ExpenseItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, description, is_active FROM expense_items ORDER BY is_active DESC, description ASC",
    )?;
    let items = stmt
        .query_map([], |row| {
            Ok(ExpenseItem {
                id: row.get(0)?,
                description: row.get(1)?,
                is_active: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let needle = search.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter(|i| text_matches(&i.description, needle))
        .collect())
}

pub fn get_item(conn: &Connection, id: i64) -> Result<ExpenseItem> {
    conn.query_row(
        "SELECT id, description, is_active FROM expense_items WHERE id = ?1",
        [id],
        |row| {
            Ok(ExpenseItem {
                id: row.get(0)?,
                description: row.get(1)?,
                is_active: row.get(2)?,
            })
        },
    )
    .map_err(|e| WalletError::or_not_found(e, "Expense item", id))
}

fn ensure_item_unique(conn: &Connection, description: &str, except: Option<i64>) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM expense_items WHERE description = ?1 AND is_active = 1 \
         AND (?2 IS NULL OR id != ?2))",
        rusqlite::params![description, except],
        |row| row.get(0),
    )?;
    if exists {
        return Err(WalletError::Validation(format!(
            "Expense item already exists: {description}"
        )));
    }
    Ok(())
}

pub fn add_item(conn: &Connection, description: &str) -> Result<i64> {
    let description = validate::item_description(description)?;
    ensure_item_unique(conn, &description, None)?;
    conn.execute(
        "INSERT INTO expense_items (description) VALUES (?1)",
        [&description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_item(conn: &Connection, id: i64, description: &str, active: bool) -> Result<()> {
    let description = validate::item_description(description)?;
    ensure_item_unique(conn, &description, Some(id))?;
    let updated = conn.execute(
        "UPDATE expense_items SET description = ?1, is_active = ?2 WHERE id = ?3",
        rusqlite::params![description, active, id],
    )?;
    if updated == 0 {
        return Err(WalletError::not_found("Expense item", id));
    }
    Ok(())
}

pub fn delete_item(conn: &Connection, id: i64) -> Result<()> {
    get_item(conn, id)?;
    let used: i64 = conn.query_row(
        "SELECT COUNT(*) FROM expense_records WHERE item_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    if used > 0 {
        let noun = if used == 1 { "record" } else { "records" };
        return Err(WalletError::Blocked(format!(
            "expense item {id} has {used} {noun}"
        )));
    }
    conn.execute("DELETE FROM expense_items WHERE id = ?1", [id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::{NewExpense, NewUser, PersonKind};
    use crate::records::add_expense;
    use crate::users::add_user;

    fn test_conn() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn session_for(conn: &Connection, name: &str, national_id: &str) -> Session {
        let id = add_user(
            conn,
            &NewUser {
                name: name.to_string(),
                national_id: national_id.to_string(),
                person_kind: PersonKind::Individual,
                expense_limit: 0.0,
                cutoff_day: 1,
            },
        )
        .unwrap();
        Session::open(conn, id).unwrap()
    }

    fn expense(category_id: i64, item_id: Option<i64>, payment_type_id: Option<i64>) -> NewExpense {
        NewExpense {
            category_id,
            item_id,
            payment_type_id,
            description: "Test".into(),
            amount: 10.0,
            date: Some("2025-01-05".into()),
        }
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("payment".parse::<CategoryKind>().unwrap(), CategoryKind::Payment);
        assert!("pay".parse::<CategoryKind>().is_err());
        assert_eq!(CategoryKind::Expense.to_string(), "expense");
    }

    #[test]
    fn test_add_and_list_only_own_rows() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let juan = session_for(&conn, "Juan", "40220000000");
        add_category(&conn, &ana, CategoryKind::Income, "Salario Base").unwrap();
        add_category(&conn, &ana, CategoryKind::Income, "Comisiones").unwrap();
        add_category(&conn, &juan, CategoryKind::Income, "Freelance").unwrap();

        let mine = list_categories(&conn, &ana, CategoryKind::Income, None).unwrap();
        let names: Vec<&str> = mine.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(names, vec!["Comisiones", "Salario Base"]);
        assert!(mine.iter().all(|c| c.user_id == ana.user_id));

        let filtered = list_categories(&conn, &ana, CategoryKind::Income, Some("salario")).unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_duplicate_description_rejected_per_user() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let juan = session_for(&conn, "Juan", "40220000000");
        add_category(&conn, &ana, CategoryKind::Expense, "Food").unwrap();
        let err = add_category(&conn, &ana, CategoryKind::Expense, "Food").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        // Another user may reuse the name
        add_category(&conn, &juan, CategoryKind::Expense, "Food").unwrap();
        // The same name under another kind is fine
        add_category(&conn, &ana, CategoryKind::Income, "Food").unwrap();
    }

    #[test]
    fn test_empty_description_rejected() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let err = add_category(&conn, &ana, CategoryKind::Payment, "   ").unwrap_err();
        assert!(err.to_string().contains("Description is required"));
    }

    #[test]
    fn test_update_and_deactivate() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let id = add_category(&conn, &ana, CategoryKind::Payment, "Cash").unwrap();
        update_category(&conn, &ana, CategoryKind::Payment, id, "Efectivo", false).unwrap();
        let cat = get_category(&conn, &ana, CategoryKind::Payment, id).unwrap();
        assert_eq!(cat.description, "Efectivo");
        assert!(!cat.is_active);
    }

    #[test]
    fn test_cannot_touch_other_users_rows() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let juan = session_for(&conn, "Juan", "40220000000");
        let id = add_category(&conn, &ana, CategoryKind::Expense, "Food").unwrap();

        let err = update_category(&conn, &juan, CategoryKind::Expense, id, "Mine", true).unwrap_err();
        assert!(err.to_string().contains("not found"));
        let err = delete_category(&conn, &juan, CategoryKind::Expense, id).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert!(get_category(&conn, &ana, CategoryKind::Expense, id).is_ok());
    }

    #[test]
    fn test_delete_unused_category() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let id = add_category(&conn, &ana, CategoryKind::Income, "Bonus").unwrap();
        delete_category(&conn, &ana, CategoryKind::Income, id).unwrap();
        assert!(list_categories(&conn, &ana, CategoryKind::Income, None).unwrap().is_empty());
    }

    #[test]
    fn test_delete_category_with_records_blocked() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let food = add_category(&conn, &ana, CategoryKind::Expense, "Food").unwrap();
        add_expense(&conn, &ana, &expense(food, None, None)).unwrap();

        let err = delete_category(&conn, &ana, CategoryKind::Expense, food).unwrap_err();
        assert!(err.to_string().contains("Cannot delete"));
        assert!(err.to_string().contains("1 record"));
    }

    #[test]
    fn test_delete_payment_type_clears_references() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let food = add_category(&conn, &ana, CategoryKind::Expense, "Food").unwrap();
        let card = add_category(&conn, &ana, CategoryKind::Payment, "Card").unwrap();
        let record = add_expense(&conn, &ana, &expense(food, None, Some(card))).unwrap();
        assert_eq!(usage_count(&conn, CategoryKind::Payment, card).unwrap(), 1);

        delete_category(&conn, &ana, CategoryKind::Payment, card).unwrap();

        let payment: Option<i64> = conn
            .query_row(
                "SELECT payment_type_id FROM expense_records WHERE id = ?1",
                [record],
                |r| r.get(0),
            )
            .unwrap();
        assert!(payment.is_none());
    }

    #[test]
    fn test_items_seeded_and_validated() {
        let (_dir, conn) = test_conn();
        let items = list_items(&conn, None).unwrap();
        assert!(items.iter().any(|i| i.description == "Combustible"));

        let err = add_item(&conn, "Gasolina 95").unwrap_err();
        assert!(err.to_string().contains("digits"));
        let err = add_item(&conn, "Comida").unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let id = add_item(&conn, "Educación").unwrap();
        update_item(&conn, id, "Educacion", false).unwrap();
        let item = get_item(&conn, id).unwrap();
        assert_eq!(item.description, "Educacion");
        assert!(!item.is_active);
    }

    #[test]
    fn test_delete_item_in_use_blocked() {
        let (_dir, conn) = test_conn();
        let ana = session_for(&conn, "Ana", "00100000009");
        let food = add_category(&conn, &ana, CategoryKind::Expense, "Food").unwrap();
        let item = add_item(&conn, "Mercado").unwrap();
        add_expense(&conn, &ana, &expense(food, Some(item), None)).unwrap();

        let err = delete_item(&conn, item).unwrap_err();
        assert!(err.to_string().contains("Cannot delete"));

        let spare = add_item(&conn, "Regalos").unwrap();
        delete_item(&conn, spare).unwrap();
        assert!(get_item(&conn, spare).is_err());
    }
}
