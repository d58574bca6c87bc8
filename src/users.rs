use rusqlite::{Connection, OptionalExtension};

use crate::cleanup::{self, CleanupReport};
use crate::error::{Result, WalletError};
use crate::models::{text_matches, NewUser, User};
use crate::store::SqliteStore;
use crate::validate;

/// Rows owned (directly or through a category) by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUsage {
    pub income_categories: i64,
    pub expense_categories: i64,
    pub payment_types: i64,
    pub income_records: i64,
    pub expense_records: i64,
}

impl UserUsage {
    pub fn is_empty(&self) -> bool {
        *self == UserUsage::default()
    }
}

fn validated(new: &NewUser) -> Result<NewUser> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(WalletError::Validation("Name is required".into()));
    }
    Ok(NewUser {
        name: name.to_string(),
        national_id: validate::national_id(new.person_kind, &new.national_id)?,
        person_kind: new.person_kind,
        expense_limit: validate::expense_limit(new.expense_limit)?,
        cutoff_day: validate::cutoff_day(new.cutoff_day)?,
    })
}

fn ensure_national_id_free(conn: &Connection, national_id: &str, except: Option<i64>) -> Result<()> {
    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM users WHERE national_id = ?1 AND (?2 IS NULL OR id != ?2)",
            rusqlite::params![national_id, except],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = taken {
        return Err(WalletError::Validation(format!(
            "National ID {national_id} is already registered to user {id}"
        )));
    }
    Ok(())
}

pub fn add_user(conn: &Connection, new: &NewUser) -> Result<i64> {
    let user = validated(new)?;
    ensure_national_id_free(conn, &user.national_id, None)?;
    conn.execute(
        "INSERT INTO users (name, national_id, person_kind, expense_limit, cutoff_day) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            user.name,
            user.national_id,
            user.person_kind,
            user.expense_limit,
            user.cutoff_day
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, "user added");
    Ok(id)
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        national_id: row.get(2)?,
        person_kind: row.get(3)?,
        expense_limit: row.get(4)?,
        cutoff_day: row.get(5)?,
        is_active: row.get(6)?,
    })
}

const USER_COLUMNS: &str = "id, name, national_id, person_kind, expense_limit, cutoff_day, is_active";

pub fn list_users(conn: &Connection, search: Option<&str>) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
    let users = stmt
        .query_map([], map_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let needle = search.unwrap_or_default();
    Ok(users
        .into_iter()
        .filter(|u| text_matches(&u.name, needle) || text_matches(&u.national_id, needle))
        .collect())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        map_user,
    )
    .map_err(|e| WalletError::or_not_found(e, "User", id))
}

pub fn update_user(conn: &Connection, id: i64, new: &NewUser) -> Result<()> {
    let user = validated(new)?;
    ensure_national_id_free(conn, &user.national_id, Some(id))?;
    let updated = conn.execute(
        "UPDATE users SET name = ?1, national_id = ?2, person_kind = ?3, expense_limit = ?4, \
         cutoff_day = ?5 WHERE id = ?6",
        rusqlite::params![
            user.name,
            user.national_id,
            user.person_kind,
            user.expense_limit,
            user.cutoff_day,
            id
        ],
    )?;
    if updated == 0 {
        return Err(WalletError::not_found("User", id));
    }
    Ok(())
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users SET is_active = ?1 WHERE id = ?2",
        rusqlite::params![active, id],
    )?;
    if updated == 0 {
        return Err(WalletError::not_found("User", id));
    }
    Ok(())
}

pub fn usage(conn: &Connection, id: i64) -> Result<UserUsage> {
    let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [id], |row| row.get(0))?) };
    Ok(UserUsage {
        income_categories: count("SELECT COUNT(*) FROM income_categories WHERE user_id = ?1")?,
        expense_categories: count("SELECT COUNT(*) FROM expense_categories WHERE user_id = ?1")?,
        payment_types: count("SELECT COUNT(*) FROM payment_types WHERE user_id = ?1")?,
        income_records: count(
            "SELECT COUNT(*) FROM income_records r JOIN income_categories c ON r.category_id = c.id \
             WHERE c.user_id = ?1",
        )?,
        expense_records: count(
            "SELECT COUNT(*) FROM expense_records r JOIN expense_categories c ON r.category_id = c.id \
             WHERE c.user_id = ?1",
        )?,
    })
}

/// Removes a user and everything that depends on it in one transaction.
/// Nothing is committed unless every cleanup step succeeds.
pub fn delete_user(conn: &mut Connection, id: i64) -> Result<CleanupReport> {
    let tx = conn.transaction()?;
    let report = cleanup::delete_user_and_dependents(&SqliteStore::new(&tx), id)?;
    tx.commit()?;
    Ok(report)
}
