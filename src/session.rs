use rusqlite::Connection;

use crate::error::{Result, WalletError};

/// The user on whose behalf per-user data is read and written.
///
/// Built once from the command line and passed down explicitly; nothing in
/// the data layer looks up a "current user" on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub user_name: String,
}

impl Session {
    /// Opens a session for an existing, active user.
    pub fn open(conn: &Connection, user_id: i64) -> Result<Self> {
        let (user_name, is_active): (String, bool) = conn
            .query_row(
                "SELECT name, is_active FROM users WHERE id = ?1",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => WalletError::UnknownUser(user_id),
                other => WalletError::Db(other),
            })?;
        if !is_active {
            return Err(WalletError::Validation(format!(
                "User {user_id} ({user_name}) is inactive"
            )));
        }
        tracing::debug!(user_id, "session opened");
        Ok(Self { user_id, user_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_conn() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_open_existing_user() {
        let (_dir, conn) = test_conn();
        conn.execute(
            "INSERT INTO users (name, national_id) VALUES ('Ana', '00100000009')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        let session = Session::open(&conn, id).unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.user_name, "Ana");
    }

    #[test]
    fn test_open_unknown_user() {
        let (_dir, conn) = test_conn();
        let err = Session::open(&conn, 77).unwrap_err();
        assert!(matches!(err, WalletError::UnknownUser(77)));
    }

    #[test]
    fn test_open_inactive_user() {
        let (_dir, conn) = test_conn();
        conn.execute(
            "INSERT INTO users (name, national_id, is_active) VALUES ('Old', '00100000009', 0)",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        let err = Session::open(&conn, id).unwrap_err();
        assert!(err.to_string().contains("inactive"));
    }
}
