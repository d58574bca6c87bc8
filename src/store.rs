//! Minimal select/delete capability over the WalletMate tables.
//!
//! The cleanup workflow is written against [`Store`] so it can run on a plain
//! connection, inside a transaction, or against a recording double in tests.

use std::fmt;

use rusqlite::Connection;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    IncomeCategories,
    ExpenseCategories,
    PaymentTypes,
    IncomeRecords,
    ExpenseRecords,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::IncomeCategories => "income_categories",
            Table::ExpenseCategories => "expense_categories",
            Table::PaymentTypes => "payment_types",
            Table::IncomeRecords => "income_records",
            Table::ExpenseRecords => "expense_records",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    UserId,
    CategoryId,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::UserId => "user_id",
            Column::CategoryId => "category_id",
        }
    }
}

// SQLite refuses statements binding more than 32766 parameters.
const MAX_BOUND_IDS: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(Column, i64),
    /// Set membership. An empty set matches no rows.
    In(Column, Vec<i64>),
}

impl Filter {
    fn is_empty_set(&self) -> bool {
        matches!(self, Filter::In(_, ids) if ids.is_empty())
    }

    // Splits a large set into filters that each fit in one statement.
    fn batches(&self) -> Vec<Filter> {
        match self {
            Filter::In(col, ids) if ids.len() > MAX_BOUND_IDS => ids
                .chunks(MAX_BOUND_IDS)
                .map(|chunk| Filter::In(*col, chunk.to_vec()))
                .collect(),
            other => vec![other.clone()],
        }
    }

    // Returns the WHERE clause and its bound values.
    fn to_sql(&self) -> (String, Vec<i64>) {
        match self {
            Filter::Eq(col, value) => (format!("{} = ?1", col.name()), vec![*value]),
            Filter::In(col, ids) => {
                let placeholders = (1..=ids.len())
                    .map(|i| format!("?{i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                (format!("{} IN ({placeholders})", col.name()), ids.clone())
            }
        }
    }
}

pub trait Store {
    /// Ids of every row in `table` matching `filter`.
    fn select_ids(&self, table: Table, filter: &Filter) -> Result<Vec<i64>>;

    /// Removes every row in `table` matching `filter`, returning how many went.
    fn delete(&self, table: Table, filter: &Filter) -> Result<usize>;
}

/// [`Store`] over a SQLite connection. Pass a `rusqlite::Transaction` to make
/// a sequence of calls atomic.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl Store for SqliteStore<'_> {
    fn select_ids(&self, table: Table, filter: &Filter) -> Result<Vec<i64>> {
        if filter.is_empty_set() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for batch in filter.batches() {
            let (clause, values) = batch.to_sql();
            let sql = format!("SELECT id FROM {table} WHERE {clause} ORDER BY id");
            let mut stmt = self.conn.prepare(&sql)?;
            for id in stmt.query_map(rusqlite::params_from_iter(values), |row| row.get(0))? {
                ids.push(id?);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn delete(&self, table: Table, filter: &Filter) -> Result<usize> {
        if filter.is_empty_set() {
            return Ok(0);
        }
        let mut removed = 0;
        for batch in filter.batches() {
            let (clause, values) = batch.to_sql();
            let sql = format!("DELETE FROM {table} WHERE {clause}");
            removed += self.conn.execute(&sql, rusqlite::params_from_iter(values))?;
        }
        Ok(removed)
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

    fn insert_user(conn: &Connection, name: &str) -> i64 {
        conn.execute(
            "INSERT INTO users (name, national_id) VALUES (?1, '00100000009')",
            [name],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn insert_payment_type(conn: &Connection, user_id: i64, desc: &str) -> i64 {
        conn.execute(
            "INSERT INTO payment_types (user_id, description) VALUES (?1, ?2)",
            rusqlite::params![user_id, desc],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_filter_sql() {
        let (clause, values) = Filter::Eq(Column::UserId, 7).to_sql();
        assert_eq!(clause, "user_id = ?1");
        assert_eq!(values, vec![7]);

        let (clause, values) = Filter::In(Column::CategoryId, vec![3, 4, 5]).to_sql();
        assert_eq!(clause, "category_id IN (?1, ?2, ?3)");
        assert_eq!(values, vec![3, 4, 5]);
    }

    #[test]
    fn test_select_ids_by_owner() {
        let (_dir, conn) = test_conn();
        let ana = insert_user(&conn, "Ana");
        let luis = insert_user(&conn, "Luis");
        let cash = insert_payment_type(&conn, ana, "Cash");
        let card = insert_payment_type(&conn, ana, "Card");
        insert_payment_type(&conn, luis, "Transfer");

        let store = SqliteStore::new(&conn);
        let ids = store
            .select_ids(Table::PaymentTypes, &Filter::Eq(Column::UserId, ana))
            .unwrap();
        assert_eq!(ids, vec![cash, card]);
    }

    #[test]
    fn test_delete_in_set() {
        let (_dir, conn) = test_conn();
        let ana = insert_user(&conn, "Ana");
        let a = insert_payment_type(&conn, ana, "A");
        let b = insert_payment_type(&conn, ana, "B");
        let c = insert_payment_type(&conn, ana, "C");

        let store = SqliteStore::new(&conn);
        let removed = store
            .delete(Table::PaymentTypes, &Filter::In(Column::Id, vec![a, c]))
            .unwrap();
        assert_eq!(removed, 2);
        let left = store
            .select_ids(Table::PaymentTypes, &Filter::Eq(Column::UserId, ana))
            .unwrap();
        assert_eq!(left, vec![b]);
    }

    #[test]
    fn test_empty_set_is_zero_work() {
        let (_dir, conn) = test_conn();
        let store = SqliteStore::new(&conn);
        let removed = store
            .delete(Table::ExpenseRecords, &Filter::In(Column::CategoryId, vec![]))
            .unwrap();
        assert_eq!(removed, 0);
        let ids = store
            .select_ids(Table::ExpenseRecords, &Filter::In(Column::CategoryId, vec![]))
            .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_in_set_larger_than_sqlite_parameter_limit() {
        let (_dir, conn) = test_conn();
        let ana = insert_user(&conn, "Ana");
        let a = insert_payment_type(&conn, ana, "A");
        let b = insert_payment_type(&conn, ana, "B");
        let mut ids: Vec<i64> = (1_000..41_000).collect();
        ids.extend([a, b]);

        let store = SqliteStore::new(&conn);
        let found = store
            .select_ids(Table::PaymentTypes, &Filter::In(Column::Id, ids.clone()))
            .unwrap();
        assert_eq!(found, vec![a, b]);
        let removed = store
            .delete(Table::PaymentTypes, &Filter::In(Column::Id, ids))
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_batches_split_large_sets_only() {
        let small = Filter::In(Column::Id, vec![1, 2]);
        assert_eq!(small.batches(), vec![small.clone()]);
        let large = Filter::In(Column::Id, (0..(MAX_BOUND_IDS as i64 * 2 + 1)).collect());
        let batches = large.batches();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|f| f.to_sql().1.len() <= MAX_BOUND_IDS));
    }

    #[test]
    fn test_delete_no_match_is_not_an_error() {
        let (_dir, conn) = test_conn();
        let store = SqliteStore::new(&conn);
        let removed = store.delete(Table::Users, &Filter::Eq(Column::Id, 4242)).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_store_over_transaction_rolls_back() {
        let (_dir, mut conn) = test_conn();
        let ana = insert_user(&conn, "Ana");
        insert_payment_type(&conn, ana, "Cash");
        {
            let tx = conn.transaction().unwrap();
            let store = SqliteStore::new(&tx);
            let removed = store
                .delete(Table::PaymentTypes, &Filter::Eq(Column::UserId, ana))
                .unwrap();
            assert_eq!(removed, 1);
            // dropped without commit
        }
        let count: i64 = conn
            .query_row("SELECT count(*) FROM payment_types", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
