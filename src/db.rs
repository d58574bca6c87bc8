use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "walletmate.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    national_id TEXT NOT NULL,
    person_kind TEXT NOT NULL DEFAULT 'individual',
    expense_limit REAL NOT NULL DEFAULT 0,
    cutoff_day INTEGER NOT NULL DEFAULT 1,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS income_categories (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS expense_categories (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS payment_types (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS expense_items (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS income_records (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES income_categories(id)
);

CREATE TABLE IF NOT EXISTS expense_records (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    item_id INTEGER,
    payment_type_id INTEGER,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES expense_categories(id),
    FOREIGN KEY (item_id) REFERENCES expense_items(id),
    FOREIGN KEY (payment_type_id) REFERENCES payment_types(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_income_categories_user ON income_categories(user_id);
CREATE INDEX IF NOT EXISTS idx_expense_categories_user ON expense_categories(user_id);
CREATE INDEX IF NOT EXISTS idx_payment_types_user ON payment_types(user_id);
CREATE INDEX IF NOT EXISTS idx_income_records_category ON income_records(category_id);
CREATE INDEX IF NOT EXISTS idx_expense_records_category ON expense_records(category_id);
";

// Global line items offered on a fresh database.
const DEFAULT_ITEMS: &[&str] = &[
    "Comida",
    "Combustible",
    "Recreación",
    "Servicios",
    "Salud",
    "Otros",
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM expense_items", [], |row| row.get(0))?;
    if count == 0 {
        for item in DEFAULT_ITEMS {
            conn.execute("INSERT INTO expense_items (description) VALUES (?1)", [item])?;
        }
        tracing::debug!(count = DEFAULT_ITEMS.len(), "seeded expense items");
    }
    Ok(())
}
