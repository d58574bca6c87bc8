use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{get_db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = get_db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Log filter: {}", settings.log_filter);

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `walletmate init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&db_path)?;
    let count = |table: &str| -> Result<i64> {
        Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
    };
    let active_users: i64 =
        conn.query_row("SELECT count(*) FROM users WHERE is_active = 1", [], |r| r.get(0))?;

    println!();
    println!("Users:              {} ({active_users} active)", count("users")?);
    println!("Income categories:  {}", count("income_categories")?);
    println!("Expense categories: {}", count("expense_categories")?);
    println!("Payment types:      {}", count("payment_types")?);
    println!("Expense items:      {}", count("expense_items")?);
    println!("Income records:     {}", count("income_records")?);
    println!("Expense records:    {}", count("expense_records")?);
    Ok(())
}
