pub mod categories;
pub mod init;
pub mod items;
pub mod records;
pub mod status;
pub mod users;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{Result, WalletError};
use crate::session::Session;
use crate::settings::get_db_path;

/// Opens the configured database, refusing to create an empty one.
pub(crate) fn open_db() -> Result<Connection> {
    let db_path = get_db_path();
    if !db_path.exists() {
        return Err(WalletError::Settings(format!(
            "No database found at {}\nRun `walletmate init` to set up.",
            db_path.display()
        )));
    }
    get_connection(&db_path)
}

pub(crate) fn open_session(conn: &Connection, user: Option<i64>) -> Result<Session> {
    let user_id = user.ok_or_else(|| {
        WalletError::Validation("This command needs a user: pass --user <ID>".into())
    })?;
    Session::open(conn, user_id)
}

#[derive(Parser)]
#[command(
    name = "walletmate",
    version,
    about = "Income and expense tracking for individuals and small companies."
)]
pub struct Cli {
    /// User to act on behalf of (required by per-user commands)
    #[arg(long, global = true)]
    pub user: Option<i64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for WalletMate data (default: ~/Documents/walletmate)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show the current database and row counts.
    Status,
    /// Manage users.
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Manage the user's income categories, expense categories and payment types.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage the shared expense items.
    Items {
        #[command(subcommand)]
        command: ItemsCommands,
    },
    /// Manage the user's income records.
    Income {
        #[command(subcommand)]
        command: IncomeCommands,
    },
    /// Manage the user's expense records.
    Expenses {
        #[command(subcommand)]
        command: ExpenseCommands,
    },
}

#[derive(Subcommand)]
pub enum UsersCommands {
    /// Register a new user.
    Add {
        /// Full name or company name
        name: String,
        /// Cédula (individual) or RNC (company), dashes optional
        #[arg(long = "national-id")]
        national_id: String,
        /// Person kind: individual or company
        #[arg(long, default_value = "individual")]
        kind: String,
        /// Monthly expense limit
        #[arg(long, default_value_t = 0.0)]
        limit: f64,
        /// Day of the month the budget period closes
        #[arg(long = "cutoff-day", default_value_t = 1)]
        cutoff_day: u32,
    },
    /// List users.
    List {
        /// Filter by name or national ID
        #[arg(long)]
        search: Option<String>,
    },
    /// Replace a user's details.
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "national-id")]
        national_id: String,
        #[arg(long, default_value = "individual")]
        kind: String,
        #[arg(long, default_value_t = 0.0)]
        limit: f64,
        #[arg(long = "cutoff-day", default_value_t = 1)]
        cutoff_day: u32,
    },
    /// Mark a user active.
    Activate { id: i64 },
    /// Mark a user inactive.
    Deactivate { id: i64 },
    /// Delete a user together with its categories, payment types and records.
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category or payment type.
    Add {
        description: String,
        /// income, expense or payment
        #[arg(long)]
        kind: String,
    },
    /// List categories of one kind.
    List {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        search: Option<String>,
    },
    /// Rename a category and set its active flag.
    Update {
        id: i64,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        description: String,
        /// Mark the row inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a category that has no records.
    Delete {
        id: i64,
        #[arg(long)]
        kind: String,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommands {
    /// Add an expense item.
    Add { description: String },
    /// List expense items.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Rename an item and set its active flag.
    Update {
        id: i64,
        #[arg(long)]
        description: String,
        #[arg(long)]
        inactive: bool,
    },
    /// Delete an item no expense uses.
    Delete { id: i64 },
}

/// Filters shared by `income list` and `expenses list`.
#[derive(clap::Args)]
pub struct ListArgs {
    /// Text to look for in the description
    #[arg(long)]
    pub search: Option<String>,
    /// Only records in this category
    #[arg(long)]
    pub category: Option<i64>,
    /// Only active records
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,
    /// Only inactive records
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record income.
    Add {
        /// Amount, e.g. 2,500.00
        amount: String,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        description: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List income records, newest first.
    List(ListArgs),
    Activate { id: i64 },
    Deactivate { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense.
    Add {
        amount: String,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        description: String,
        /// Expense item id
        #[arg(long)]
        item: Option<i64>,
        /// Payment type id
        #[arg(long)]
        payment: Option<i64>,
        #[arg(long)]
        date: Option<String>,
    },
    /// List expense records, newest first.
    List(ListArgs),
    Activate { id: i64 },
    Deactivate { id: i64 },
    Delete { id: i64 },
}
