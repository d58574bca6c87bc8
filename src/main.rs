mod categories;
mod cleanup;
mod cli;
mod db;
mod error;
mod fmt;
mod logging;
mod models;
mod records;
mod session;
mod settings;
mod store;
mod users;
mod validate;

use clap::Parser;

use cli::{
    CategoriesCommands, Cli, Commands, ExpenseCommands, IncomeCommands, ItemsCommands,
    UsersCommands,
};
use records::RecordKind;

fn main() {
    let cli = Cli::parse();
    // Commands reload settings and warn about a broken file once tracing is up.
    let log_filter = settings::try_load_settings()
        .map(|s| s.log_filter)
        .unwrap_or_else(|_| settings::Settings::default().log_filter);
    logging::init_tracing(&log_filter);

    let user = cli.user;
    let result = match cli.command {
        None | Some(Commands::Status) => cli::status::run(),
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Users { command }) => match command {
            UsersCommands::Add {
                name,
                national_id,
                kind,
                limit,
                cutoff_day,
            } => cli::users::add(&name, &national_id, &kind, limit, cutoff_day),
            UsersCommands::List { search } => cli::users::list(search.as_deref()),
            UsersCommands::Update {
                id,
                name,
                national_id,
                kind,
                limit,
                cutoff_day,
            } => cli::users::update(id, &name, &national_id, &kind, limit, cutoff_day),
            UsersCommands::Activate { id } => cli::users::set_active(id, true),
            UsersCommands::Deactivate { id } => cli::users::set_active(id, false),
            UsersCommands::Delete { id, yes } => cli::users::delete(id, yes),
        },
        Some(Commands::Categories { command }) => match command {
            CategoriesCommands::Add { description, kind } => {
                cli::categories::add(user, &kind, &description)
            }
            CategoriesCommands::List { kind, search } => {
                cli::categories::list(user, &kind, search.as_deref())
            }
            CategoriesCommands::Update {
                id,
                kind,
                description,
                inactive,
            } => cli::categories::update(user, &kind, id, &description, inactive),
            CategoriesCommands::Delete { id, kind } => cli::categories::delete(user, &kind, id),
        },
        Some(Commands::Items { command }) => match command {
            ItemsCommands::Add { description } => cli::items::add(&description),
            ItemsCommands::List { search } => cli::items::list(search.as_deref()),
            ItemsCommands::Update {
                id,
                description,
                inactive,
            } => cli::items::update(id, &description, inactive),
            ItemsCommands::Delete { id } => cli::items::delete(id),
        },
        Some(Commands::Income { command }) => match command {
            IncomeCommands::Add {
                amount,
                category,
                description,
                date,
            } => cli::records::add_income(user, &amount, category, &description, date),
            IncomeCommands::List(args) => cli::records::list(user, RecordKind::Income, &args),
            IncomeCommands::Activate { id } => {
                cli::records::set_active(user, RecordKind::Income, id, true)
            }
            IncomeCommands::Deactivate { id } => {
                cli::records::set_active(user, RecordKind::Income, id, false)
            }
            IncomeCommands::Delete { id } => cli::records::delete(user, RecordKind::Income, id),
        },
        Some(Commands::Expenses { command }) => match command {
            ExpenseCommands::Add {
                amount,
                category,
                description,
                item,
                payment,
                date,
            } => cli::records::add_expense(user, &amount, category, &description, item, payment, date),
            ExpenseCommands::List(args) => cli::records::list(user, RecordKind::Expense, &args),
            ExpenseCommands::Activate { id } => {
                cli::records::set_active(user, RecordKind::Expense, id, true)
            }
            ExpenseCommands::Deactivate { id } => {
                cli::records::set_active(user, RecordKind::Expense, id, false)
            }
            ExpenseCommands::Delete { id } => cli::records::delete(user, RecordKind::Expense, id),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
