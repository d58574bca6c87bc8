use std::io::Write;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{Result, WalletError};
use crate::fmt::money;
use crate::models::NewUser;
use crate::users;

fn new_user(name: &str, national_id: &str, kind: &str, limit: f64, cutoff_day: u32) -> Result<NewUser> {
    Ok(NewUser {
        name: name.to_string(),
        national_id: national_id.to_string(),
        person_kind: kind.parse()?,
        expense_limit: limit,
        cutoff_day,
    })
}

pub fn add(name: &str, national_id: &str, kind: &str, limit: f64, cutoff_day: u32) -> Result<()> {
    let conn = open_db()?;
    let id = users::add_user(&conn, &new_user(name, national_id, kind, limit, cutoff_day)?)?;
    println!("Added user {id}: {}", name.trim());
    Ok(())
}

pub fn list(search: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let rows = users::list_users(&conn, search)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "National ID", "Kind", "Limit", "Cut-off", "Active"]);
    for u in rows {
        let active = if u.is_active { "yes".green() } else { "no".dimmed() };
        table.add_row(vec![
            Cell::new(u.id),
            Cell::new(u.name),
            Cell::new(u.national_id),
            Cell::new(u.person_kind),
            Cell::new(money(u.expense_limit)),
            Cell::new(u.cutoff_day),
            Cell::new(active),
        ]);
    }
    println!("Users\n{table}");
    Ok(())
}

pub fn update(id: i64, name: &str, national_id: &str, kind: &str, limit: f64, cutoff_day: u32) -> Result<()> {
    let conn = open_db()?;
    users::update_user(&conn, id, &new_user(name, national_id, kind, limit, cutoff_day)?)?;
    println!("Updated user {id}");
    Ok(())
}

pub fn set_active(id: i64, active: bool) -> Result<()> {
    let conn = open_db()?;
    users::set_active(&conn, id, active)?;
    println!("User {id} {}", if active { "activated" } else { "deactivated" });
    Ok(())
}

// Shows what a delete will take with it and waits for the operator to agree.
fn confirm_delete(conn: &rusqlite::Connection, id: i64) -> Result<bool> {
    let user = match users::get_user(conn, id) {
        Ok(user) => user,
        // Nothing to confirm; the delete itself reports the absence.
        Err(WalletError::NotFound { .. }) => return Ok(true),
        Err(e) => return Err(e),
    };
    let usage = users::usage(conn, id)?;

    println!("Delete user {id} ({}, {})?", user.name, user.national_id);
    if !usage.is_empty() {
        println!("This also removes:");
        println!("  {} income categories", usage.income_categories);
        println!("  {} expense categories", usage.expense_categories);
        println!("  {} payment types", usage.payment_types);
        println!("  {} income records", usage.income_records);
        println!("  {} expense records", usage.expense_records);
    }
    print!("Type 'yes' to confirm: ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn delete(id: i64, yes: bool) -> Result<()> {
    let mut conn = open_db()?;
    if !yes && !confirm_delete(&conn, id)? {
        println!("Cancelled.");
        return Ok(());
    }

    match users::delete_user(&mut conn, id) {
        Ok(report) if report.user_removed => {
            println!(
                "{} user {id} and {} dependent rows",
                "Deleted".green().bold(),
                report.total_rows() - 1
            );
            Ok(())
        }
        Ok(_) => {
            println!("User {id} already absent; nothing to delete");
            Ok(())
        }
        Err(e) => {
            tracing::error!(user_id = id, error = %e, "user deletion rolled back");
            Err(WalletError::Other("unexpected error deleting the user".into()))
        }
    }
}
