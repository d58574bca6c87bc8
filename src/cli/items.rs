use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categories;
use crate::cli::open_db;
use crate::error::Result;

pub fn add(description: &str) -> Result<()> {
    let conn = open_db()?;
    let id = categories::add_item(&conn, description)?;
    println!("Added expense item {id}: {}", description.trim());
    Ok(())
}

pub fn list(search: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Description", "Active"]);
    for item in categories::list_items(&conn, search)? {
        let active = if item.is_active { "yes".green() } else { "no".dimmed() };
        table.add_row(vec![Cell::new(item.id), Cell::new(item.description), Cell::new(active)]);
    }
    println!("Expense items\n{table}");
    Ok(())
}

pub fn update(id: i64, description: &str, inactive: bool) -> Result<()> {
    let conn = open_db()?;
    categories::update_item(&conn, id, description, !inactive)?;
    println!("Updated expense item {id}: {}", description.trim());
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    categories::delete_item(&conn, id)?;
    println!("Deleted expense item {id}");
    Ok(())
}
