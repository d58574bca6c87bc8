use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categories::{self, CategoryKind};
use crate::cli::{open_db, open_session};
use crate::error::Result;

pub fn add(user: Option<i64>, kind: &str, description: &str) -> Result<()> {
    let kind: CategoryKind = kind.parse()?;
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    let id = categories::add_category(&conn, &session, kind, description)?;
    println!("Added {} {id}: {}", kind.label().to_lowercase(), description.trim());
    Ok(())
}

pub fn list(user: Option<i64>, kind: &str, search: Option<&str>) -> Result<()> {
    let kind: CategoryKind = kind.parse()?;
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    let rows = categories::list_categories(&conn, &session, kind, search)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Description", "Records", "Active"]);
    for cat in rows {
        let used = categories::usage_count(&conn, kind, cat.id)?;
        let active = if cat.is_active { "yes".green() } else { "no".dimmed() };
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(cat.description),
            Cell::new(used),
            Cell::new(active),
        ]);
    }
    println!("{} for {}\n{table}", kind.label(), session.user_name);
    Ok(())
}

pub fn update(user: Option<i64>, kind: &str, id: i64, description: &str, inactive: bool) -> Result<()> {
    let kind: CategoryKind = kind.parse()?;
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    categories::update_category(&conn, &session, kind, id, description, !inactive)?;
    println!("Updated {} {id}: {}", kind.label().to_lowercase(), description.trim());
    Ok(())
}

pub fn delete(user: Option<i64>, kind: &str, id: i64) -> Result<()> {
    let kind: CategoryKind = kind.parse()?;
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    categories::delete_category(&conn, &session, kind, id)?;
    println!("Deleted {} {id}", kind.label().to_lowercase());
    Ok(())
}
