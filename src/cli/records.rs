use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_db, open_session, ListArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{NewExpense, NewIncome};
use crate::records::{self, RecordFilter, RecordKind};
use crate::validate;

pub fn add_income(
    user: Option<i64>,
    amount: &str,
    category: i64,
    description: &str,
    date: Option<String>,
) -> Result<()> {
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    let new = NewIncome {
        category_id: category,
        description: description.to_string(),
        amount: validate::parse_amount(amount)?,
        date,
    };
    let id = records::add_income(&conn, &session, &new)?;
    println!("Recorded income {id}: {}", money(new.amount));
    Ok(())
}

pub fn add_expense(
    user: Option<i64>,
    amount: &str,
    category: i64,
    description: &str,
    item: Option<i64>,
    payment: Option<i64>,
    date: Option<String>,
) -> Result<()> {
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    let new = NewExpense {
        category_id: category,
        item_id: item,
        payment_type_id: payment,
        description: description.to_string(),
        amount: validate::parse_amount(amount)?,
        date,
    };
    let id = records::add_expense(&conn, &session, &new)?;
    println!("Recorded expense {id}: {}", money(new.amount));
    Ok(())
}

pub fn list(user: Option<i64>, kind: RecordKind, args: &ListArgs) -> Result<()> {
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    let filter = RecordFilter {
        text: args.search.clone(),
        category_id: args.category,
        active: match (args.active, args.inactive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
    };
    let rows = records::list_records(&conn, &session, kind, &filter)?;

    let mut table = Table::new();
    let mut header = vec!["ID", "Date", "Category"];
    if kind == RecordKind::Expense {
        header.extend(["Item", "Payment"]);
    }
    header.extend(["Description", "Amount", "Active"]);
    table.set_header(header);

    let mut total = 0.0;
    for r in &rows {
        if r.is_active {
            total += r.amount;
        }
        let mut cells = vec![Cell::new(r.id), Cell::new(&r.date), Cell::new(&r.category)];
        if kind == RecordKind::Expense {
            cells.push(Cell::new(r.item.as_deref().unwrap_or_default()));
            cells.push(Cell::new(r.payment_type.as_deref().unwrap_or_default()));
        }
        cells.push(Cell::new(&r.description));
        cells.push(Cell::new(money(r.amount)).set_alignment(CellAlignment::Right));
        cells.push(Cell::new(if r.is_active { "yes".green() } else { "no".dimmed() }));
        table.add_row(cells);
    }

    let title = match kind {
        RecordKind::Income => "Income",
        RecordKind::Expense => "Expenses",
    };
    println!("{title} for {}\n{table}", session.user_name);
    println!("{} {}", "Active total:".bold(), money(total));
    Ok(())
}

pub fn set_active(user: Option<i64>, kind: RecordKind, id: i64, active: bool) -> Result<()> {
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    records::set_record_active(&conn, &session, kind, id, active)?;
    println!(
        "{kind} record {id} {}",
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

pub fn delete(user: Option<i64>, kind: RecordKind, id: i64) -> Result<()> {
    let conn = open_db()?;
    let session = open_session(&conn, user)?;
    records::delete_record(&conn, &session, kind, id)?;
    println!("Deleted {kind} record {id}");
    Ok(())
}
