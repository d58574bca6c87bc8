use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::error::WalletError;

/// Whether a user is a natural person (cédula) or a company (RNC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonKind {
    Individual,
    Company,
}

impl PersonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Individual => "individual",
            PersonKind::Company => "company",
        }
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(PersonKind::Individual),
            "company" => Ok(PersonKind::Company),
            other => Err(WalletError::Validation(format!(
                "Invalid person kind: {other} (must be 'individual' or 'company')"
            ))),
        }
    }
}

impl ToSql for PersonKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PersonKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: WalletError| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub national_id: String,
    pub person_kind: PersonKind,
    pub expense_limit: f64,
    pub cutoff_day: u32,
    pub is_active: bool,
}

/// Fields accepted when creating or updating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub national_id: String,
    pub person_kind: PersonKind,
    pub expense_limit: f64,
    pub cutoff_day: u32,
}

/// A per-user lookup row: income category, expense category or payment type.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct ExpenseItem {
    pub id: i64,
    pub description: String,
    pub is_active: bool,
}

/// A listed income or expense record, joined with its lookup descriptions.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: i64,
    pub category_id: i64,
    pub category: String,
    pub item: Option<String>,
    pub payment_type: Option<String>,
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub category_id: i64,
    pub description: String,
    pub amount: f64,
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category_id: i64,
    pub item_id: Option<i64>,
    pub payment_type_id: Option<i64>,
    pub description: String,
    pub amount: f64,
    pub date: Option<String>,
}

/// Case-insensitive substring match used by the list filters. An empty
/// needle matches everything.
pub fn text_matches(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_kind_parse() {
        assert_eq!("individual".parse::<PersonKind>().unwrap(), PersonKind::Individual);
        assert_eq!("company".parse::<PersonKind>().unwrap(), PersonKind::Company);
        let err = "alien".parse::<PersonKind>().unwrap_err();
        assert!(err.to_string().contains("Invalid person kind"));
    }

    #[test]
    fn test_text_matches() {
        assert!(text_matches("Recreación Familiar", "recreación"));
        assert!(text_matches("Anything", "  "));
        assert!(!text_matches("Salario", "bono"));
    }
}
