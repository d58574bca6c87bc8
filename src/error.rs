use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown user: {0}")]
    UnknownUser(i64),

    #[error("{entity} not found: id {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("Cannot delete: {0}")]
    Blocked(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl WalletError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        WalletError::NotFound { entity, id }
    }

    /// Maps `QueryReturnedNoRows` to `NotFound`, passing other errors through.
    pub fn or_not_found(err: rusqlite::Error, entity: &'static str, id: i64) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => WalletError::not_found(entity, id),
            other => WalletError::Db(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
