//! Rule persistence for daylock
//!
//! Provides:
//! - The `RuleStore` trait consumed by the enforcement loop and the
//!   rule-editing surface
//! - A SQLite implementation with a real uniqueness constraint backing
//!   the replace-on-upsert contract

mod sqlite;
mod traits;

pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad input to an upsert; rejected synchronously, never silently
    /// dropped.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Transient read/write failure. The enforcement loop reports it and
    /// skips the cycle.
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
