//! Repository Module
//!
//! CRUD operations over the SQLite pool, one module per table family.
//! Repositories are free async functions taking `&SqlitePool`; every
//! multi-statement write (parent row plus ingredient lines, production
//! debits) runs inside a single transaction so partial failures roll back.

pub mod employee;
pub mod menu;
pub mod order;
pub mod product;
pub mod recipe;
pub mod transaction;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
