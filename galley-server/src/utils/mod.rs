//! Shared utilities: error types, logging, ID generation.

pub mod error;
pub mod id;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult};
pub use id::{now_millis, snowflake_id};
