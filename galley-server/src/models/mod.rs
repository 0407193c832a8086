//! Data models
//!
//! Entity structs mirror the SQLite schema; Create/Update structs are the
//! typed request payloads. JSON field names are camelCase to match the
//! frontend. All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake
//! values that fit in a JS number).

pub mod employee;
pub mod menu;
pub mod order;
pub mod product;
pub mod recipe;
pub mod transaction;

// Re-exports
pub use employee::*;
pub use menu::*;
pub use order::*;
pub use product::*;
pub use recipe::*;
pub use transaction::*;
