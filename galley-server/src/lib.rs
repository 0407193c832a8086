//! Galley Server - restaurant POS and kitchen management backend
//!
//! The domain core is inventory-aware menu materialization: recipes
//! describe ingredient compositions, menus snapshot a recipe (or carry
//! ad-hoc lines), and producing a menu converts raw ingredient stock into
//! finished portions.
//!
//! # Module structure
//!
//! ```text
//! galley-server/src/
//! ├── core/      # configuration, shared state, HTTP server
//! ├── api/       # routes and handlers
//! ├── db/        # pool, migrations, repositories
//! ├── models/    # entities and request payloads
//! └── utils/     # errors, id generation, logging
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod models;
pub mod utils;

// Re-export common types
pub use core::{Config, Server, ServerState};
pub use utils::logger::init_logger;
pub use utils::{AppError, AppResult};

pub fn print_banner() {
    println!(
        r#"
   _________    __    __    ________  __
  / ____/   |  / /   / /   / ____/\ \/ /
 / / __/ /| | / /   / /   / __/    \  /
/ /_/ / ___ |/ /___/ /___/ /___    / /
\____/_/  |_/_____/_____/_____/   /_/
    "#
    );
}
