use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// Shared application state handed to every handler.
///
/// Cloning is cheap: the pool is internally reference-counted.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
}

impl ServerState {
    /// Open the database, run migrations, and prepare the upload directory
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_url).await?;

        std::fs::create_dir_all(&config.upload_dir)
            .map_err(|e| AppError::internal(format!("Failed to create upload directory: {e}")))?;

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
        })
    }
}
