/// Server configuration
///
/// # Environment variables
///
/// | Variable             | Default          | Description                    |
/// |----------------------|------------------|--------------------------------|
/// | HOST                 | 0.0.0.0          | Listen address                 |
/// | PORT                 | 3001             | HTTP port                      |
/// | DATABASE_URL         | sqlite:galley.db | SQLite database                |
/// | UPLOAD_DIR           | uploads          | Image upload directory         |
/// | ALLOW_NEGATIVE_STOCK | true             | Skip the floor check on debits |
/// | RUST_ENV             | development      | Runtime environment            |
/// | LOG_DIR              | (unset)          | Daily-rolling log files        |
///
/// # Example
///
/// ```ignore
/// PORT=8080 DATABASE_URL=sqlite:/data/galley.db cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub host: String,
    /// HTTP API port
    pub port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Directory for uploaded images, served under /uploads/
    pub upload_dir: String,
    /// When true (the default), production debits carry no floor check and
    /// ingredient stock can go negative
    pub allow_negative_stock: bool,
    /// Runtime environment: development | production
    pub environment: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:galley.db".into()),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            allow_negative_stock: std::env::var("ALLOW_NEGATIVE_STOCK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            environment: std::env::var("RUST_ENV").unwrap_or_else(|_| "development".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
