//! Logging Infrastructure
//!
//! Structured logging setup with optional daily-rolling file output.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Log level comes from `RUST_LOG` when set, otherwise defaults to `info`
/// for the server itself and for tower_http request traces. When `log_dir`
/// points at an existing directory, output goes to a daily-rolling file
/// there instead of stdout.
pub fn init_logger(log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("galley_server=info,tower_http=info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "galley-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}
