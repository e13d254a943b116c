//! Diagnostics for jiractl runs.
//!
//! Everything goes to `jiractl.log`, rotated daily, so stdout stays free for
//! tables and JSON. Every console line is mirrored here as well.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jiractl=info,warn";

/// Log level used by `--verbose`.
const VERBOSE_LOG_FILTER: &str = "jiractl=debug,warn";

/// Initialize the logging system.
///
/// Logs are written to a daily rotating file in the platform-specific local
/// data directory:
/// - Linux: `~/.local/share/jiractl/logs/`
/// - macOS: `~/Library/Application Support/jiractl/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\jiractl\logs\`
///
/// `RUST_LOG` wins over both the default filter and `verbose`.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// or if a global subscriber is already set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "jiractl.log");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jiractl starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Get the log directory path.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("jiractl").join("logs"))
}
