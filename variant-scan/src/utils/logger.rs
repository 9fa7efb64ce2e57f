//! Logging Infrastructure
//!
//! Console output goes to stderr so the terminal host keeps stdout for
//! popups. With a log directory, a daily rotating `variant-scan.YYYY-MM-DD`
//! file is written alongside.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// File name prefix of the rotating log files
const LOG_FILE_PREFIX: &str = "variant-scan";

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize the logging system with optional daily rotating files
///
/// # Arguments
/// * `level` - Log level or filter directive (e.g. "info", "variant_scan=debug")
/// * `json_format` - JSON output instead of the human readable format
/// * `log_dir` - Optional directory for file logging, created if missing
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (pretty_console, json_console) = if json_format {
        let layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);
        (Some(layer), None)
    };

    let (pretty_file, json_file) = match log_directory(log_dir)? {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let writer = std::sync::Mutex::new(appender);
            if json_format {
                (None, Some(fmt::layer().json().with_target(true).with_writer(writer)))
            } else {
                (
                    Some(fmt::layer().with_target(true).with_ansi(false).with_writer(writer)),
                    None,
                )
            }
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty_console)
        .with(json_console)
        .with(pretty_file)
        .with(json_file)
        .try_init()?;

    Ok(())
}

/// Resolve and create the log directory
///
/// Returns `None` when file logging is disabled.
pub fn log_directory(log_dir: Option<&str>) -> std::io::Result<Option<PathBuf>> {
    let Some(dir) = log_dir.filter(|d| !d.trim().is_empty()) else {
        return Ok(None);
    };
    let path = Path::new(dir);
    fs::create_dir_all(path)?;
    Ok(Some(path.to_path_buf()))
}
