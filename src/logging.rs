//! Logging Module
//!
//! Structured logging with file output for diagnostics.

use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "wheeltracker.log";

#[cfg(debug_assertions)]
const DEFAULT_DIRECTIVES: &str = "debug,hyper=warn,reqwest=warn";
#[cfg(not(debug_assertions))]
const DEFAULT_DIRECTIVES: &str = "info,hyper=warn,reqwest=warn";

/// Install the global subscriber.
///
/// Logs rotate daily under `<data_dir>/logs`. Debug builds also log to
/// stderr; stdout is left to command output. A second call is a no-op.
pub fn init(data_dir: &Path) {
    let log_dir = log_directory(data_dir);
    let _ = std::fs::create_dir_all(&log_dir);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX));

    #[cfg(debug_assertions)]
    let console_layer = Some(fmt::layer().with_target(true).with_writer(std::io::stderr));
    #[cfg(not(debug_assertions))]
    let console_layer: Option<fmt::Layer<_>> = None;

    let subscriber = tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .with(console_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// `RUST_LOG` when it parses, otherwise the build's default directives
fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn log_directory(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
