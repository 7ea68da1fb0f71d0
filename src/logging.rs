//! Log setup. The terminal belongs to the TUI, so records go to a file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Overrides the verbosity flags when set.
pub const LOG_ENV: &str = "POKELIST_LOG";

pub fn default_log_path() -> Option<PathBuf> {
    dirs_next::cache_dir().map(|dir| dir.join("pokelist").join("pokelist.log"))
}

pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "pokelist=info",
        1 => "pokelist=debug",
        _ => "pokelist=trace",
    }
}

pub fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Installs the global subscriber writing to `log_file`, or the default
/// cache location. Returns the path in use, if any.
pub fn init_logger(log_file: Option<PathBuf>, verbosity: u8) -> io::Result<Option<PathBuf>> {
    let Some(path) = log_file.or_else(default_log_path) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(env_filter(verbosity));
    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;
    Ok(Some(path))
}
