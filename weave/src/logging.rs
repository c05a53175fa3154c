//! File logging.
//!
//! The TUI owns the terminal, so `tracing` output goes to
//! `<data_dir>/weave.log`. The filter comes from `WEAVE_LOG`
//! (e.g. `WEAVE_LOG=weave_core=debug`) and defaults to `info`.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "WEAVE_LOG";

/// Installs the global subscriber writing to `<data_dir>/weave.log`.
///
/// # Errors
///
/// Returns an I/O error if the log file cannot be opened, or if a global
/// subscriber is already installed.
pub fn init(data_dir: &Path) -> std::io::Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(data_dir.join("weave.log"))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .map_err(std::io::Error::other)
}
