//! File-backed tracing setup.
//!
//! The terminal belongs to the game, so log output goes to a file and is only
//! enabled when `RUST_LOG` is set.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber if `RUST_LOG` is set. Returns whether logging is on.
pub fn init() -> std::io::Result<bool> {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return Ok(false);
    };
    let Some(path) = log_path() else {
        return Ok(false);
    };
    init_with(filter, &path)?;
    tracing::info!(path = %path.display(), "logging initialized");
    Ok(true)
}

/// `tapseq.log` in the platform state directory, or local data where there is none
pub fn log_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "tapseq")?;
    let dir = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Some(dir.join("tapseq.log"))
}

pub fn init_with(filter: EnvFilter, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    // a second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
    Ok(())
}
