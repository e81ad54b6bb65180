use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "weatherclock.log";
const MAX_LOG_BYTES: u64 = 1024 * 1024;
const DEFAULT_FILTER: &str = "weatherclock_core=info,weatherclock_cli=info";

/// Install stderr + file logging and return the log file path.
/// `RUST_LOG` overrides the default filter. If the log file cannot be
/// opened, logging continues on stderr only and `None` is returned.
pub fn init() -> Option<PathBuf> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let opened = log_file_path().and_then(|path| open_log_file(&path).map(|file| (path, file)));
    let (path, file_layer, file_error) = match opened {
        Ok((path, file)) => {
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (Some(path), Some(layer), None)
        }
        Err(err) => (None, None, Some(err)),
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to install tracing subscriber: {err}");
    }

    if let Some(err) = file_error {
        tracing::warn!("file logging disabled: {err:#}");
    }

    path
}

/// Create the log directory, apply the size cap, and open for appending.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    truncate_if_oversized(path, MAX_LOG_BYTES)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn log_file_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "weatherclock", "weatherclock")
        .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

    Ok(dirs.data_dir().join(LOG_FILE))
}

/// Start the log over once it grows past `max` bytes.
fn truncate_if_oversized(path: &Path, max: u64) -> Result<bool> {
    let Ok(meta) = fs::metadata(path) else {
        return Ok(false);
    };
    if meta.len() <= max {
        return Ok(false);
    }

    fs::write(path, b"")
        .with_context(|| format!("Failed to truncate log file: {}", path.display()))?;
    Ok(true)
}
