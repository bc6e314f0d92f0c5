use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_NAME: &str = "skillnotes.log";

pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

/// Send tracing output to `<data_dir>/skillnotes.log`.
///
/// The terminal belongs to the UI, so nothing is written to stdout or stderr.
/// `RUST_LOG` overrides `level`.
pub fn init(data_dir: &Path, level: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(data_dir)?;
    let path = log_file_path(data_dir);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join("data");

        let path = init(&data_dir, "debug").unwrap();
        assert_eq!(path, data_dir.join("skillnotes.log"));
        assert!(path.exists());

        // A second install is tolerated
        assert!(init(&data_dir, "info").is_ok());
    }
}
