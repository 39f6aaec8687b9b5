//! Internal diagnostics sink.
//!
//! [`Diagnostics`] appends `tracing` events to a file, filtered by
//! `RUST_LOG` (default `info`). It is installed as the default subscriber
//! for the current thread while it is alive and is closed explicitly at
//! shutdown, so no global logger is ever registered.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::dispatcher::DefaultGuard;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const DEFAULT_FILTER: &str = "info";

/// An open diagnostics file with its subscriber installed.
pub struct Diagnostics {
    path: PathBuf,
    guard: DefaultGuard,
}

impl Diagnostics {
    /// Opens `path` for appending and installs the subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let file = open_append(path).map_err(|e| {
            CliError::Config(format!("cannot open diagnostics log {}: {e}", path.display()))
        })?;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(file))
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);

        info!(path = %path.display(), "diagnostics opened");
        Ok(Self {
            path: path.to_path_buf(),
            guard,
        })
    }

    /// Path of the diagnostics file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Uninstalls the subscriber; later events are discarded.
    pub fn close(self) {
        info!(path = %self.path.display(), "diagnostics closed");
        drop(self.guard);
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::warn;

    #[test]
    fn events_are_appended_to_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("logiq_app.log");

        let diagnostics = Diagnostics::open(&path).expect("open");
        assert_eq!(diagnostics.path(), path.as_path());
        warn!(line = 3, "skipping line that is not valid UTF-8");
        diagnostics.close();
        warn!("not recorded");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("diagnostics opened"));
        assert!(text.contains("skipping line that is not valid UTF-8"));
        assert!(text.contains("diagnostics closed"));
        assert!(!text.contains("not recorded"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn reopening_appends() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("diag.log");

        Diagnostics::open(&path).expect("open").close();
        Diagnostics::open(&path).expect("reopen").close();

        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(text.matches("diagnostics opened").count(), 2);
    }

    #[test]
    fn unwritable_location_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").expect("write");

        let err = Diagnostics::open(blocker.join("diag.log"));
        assert!(matches!(err, Err(CliError::Config(_))));
    }
}
