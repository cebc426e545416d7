//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file, so editors that save
//! by renaming a temporary file over the original keep being observed. Events
//! for other files in that directory are ignored, and the burst of events a
//! single save produces is coalesced into one reload.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;
use crate::observability::metrics;

/// Quiet period after the last change before the file is re-read.
const DEBOUNCE: Duration = Duration::from_millis(250);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Must be called inside a Tokio runtime; the returned
    /// watcher must be kept alive for updates to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let name = self.path.file_name().map(OsStr::to_os_string);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, name.as_deref()) => {
                    let _ = change_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(watch_dir(&self.path), RecursiveMode::NonRecursive)?;
        tokio::spawn(reload_on_change(self.path.clone(), change_rx, self.update_tx));

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Directory holding `path`; a bare file name lives in the working directory.
fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// True for a write, create or rename that involves the file called `name`.
fn touches(event: &Event, name: Option<&OsStr>) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && name.is_some()
        && event.paths.iter().any(|p| p.file_name() == name)
}

/// Reload once per burst of change notifications until either side hangs up.
async fn reload_on_change(
    path: PathBuf,
    mut changes: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<AppConfig>,
) {
    while changes.recv().await.is_some() {
        tokio::time::sleep(DEBOUNCE).await;
        while changes.try_recv().is_ok() {}

        tracing::info!(path = ?path, "Config file change detected, reloading");
        match load_config(&path) {
            Ok(config) => {
                if updates.send(config).is_err() {
                    break;
                }
            }
            Err(e) => {
                metrics::record_reload("rejected");
                tracing::error!(
                    error = %e,
                    "Failed to reload config, keeping current configuration"
                );
            }
        }
    }
}
