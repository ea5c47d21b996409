//! Manifest file watcher for development builds that write to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::http::dev::DevUpdate;

/// Watches the manifest's directory and announces changes on the dev channel.
pub struct ManifestWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DevUpdate>,
}

impl ManifestWatcher {
    pub fn new(path: &Path, update_tx: mpsc::UnboundedSender<DevUpdate>) -> Self {
        Self {
            path: path.to_path_buf(),
            update_tx,
        }
    }

    /// Start watching in a background thread. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let target = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && event.paths.iter().any(|p| p.file_name() == target.file_name());
                    if relevant {
                        tracing::info!(path = ?target, "Manifest change detected, reloading...");
                        let _ = tx.send(DevUpdate::ManifestChanged);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // The build may not have written the manifest yet; watch its directory.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Manifest watcher started");
        Ok(watcher)
    }
}
