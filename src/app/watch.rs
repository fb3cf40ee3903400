use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context as _, Result};
use eframe::egui::Context;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

/// Filesystem watch on the snapshot file.
///
/// The parent directory is watched so editors that save by renaming a
/// temporary file over the snapshot are still seen.
pub(super) struct SnapshotWatch {
    _watcher: RecommendedWatcher,
    changes: Receiver<()>,
}

impl SnapshotWatch {
    pub(super) fn start(snapshot_path: &Path, ctx: Context) -> Result<Self> {
        let file_name = snapshot_path
            .file_name()
            .map(|name| name.to_os_string())
            .with_context(|| format!("{} does not name a file", snapshot_path.display()))?;
        let directory = match snapshot_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, changes) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) if touches_snapshot(&event, &file_name) => {
                    if tx.send(()).is_ok() {
                        ctx.request_repaint();
                    }
                }
                Ok(_) => {}
                Err(error) => warn!(%error, "snapshot watch error"),
            }
        })
        .context("failed to create snapshot watcher")?;
        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", directory.display()))?;

        debug!(path = %snapshot_path.display(), "watching snapshot for changes");
        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Drains queued change notifications; true if there was at least one.
    pub(super) fn take_changes(&self) -> bool {
        self.changes.try_iter().count() > 0
    }
}

fn touches_snapshot(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_create() || event.kind.is_modify())
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}
