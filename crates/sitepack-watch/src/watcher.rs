//! File watching for rebuild-on-change.
//!
//! Watches the application source roots and the manifest file. Changes
//! under the vendor dependency directory are dropped entirely; everything
//! else is classified so the caller can decide between a full rebuild and
//! a lint-only pass.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Errors that can occur while setting up the watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        source: notify::Error,
    },

    #[error("Failed to create watcher: {0}")]
    Init(notify::Error),
}

/// Events emitted by the source watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The manifest file itself changed
    ManifestChanged,

    /// An application script changed
    AppScript(PathBuf),

    /// Any other watched source file changed
    Source(PathBuf),
}

/// Watcher over the source tree and manifest.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    /// Watch `roots` recursively plus the manifest file, excluding anything
    /// under `vendor_root`.
    ///
    /// Returns the watcher and a channel of classified events. The watcher
    /// must be kept alive for events to keep flowing.
    pub fn new(
        roots: &[PathBuf],
        manifest_path: &Path,
        vendor_root: &Path,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), WatchError> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(WatchError::Init)?;

        for root in roots {
            if root.exists() {
                watcher
                    .watch(root, RecursiveMode::Recursive)
                    .map_err(|source| WatchError::Watch {
                        path: root.clone(),
                        source,
                    })?;
                tracing::debug!("Watching {}", root.display());
            } else {
                tracing::warn!("Watch root does not exist: {}", root.display());
            }
        }

        if manifest_path.exists() {
            watcher
                .watch(manifest_path, RecursiveMode::NonRecursive)
                .map_err(|source| WatchError::Watch {
                    path: manifest_path.to_path_buf(),
                    source,
                })?;
            tracing::debug!("Watching manifest {}", manifest_path.display());
        }

        // Bridge the notify callback into an async channel, debouncing
        // bursts of events from editors that write in several syscalls.
        let manifest_path = manifest_path.to_path_buf();
        let vendor_root = vendor_root.to_path_buf();
        std::thread::spawn(move || {
            let mut last_event_time = std::time::Instant::now();
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                let now = std::time::Instant::now();
                if now.duration_since(last_event_time) < debounce_duration {
                    continue;
                }
                last_event_time = now;

                for path in event.paths {
                    if let Some(e) = classify(&path, &event.kind, &manifest_path, &vendor_root) {
                        tracing::debug!("Change detected: {}", path.display());
                        let _ = async_tx.blocking_send(e);
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event, dropping vendor changes.
fn classify(
    path: &Path,
    kind: &notify::EventKind,
    manifest_path: &Path,
    vendor_root: &Path,
) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    if path.starts_with(vendor_root) {
        return None;
    }

    if path == manifest_path {
        return Some(WatchEvent::ManifestChanged);
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "js" {
        Some(WatchEvent::AppScript(path.to_path_buf()))
    } else {
        Some(WatchEvent::Source(path.to_path_buf()))
    }
}
