//! Watch command: rebuild whenever sources or the manifest change.
//!
//! A failing build is reported and watching continues; the next change
//! retries implicitly. The loop only ends when the process is interrupted.

use std::path::Path;

use anyhow::Result;
use sitepack_manifest::{Manifest, WatchMode};
use sitepack_pipeline::Pipeline;
use sitepack_watch::{SourceWatcher, WatchEvent};

/// Run the watch command.
pub async fn run(manifest_path: &Path, js_only: bool) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let mode = if js_only {
        WatchMode::Scripts
    } else {
        WatchMode::Build
    };

    watch_loop(Pipeline::new(manifest), mode).await
}

/// Watch the source tree, re-running the bound task on every change.
///
/// A manifest change reloads the manifest and recreates the watcher, since
/// the watched roots may have moved.
pub async fn watch_loop(mut pipeline: Pipeline, mode: WatchMode) -> Result<()> {
    loop {
        let manifest = pipeline.manifest();
        let roots = manifest.watch_roots();
        let manifest_path = manifest.path.clone();
        let vendor_root = manifest.vendor.root.clone();

        let (_watcher, mut rx) = SourceWatcher::new(&roots, &manifest_path, &vendor_root)?;
        tracing::info!("Watching for changes (ctrl-c to stop)");

        let mut reload = false;
        while let Some(event) = rx.recv().await {
            match event {
                WatchEvent::ManifestChanged => {
                    tracing::info!("Manifest changed, reloading");
                    match Manifest::load(&manifest_path) {
                        Ok(manifest) => {
                            pipeline = Pipeline::new(manifest);
                            run_bound_task(&pipeline, mode).await;
                            reload = true;
                            break;
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload manifest: {}", e);
                        }
                    }
                }
                WatchEvent::AppScript(path) => {
                    tracing::info!("Changed: {}", path.display());
                    run_bound_task(&pipeline, mode).await;
                }
                WatchEvent::Source(path) => {
                    // Script-only mode ignores non-script changes.
                    if mode == WatchMode::Build {
                        tracing::info!("Changed: {}", path.display());
                        run_bound_task(&pipeline, mode).await;
                    }
                }
            }
        }

        if !reload {
            // Watcher channel closed underneath us.
            return Ok(());
        }
    }
}

/// Run the task list bound to the watch mode, reporting failure without
/// exiting the loop.
async fn run_bound_task(pipeline: &Pipeline, mode: WatchMode) {
    let result = match mode {
        WatchMode::Build => {
            match super::steps_of(&pipeline.manifest().tasks, "build") {
                Ok(steps) => pipeline.run(&steps).await.map(|report| {
                    tracing::info!(
                        "Rebuilt in {}ms ({} steps)",
                        report.duration_ms,
                        report.steps.len()
                    );
                }),
                Err(e) => {
                    tracing::error!("Cannot resolve build task: {}", e);
                    return;
                }
            }
        }
        WatchMode::Scripts => pipeline.lint().await,
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        tracing::info!("Waiting for the next change");
    }
}
