//! Run command: execute any named task list from the manifest.

use std::path::Path;

use anyhow::Result;
use sitepack_manifest::{Invocation, Manifest, StepKind, WatchMode};
use sitepack_pipeline::Pipeline;

/// Run a named task list.
///
/// Steps run in order; a watch entry ends the list and blocks in watch mode
/// (anything listed after it is ignored with a warning).
pub async fn run(manifest_path: &Path, task: &str) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let invocations = manifest.tasks.resolve(task)?;

    let mut steps: Vec<StepKind> = Vec::new();
    let mut watch: Option<WatchMode> = None;

    for invocation in invocations {
        match invocation {
            Invocation::Step(step) if watch.is_none() => steps.push(step),
            Invocation::Step(step) => {
                tracing::warn!("Ignoring step '{}' listed after watch", step);
            }
            Invocation::Watch(mode) if watch.is_none() => watch = Some(mode),
            Invocation::Watch(_) => {
                tracing::warn!("Ignoring duplicate watch entry");
            }
        }
    }

    let pipeline = Pipeline::new(manifest);

    if !steps.is_empty() {
        let report = pipeline.run(&steps).await?;
        tracing::info!(
            "Completed {} steps in {}ms",
            report.steps.len(),
            report.duration_ms
        );
    }

    if let Some(mode) = watch {
        super::watch::watch_loop(pipeline, mode).await?;
    }

    Ok(())
}
