//! Build command: run the build task once.

use std::path::Path;

use anyhow::Result;
use sitepack_manifest::Manifest;
use sitepack_pipeline::Pipeline;

/// Run the build command.
pub async fn run(manifest_path: &Path) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let steps = super::steps_of(&manifest.tasks, "build")?;

    let pipeline = Pipeline::new(manifest);
    let report = pipeline.run(&steps).await?;

    tracing::info!(
        "Completed {} steps in {}ms",
        report.steps.len(),
        report.duration_ms
    );

    Ok(())
}
