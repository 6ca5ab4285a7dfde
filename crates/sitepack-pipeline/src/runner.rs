//! Sequential pipeline execution.
//!
//! Steps run strictly in order; the first failure aborts the rest of the
//! invocation. The filesystem is the only state shared between steps: clean
//! deletes the output root, later steps repopulate it.

use std::time::Instant;

use sitepack_manifest::{expand, GlobError, Manifest, StepKind};

use crate::assets::{self, AssetError};
use crate::bundle::{self, BundleError};
use crate::lint::{self, LintError};
use crate::templates::{self, TemplateError};

/// Concatenated application stylesheet name inside the styles directory.
const APP_STYLES: &str = "app.css";
/// Concatenated vendor stylesheet name inside the styles directory.
const VENDOR_STYLES: &str = "vendor.css";

/// Errors that can abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error("Lint failed with {violations} violation(s)")]
    Lint { violations: usize },

    #[error(transparent)]
    LintIo(#[from] LintError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Templates(#[from] TemplateError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Steps that ran to completion
    pub steps: Vec<StepKind>,
    /// Total run time in milliseconds
    pub duration_ms: u64,
}

/// Executes pipeline steps against a loaded manifest.
pub struct Pipeline {
    manifest: Manifest,
}

impl Pipeline {
    /// Create a pipeline for a manifest.
    pub fn new(manifest: Manifest) -> Self {
        Self { manifest }
    }

    /// The manifest this pipeline runs against.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Run steps in order, stopping at the first failure.
    pub async fn run(&self, steps: &[StepKind]) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let mut completed = Vec::new();

        for &step in steps {
            tracing::info!("Running step: {}", step);
            self.run_step(step)?;
            completed.push(step);
        }

        Ok(RunReport {
            steps: completed,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Run the lint step alone. Used by the scripts-only watch mode.
    pub async fn lint(&self) -> Result<(), PipelineError> {
        self.run_step(StepKind::Lint)
    }

    fn run_step(&self, step: StepKind) -> Result<(), PipelineError> {
        match step {
            StepKind::Lint => self.step_lint(),
            StepKind::Clean => self.step_clean(),
            StepKind::Bundle => self.step_bundle(),
            StepKind::Templates => self.step_templates(),
            StepKind::Concat => self.step_concat(),
            StepKind::Copy => self.step_copy(),
        }
    }

    fn step_lint(&self) -> Result<(), PipelineError> {
        let files = expand(&self.manifest.app.scripts)?;
        let diagnostics = lint::lint_files(&files)?;

        if !diagnostics.is_empty() {
            for diagnostic in &diagnostics {
                tracing::error!("{}", diagnostic);
            }
            return Err(PipelineError::Lint {
                violations: diagnostics.len(),
            });
        }

        tracing::info!("Linted {} files", files.len());
        Ok(())
    }

    fn step_clean(&self) -> Result<(), PipelineError> {
        assets::clean(&self.manifest.output.root)?;
        Ok(())
    }

    fn step_bundle(&self) -> Result<(), PipelineError> {
        let dest = self
            .manifest
            .output
            .scripts
            .join(&self.manifest.bundle.output);
        let stats = bundle::bundle(&self.manifest.bundle.entry, &dest)?;
        tracing::info!("Bundled {} modules into {}", stats.modules, dest.display());
        Ok(())
    }

    fn step_templates(&self) -> Result<(), PipelineError> {
        let files = expand(&self.manifest.app.templates)?;
        let dest = self
            .manifest
            .output
            .scripts
            .join(&self.manifest.templates.output);
        let count = templates::compile_templates(
            &files,
            &self.manifest.templates.base,
            &self.manifest.templates.module,
            &dest,
        )?;
        tracing::info!("Compiled {} templates", count);
        Ok(())
    }

    fn step_concat(&self) -> Result<(), PipelineError> {
        let app_styles = expand(&self.manifest.app.styles)?;
        assets::concat(&app_styles, &self.manifest.output.styles.join(APP_STYLES))?;

        let vendor_styles = expand(&self.manifest.vendor.styles)?;
        assets::concat(
            &vendor_styles,
            &self.manifest.output.styles.join(VENDOR_STYLES),
        )?;

        tracing::info!(
            "Concatenated {} app and {} vendor stylesheets",
            app_styles.len(),
            vendor_styles.len()
        );
        Ok(())
    }

    fn step_copy(&self) -> Result<(), PipelineError> {
        let fonts = expand(&self.manifest.vendor.fonts)?;
        assets::copy_flat(&fonts, &self.manifest.output.fonts)?;

        let shims = expand(&self.manifest.vendor.shims)?;
        assets::copy_flat(&shims, &self.manifest.output.scripts)?;

        let static_patterns: Vec<String> = self
            .manifest
            .statics
            .files
            .iter()
            .map(|p| format!("{}/{}", self.manifest.statics.dir.display(), p))
            .collect();
        let static_files = expand(&static_patterns)?;
        assets::copy_tree(
            &static_files,
            &self.manifest.statics.dir,
            &self.manifest.output.root,
        )?;

        tracing::info!(
            "Copied {} fonts, {} shims, {} static files",
            fonts.len(),
            shims.len(),
            static_files.len()
        );
        Ok(())
    }
}
