//! Step handlers and the sequential task runner for sitepack.
//!
//! Every step is a plain function over the filesystem; [`Pipeline`] wires
//! them to a loaded manifest and runs them fail-fast in order.

mod assets;
mod bundle;
mod lint;
mod runner;
mod templates;

pub use assets::{clean, concat, copy_flat, copy_tree, AssetError};
pub use bundle::{bundle, BundleError, BundleStats};
pub use lint::{lint_files, lint_source, Diagnostic, LintError};
pub use runner::{Pipeline, PipelineError, RunReport};
pub use templates::{compile_templates, TemplateError};
