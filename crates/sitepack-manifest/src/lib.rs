//! Build manifest for sitepack: path groups, output layout, and task lists.
//!
//! This crate is the declarative half of the tool. It knows nothing about
//! how steps execute; it only describes what files feed which step and
//! where output goes.

mod glob;
mod manifest;
mod task;

pub use glob::{expand, GlobError};
pub use manifest::{
    AppGroups, BundleSettings, Manifest, ManifestError, OutputLayout, StaticGroup,
    TemplateSettings, VendorGroups,
};
pub use task::{Invocation, StepKind, TaskError, TaskTable, WatchMode};
