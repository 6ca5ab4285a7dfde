//! Source tree watching for sitepack.
//!
//! Emits classified change events so the CLI can re-run the right task
//! list: a full rebuild for general source changes, lint-only for script
//! changes in the scripts watch mode.

mod watcher;

pub use watcher::{SourceWatcher, WatchError, WatchEvent};
