//! Task lists and their resolution to built-in steps.

use std::collections::BTreeMap;

use serde::Deserialize;

/// The built-in pipeline steps, in the vocabulary the manifest uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Check application scripts for style violations.
    Lint,
    /// Delete the output root.
    Clean,
    /// Bundle application scripts from the entry file.
    Bundle,
    /// Compile HTML templates into a loadable script.
    Templates,
    /// Concatenate stylesheet groups.
    Concat,
    /// Copy vendor fonts, vendor shims, and static files.
    Copy,
}

impl StepKind {
    /// All steps, in default `build` order.
    pub const BUILD_ORDER: [StepKind; 6] = [
        StepKind::Lint,
        StepKind::Clean,
        StepKind::Bundle,
        StepKind::Templates,
        StepKind::Concat,
        StepKind::Copy,
    ];

    /// The manifest-facing name of this step.
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Lint => "lint",
            StepKind::Clean => "clean",
            StepKind::Bundle => "bundle",
            StepKind::Templates => "templates",
            StepKind::Concat => "concat",
            StepKind::Copy => "copy",
        }
    }

    fn from_name(name: &str) -> Option<StepKind> {
        match name {
            "lint" => Some(StepKind::Lint),
            "clean" => Some(StepKind::Clean),
            "bundle" => Some(StepKind::Bundle),
            "templates" => Some(StepKind::Templates),
            "concat" => Some(StepKind::Concat),
            "copy" => Some(StepKind::Copy),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What the watcher re-runs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Re-run the full `build` task on any source or manifest change.
    Build,
    /// Re-run only `lint` when application scripts change.
    Scripts,
}

/// One resolved entry of a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// Run a built-in step.
    Step(StepKind),
    /// Enter watch mode. Blocks until the process is interrupted, so this
    /// only makes sense as the final entry of a task list.
    Watch(WatchMode),
}

/// Errors from task list validation and resolution.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Task '{task}' references unknown step or task '{name}'")]
    UnknownName { task: String, name: String },

    #[error("Task lists form a cycle involving '{0}'")]
    Cycle(String),

    #[error("No task or step named '{0}'")]
    NoSuchTask(String),
}

/// The named task lists of a manifest.
///
/// A task list entry may name a built-in step, a watch mode, or another
/// task list. Resolution flattens nested task references into a plain
/// sequence of invocations; reference cycles are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TaskTable {
    tasks: BTreeMap<String, Vec<String>>,
}

impl Default for TaskTable {
    fn default() -> Self {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "build".to_string(),
            StepKind::BUILD_ORDER
                .iter()
                .map(|s| s.name().to_string())
                .collect(),
        );
        tasks.insert(
            "default".to_string(),
            vec!["build".to_string(), "watch".to_string()],
        );
        Self { tasks }
    }
}

impl TaskTable {
    /// Resolve a task or step name to its flattened invocation sequence.
    pub fn resolve(&self, name: &str) -> Result<Vec<Invocation>, TaskError> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.resolve_into(name, &mut out, &mut stack)?;
        Ok(out)
    }

    /// Validate every defined task list: all names known, no cycles.
    pub fn validate(&self) -> Result<(), TaskError> {
        for name in self.tasks.keys() {
            self.resolve(name)?;
        }
        Ok(())
    }

    /// Names of all defined task lists.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    fn resolve_into(
        &self,
        name: &str,
        out: &mut Vec<Invocation>,
        stack: &mut Vec<String>,
    ) -> Result<(), TaskError> {
        if stack.iter().any(|seen| seen == name) {
            return Err(TaskError::Cycle(name.to_string()));
        }

        if let Some(entries) = self.tasks.get(name) {
            stack.push(name.to_string());
            for entry in entries {
                if let Some(invocation) = builtin(entry) {
                    out.push(invocation);
                } else if self.tasks.contains_key(entry) {
                    self.resolve_into(entry, out, stack)?;
                } else {
                    return Err(TaskError::UnknownName {
                        task: name.to_string(),
                        name: entry.to_string(),
                    });
                }
            }
            stack.pop();
            return Ok(());
        }

        if let Some(invocation) = builtin(name) {
            out.push(invocation);
            return Ok(());
        }

        Err(TaskError::NoSuchTask(name.to_string()))
    }
}

/// Look up a built-in step or watch mode by name.
fn builtin(name: &str) -> Option<Invocation> {
    if let Some(step) = StepKind::from_name(name) {
        return Some(Invocation::Step(step));
    }
    match name {
        "watch" | "watch:build" => Some(Invocation::Watch(WatchMode::Build)),
        "watch:js" => Some(Invocation::Watch(WatchMode::Scripts)),
        _ => None,
    }
}
