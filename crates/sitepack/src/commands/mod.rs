//! CLI command implementations.

pub mod build;
pub mod init;
pub mod run;
pub mod watch;

use sitepack_manifest::{Invocation, StepKind, TaskError, TaskTable};

/// The step sequence of a task, with any trailing watch entry stripped.
pub(crate) fn steps_of(tasks: &TaskTable, name: &str) -> Result<Vec<StepKind>, TaskError> {
    Ok(tasks
        .resolve(name)?
        .into_iter()
        .filter_map(|invocation| match invocation {
            Invocation::Step(step) => Some(step),
            Invocation::Watch(_) => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_task_steps_drop_the_watch_entry() {
        let tasks = TaskTable::default();
        let steps = steps_of(&tasks, "default").unwrap();
        assert_eq!(steps, StepKind::BUILD_ORDER.to_vec());
    }

    #[test]
    fn unknown_task_is_an_error() {
        let tasks = TaskTable::default();
        assert!(steps_of(&tasks, "deploy").is_err());
    }
}
