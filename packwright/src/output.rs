//! Output formatting for the packwright CLI.
//!
//! Plans and run reports are rendered as plain lines for stderr.

use crate::error::PipelineError;
use crate::graph::{GraphRun, TaskOutcome};
use crate::pipeline::{Goal, Task};

/// Render the execution order of `goal`, one numbered task per line.
///
/// # Example
///
/// ```
/// use packwright::output::format_plan;
/// use packwright::pipeline::{Goal, Task};
///
/// let text = format_plan(Goal::Assemble, &[Task::AssembleJar, Task::RemapJar]);
/// assert_eq!(text, "Tasks for assemble:\n  1. jar\n  2. remapJar");
/// ```
#[must_use]
pub fn format_plan(goal: Goal, order: &[Task]) -> String {
    let mut text = format!("Tasks for {goal}:");
    for (index, task) in order.iter().enumerate() {
        text.push_str(&format!("\n  {}. {task}", index + 1));
    }
    text
}

/// One line per task describing its outcome.
#[must_use]
pub fn report_lines(run: &GraphRun<Task, PipelineError>) -> Vec<String> {
    run.outcomes
        .iter()
        .map(|(task, outcome)| match outcome {
            TaskOutcome::Succeeded => format!("  {task}: ok"),
            TaskOutcome::Failed(err) => format!("  {task}: FAILED: {err}"),
            TaskOutcome::Skipped => format!("  {task}: skipped"),
        })
        .collect()
}

/// Closing summary of a run of `goal`.
#[must_use]
pub fn summary(goal: Goal, run: &GraphRun<Task, PipelineError>) -> String {
    let total = run.outcomes.len();
    let failed = run.failures().len();
    let skipped = run.skipped().len();
    if failed == 0 && skipped == 0 {
        let plural = if total == 1 { "task" } else { "tasks" };
        format!("{goal} succeeded ({total} {plural})")
    } else {
        format!("{goal} failed ({failed} failed, {skipped} skipped of {total})")
    }
}
