//! Task graph and topological execution.
//!
//! Tasks declare hard dependencies, which must succeed before the task runs,
//! and soft `must_run_after` constraints, which only order tasks that are
//! both present. The order is computed with Kahn's algorithm; ties are
//! broken by the task's `Ord` so plans are deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Errors in the shape of a task graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A task depends on a task that is not in the graph.
    #[error("task {task} depends on unknown task {dependency}")]
    UnknownDependency {
        /// The dependent task.
        task: String,
        /// The missing dependency.
        dependency: String,
    },

    /// The constraints cannot be satisfied.
    #[error("task graph contains a cycle through: {tasks}")]
    Cycle {
        /// Comma-separated names of the tasks left unordered.
        tasks: String,
    },
}

#[derive(Debug, Clone)]
struct Node<T> {
    depends_on: BTreeSet<T>,
    runs_after: BTreeSet<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            depends_on: BTreeSet::new(),
            runs_after: BTreeSet::new(),
        }
    }
}

/// A directed acyclic graph of tasks.
#[derive(Debug, Clone)]
pub struct TaskGraph<T> {
    nodes: BTreeMap<T, Node<T>>,
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

/// What happened to one task during [`TaskGraph::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<E> {
    /// The task ran and succeeded.
    Succeeded,
    /// The task ran and failed.
    Failed(E),
    /// The task did not run because a dependency failed or was skipped.
    Skipped,
}

/// Outcomes of a graph run, in execution order.
#[derive(Debug)]
pub struct GraphRun<T, E> {
    /// Each task with its outcome.
    pub outcomes: Vec<(T, TaskOutcome<E>)>,
}

impl<T, E> GraphRun<T, E> {
    /// Tasks that failed, with their errors.
    #[must_use]
    pub fn failures(&self) -> Vec<(&T, &E)> {
        self.outcomes
            .iter()
            .filter_map(|(task, outcome)| match outcome {
                TaskOutcome::Failed(err) => Some((task, err)),
                _ => None,
            })
            .collect()
    }

    /// Tasks that were skipped.
    #[must_use]
    pub fn skipped(&self) -> Vec<&T> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TaskOutcome::Skipped))
            .map(|(task, _)| task)
            .collect()
    }

    /// `true` when every task succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, TaskOutcome::Succeeded))
    }
}

impl<T: Ord + Clone + fmt::Display> TaskGraph<T> {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `task` with hard dependencies on `depends_on`.
    ///
    /// Adding a task twice merges its dependencies.
    pub fn add_task(&mut self, task: T, depends_on: impl IntoIterator<Item = T>) {
        self.nodes
            .entry(task)
            .or_default()
            .depends_on
            .extend(depends_on);
    }

    /// Order `task` after `earlier` when both are in the graph.
    ///
    /// Unlike a dependency, this neither pulls `earlier` in nor skips `task`
    /// when `earlier` fails.
    pub fn must_run_after(&mut self, task: &T, earlier: T) {
        if let Some(node) = self.nodes.get_mut(task) {
            node.runs_after.insert(earlier);
        }
    }

    /// Whether `task` is in the graph.
    #[must_use]
    pub fn contains(&self, task: &T) -> bool {
        self.nodes.contains_key(task)
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Compute the execution order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownDependency`] for a dependency that was
    /// never added, or [`GraphError::Cycle`] if no order exists.
    pub fn execution_order(&self) -> Result<Vec<T>, GraphError> {
        let mut predecessors: BTreeMap<&T, BTreeSet<&T>> = BTreeMap::new();
        let mut successors: BTreeMap<&T, BTreeSet<&T>> = BTreeMap::new();

        for (task, node) in &self.nodes {
            let preds = predecessors.entry(task).or_default();
            for dependency in &node.depends_on {
                if !self.nodes.contains_key(dependency) {
                    return Err(GraphError::UnknownDependency {
                        task: task.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
                preds.insert(dependency);
            }
            preds.extend(
                node.runs_after
                    .iter()
                    .filter(|earlier| self.nodes.contains_key(*earlier)),
            );
            for pred in preds.iter() {
                successors.entry(*pred).or_default().insert(task);
            }
        }

        let mut in_degree: BTreeMap<&T, usize> = predecessors
            .iter()
            .map(|(task, preds)| (*task, preds.len()))
            .collect();
        let mut ready: BTreeSet<&T> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(task, _)| *task)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(task) = ready.pop_first() {
            order.push(task.clone());
            for next in successors.get(task).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck: Vec<String> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(task, _)| task.to_string())
                .collect();
            return Err(GraphError::Cycle {
                tasks: stuck.join(", "),
            });
        }

        Ok(order)
    }

    /// Execute every task in order with `run_task`.
    ///
    /// A failed task causes its transitive dependents to be skipped; tasks
    /// that do not depend on it still run.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if the graph cannot be ordered. Task failures
    /// are reported in the returned [`GraphRun`].
    pub fn run<E>(
        &self,
        mut run_task: impl FnMut(&T) -> Result<(), E>,
    ) -> Result<GraphRun<T, E>, GraphError> {
        let order = self.execution_order()?;
        let mut blocked: BTreeSet<T> = BTreeSet::new();
        let mut outcomes = Vec::with_capacity(order.len());

        for task in order {
            let node = self.nodes.get(&task);
            let is_blocked = node.is_some_and(|node| {
                node.depends_on
                    .iter()
                    .any(|dependency| blocked.contains(dependency))
            });

            let outcome = if is_blocked {
                TaskOutcome::Skipped
            } else {
                match run_task(&task) {
                    Ok(()) => TaskOutcome::Succeeded,
                    Err(err) => TaskOutcome::Failed(err),
                }
            };
            if !matches!(outcome, TaskOutcome::Succeeded) {
                blocked.insert(task.clone());
            }
            outcomes.push((task, outcome));
        }

        Ok(GraphRun { outcomes })
    }
}
