//! Build pipeline orchestration.
//!
//! A goal expands into a [`TaskGraph`] of typed [`Task`] nodes, which is then
//! executed in topological order. Tasks share only the immutable
//! [`BuildContext`] and the files they write, each at a distinct path from
//! the [`ArtifactLayout`].

use crate::artefact::assembler::JarAssembler;
use crate::artefact::layout::ArtifactLayout;
use crate::artefact::remap::{CommandRemapper, PassthroughRemapper, Remapper};
use crate::artefact::source_set::SourceSetKind;
use crate::config::{BuildSettings, ConfigError, PublishSettings};
use crate::error::{PipelineError, Result};
use crate::exec::CommandExecutor;
use crate::graph::{GraphRun, TaskGraph};
use crate::organizer::BuildFileOrganizer;
use crate::publish::credentials::CredentialSource;
use crate::publish::http::HttpTransport;
use crate::publish::{PublishRequest, Publisher};
use crate::version::BuildVersion;
use log::info;
use std::fmt;

/// A unit of work in the pipeline.
///
/// Variant order is the tie-break order when several tasks are ready.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Task {
    /// Merge every source set into the dev archive.
    AssembleJar,
    /// Remap the dev archive into the final primary archive.
    RemapJar,
    /// Merge source trees into the dev sources archive.
    SourcesJar,
    /// Remap the dev sources archive.
    RemapSourcesJar,
    /// Write the API-only dev archive.
    ApiJar,
    /// Remap the API dev archive.
    RemapApiJar,
    /// Copy the final archive to its version-independent name.
    CopyJarNameConsistent,
    /// Copy the final archive into the bin directory.
    CopyJarToBin,
    /// Submit the final archive to the named target.
    Publish(String),
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssembleJar => f.write_str("jar"),
            Self::RemapJar => f.write_str("remapJar"),
            Self::SourcesJar => f.write_str("sourcesJar"),
            Self::RemapSourcesJar => f.write_str("remapSourcesJar"),
            Self::ApiJar => f.write_str("apiJar"),
            Self::RemapApiJar => f.write_str("remapApiJar"),
            Self::CopyJarNameConsistent => f.write_str("copyJarNameConsistent"),
            Self::CopyJarToBin => f.write_str("copyJarToBin"),
            Self::Publish(target) => write!(f, "publish-{target}"),
        }
    }
}

/// A named set of root tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Goal {
    /// Produce every archive.
    Assemble,
    /// Produce every archive and copy the final one to its fixed locations.
    Build,
    /// Produce the final archive and submit it to the selected targets.
    Publish,
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Assemble => "assemble",
            Self::Build => "build",
            Self::Publish => "publish",
        })
    }
}

/// Read-only state shared by every task of one invocation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Validated project settings.
    pub settings: BuildSettings,
    /// The single version of this build.
    pub version: BuildVersion,
    /// Output paths derived from settings and version.
    pub layout: ArtifactLayout,
    /// Log publish submissions instead of sending them.
    pub dry_run: bool,
    /// Publish targets selected on the command line; empty means all.
    pub targets: Vec<String>,
}

impl BuildContext {
    /// Create the context for `settings` at `version`.
    #[must_use]
    pub fn new(
        settings: BuildSettings,
        version: BuildVersion,
        dry_run: bool,
        targets: Vec<String>,
    ) -> Self {
        let layout = ArtifactLayout::new(&settings, &version);
        Self {
            settings,
            version,
            layout,
            dry_run,
            targets,
        }
    }

    fn publish_settings(&self) -> Result<&PublishSettings> {
        self.settings
            .publish
            .as_ref()
            .ok_or_else(|| ConfigError::PublishingNotConfigured.into())
    }
}

/// External collaborators the tasks talk to.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    /// Runs the remapper.
    pub executor: &'a dyn CommandExecutor,
    /// Sends publish requests.
    pub transport: &'a dyn HttpTransport,
    /// Supplies publish tokens.
    pub credentials: &'a dyn CredentialSource,
}

/// Expand `goal` into its task graph.
///
/// # Errors
///
/// For [`Goal::Publish`], returns [`ConfigError::PublishingNotConfigured`]
/// without a `[publish]` section and [`ConfigError::UnknownTarget`] for an
/// unknown `--target`.
pub fn plan(goal: Goal, context: &BuildContext) -> Result<TaskGraph<Task>> {
    let mut graph = TaskGraph::new();
    graph.add_task(Task::AssembleJar, []);
    graph.add_task(Task::RemapJar, [Task::AssembleJar]);

    match goal {
        Goal::Assemble | Goal::Build => {
            if context.settings.has_sources() {
                graph.add_task(Task::SourcesJar, []);
                graph.add_task(Task::RemapSourcesJar, [Task::SourcesJar]);
            }
            graph.add_task(Task::ApiJar, []);
            graph.add_task(Task::RemapApiJar, [Task::ApiJar]);
        }
        Goal::Publish => {
            let publish = context.publish_settings()?;
            for target in publish.select_targets(&context.targets)? {
                graph.add_task(Task::Publish(target.name.clone()), [Task::RemapJar]);
            }
        }
    }

    if goal == Goal::Build {
        graph.add_task(Task::CopyJarNameConsistent, [Task::RemapJar]);
        graph.add_task(Task::CopyJarToBin, [Task::RemapJar]);
    }

    graph.must_run_after(&Task::CopyJarToBin, Task::CopyJarNameConsistent);
    graph.must_run_after(&Task::RemapApiJar, Task::CopyJarNameConsistent);
    graph.must_run_after(&Task::RemapSourcesJar, Task::CopyJarNameConsistent);
    Ok(graph)
}

/// Plan and execute `goal`.
///
/// Task failures are recorded in the returned run; use [`check_run`] to turn
/// them into an error.
///
/// # Errors
///
/// Returns planning errors and [`PipelineError::Graph`] if the graph cannot
/// be ordered.
pub fn run_goal(
    goal: Goal,
    context: &BuildContext,
    services: Services<'_>,
) -> Result<GraphRun<Task, PipelineError>> {
    let graph = plan(goal, context)?;
    info!("running {goal} for {}", context.version);
    Ok(graph.run(|task| execute(task, context, services))?)
}

/// Fail when any task of `run` failed.
///
/// # Errors
///
/// Returns [`PipelineError::TasksFailed`] naming the failed tasks.
pub fn check_run(run: &GraphRun<Task, PipelineError>) -> Result<()> {
    let failures = run.failures();
    if failures.is_empty() {
        return Ok(());
    }
    Err(PipelineError::TasksFailed {
        count: failures.len(),
        tasks: failures
            .iter()
            .map(|(task, _)| task.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Run a single task.
///
/// # Errors
///
/// Returns whatever the task's operation reports.
pub fn execute(task: &Task, context: &BuildContext, services: Services<'_>) -> Result<()> {
    info!("> Task :{task}");
    let settings = &context.settings;
    let layout = &context.layout;
    let assembler = JarAssembler::new(&settings.project, &context.version, &settings.jar);

    match task {
        Task::AssembleJar => {
            assembler.assemble_primary(&settings.source_sets, &layout.dev_jar)?;
        }
        Task::RemapJar => remap(context, services, &layout.dev_jar, &layout.primary_jar)?,
        Task::SourcesJar => {
            assembler.assemble_sources(&settings.source_sets, &layout.sources_dev_jar)?;
        }
        Task::RemapSourcesJar => {
            remap(context, services, &layout.sources_dev_jar, &layout.sources_jar)?;
        }
        Task::ApiJar => {
            let api = settings
                .source_set(SourceSetKind::Api)
                .ok_or(ConfigError::MissingSourceSet {
                    kind: SourceSetKind::Api,
                })?;
            assembler.assemble_api(api, &layout.api_dev_jar)?;
        }
        Task::RemapApiJar => remap(context, services, &layout.api_dev_jar, &layout.api_jar)?,
        Task::CopyJarNameConsistent => {
            BuildFileOrganizer::new(layout).copy_latest()?;
        }
        Task::CopyJarToBin => {
            BuildFileOrganizer::new(layout).copy_to_bin()?;
        }
        Task::Publish(name) => publish(context, services, name)?,
    }
    Ok(())
}

fn remap(
    context: &BuildContext,
    services: Services<'_>,
    input: &camino::Utf8Path,
    output: &camino::Utf8Path,
) -> Result<()> {
    match &context.settings.remap {
        Some(command) => CommandRemapper::new(command, services.executor).remap(input, output),
        None => PassthroughRemapper.remap(input, output),
    }
}

fn publish(context: &BuildContext, services: Services<'_>, name: &str) -> Result<()> {
    let settings = context.publish_settings()?;
    let target = settings
        .targets
        .iter()
        .find(|target| target.name == name)
        .ok_or_else(|| ConfigError::UnknownTarget {
            name: name.to_owned(),
            available: settings
                .targets
                .iter()
                .map(|target| target.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })?;
    let request = PublishRequest::new(
        &context.settings.project,
        settings,
        &context.version,
        &context.layout.primary_jar,
    );

    if context.dry_run {
        info!("{}: {}", target.name, request.describe(target));
        return Ok(());
    }

    Publisher::new(services.transport, services.credentials)
        .publish_target(target, &request)
        .map(|_| ())
        .map_err(|source| PipelineError::Publish {
            target: target.name.clone(),
            source,
        })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
