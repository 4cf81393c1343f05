//! packwright CLI entrypoint.
//!
//! Loads the project configuration, resolves the build version and runs the
//! requested goal. Command results go to stdout; progress, the per-task
//! report and errors go to stderr.

use clap::Parser;
use packwright::artefact::remap::RemapCommand;
use packwright::cli::{Cli, Command};
use packwright::config::BuildSettings;
use packwright::error::{PipelineError, Result};
use packwright::exec::{DEFAULT_COMMAND_TIMEOUT, SystemCommandExecutor};
use packwright::logging;
use packwright::output::{format_plan, report_lines, summary};
use packwright::pipeline::{BuildContext, Goal, Services, check_run, plan, run_goal};
use packwright::publish::credentials::EnvCredentials;
use packwright::publish::http::UreqTransport;
use packwright::version::BuildVersion;
use packwright::version::scm::GitSourceControl;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    if let Err(err) = logging::init(cli.verbosity, cli.quiet) {
        write_stderr_line(&mut stderr, format!("warning: {err}"));
    }
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let settings = BuildSettings::load(&cli.config)?;
    let executor = SystemCommandExecutor::with_timeout(
        settings
            .remap
            .as_ref()
            .map_or(DEFAULT_COMMAND_TIMEOUT, RemapCommand::timeout),
    );
    let version = {
        let scm = GitSourceControl::new(&executor, &settings.root);
        BuildVersion::resolve(&settings.project, cli.release, &scm)
    };

    if cli.command == Command::Version {
        write_line(stdout, &version)?;
        return Ok(());
    }

    let publish_args = cli.command.publish_args();
    let context = BuildContext::new(
        settings,
        version,
        publish_args.dry_run,
        publish_args.targets,
    );

    match &cli.command {
        Command::Plan { goal } => {
            let order = plan(*goal, &context)?.execution_order()?;
            write_line(stdout, format_plan(*goal, &order))
        }
        command => match command.goal() {
            Some(goal) => run_and_report(goal, &context, &executor, cli.quiet, stderr),
            None => Ok(()),
        },
    }
}

fn run_and_report(
    goal: Goal,
    context: &BuildContext,
    executor: &SystemCommandExecutor,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let transport = UreqTransport;
    let credentials = EnvCredentials;
    let services = Services {
        executor,
        transport: &transport,
        credentials: &credentials,
    };

    let run = run_goal(goal, context, services)?;
    if !quiet {
        write_stderr_line(stderr, "");
        for line in report_lines(&run) {
            write_stderr_line(stderr, line);
        }
        write_stderr_line(stderr, summary(goal, &run));
    }
    check_run(&run)
}

fn write_line(stdout: &mut dyn Write, message: impl std::fmt::Display) -> Result<()> {
    writeln!(stdout, "{message}").map_err(|source| PipelineError::WriteFailed { source })
}

/// Map the run result to a process exit code, printing any error.
fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}
