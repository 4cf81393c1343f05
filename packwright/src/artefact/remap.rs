//! Transformation of dev archives into their final form.
//!
//! The remapper is an opaque external program. Its command line comes from
//! the `[remap]` section, with `{input}` and `{output}` replaced by the archive
//! paths. Projects without a remapper get an identity copy.

use crate::error::{PipelineError, Result};
use crate::exec::{CommandExecutor, stderr_message};
use camino::Utf8Path;
use log::{debug, info};
use std::time::Duration;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Turns a dev archive into a final archive.
pub trait Remapper {
    /// Read `input` and write the remapped archive to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingArchive`] if `input` is absent or the
    /// tool produced no `output`, and [`PipelineError::ExternalTool`] if the
    /// tool fails.
    fn remap(&self, input: &Utf8Path, output: &Utf8Path) -> Result<()>;
}

/// Configured external remapping command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl RemapCommand {
    /// Create a command description.
    ///
    /// When no argument mentions `{input}`, the input and output paths are
    /// appended.
    #[must_use]
    pub fn new(program: String, mut args: Vec<String>, timeout: Duration) -> Self {
        if !args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            args.push(INPUT_PLACEHOLDER.to_owned());
            args.push(OUTPUT_PLACEHOLDER.to_owned());
        }
        Self {
            program,
            args,
            timeout,
        }
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Maximum run time before the tool is killed.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments with placeholders substituted.
    #[must_use]
    pub fn arguments(&self, input: &Utf8Path, output: &Utf8Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, input.as_str())
                    .replace(OUTPUT_PLACEHOLDER, output.as_str())
            })
            .collect()
    }
}

/// Runs a [`RemapCommand`] through a [`CommandExecutor`].
pub struct CommandRemapper<'a> {
    command: &'a RemapCommand,
    executor: &'a dyn CommandExecutor,
}

impl<'a> CommandRemapper<'a> {
    /// Bind `command` to `executor`.
    #[must_use]
    pub fn new(command: &'a RemapCommand, executor: &'a dyn CommandExecutor) -> Self {
        Self { command, executor }
    }
}

impl Remapper for CommandRemapper<'_> {
    fn remap(&self, input: &Utf8Path, output: &Utf8Path) -> Result<()> {
        require_input(input)?;
        prepare_output(output)?;

        let args = self.command.arguments(input, output);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        info!("remapping {input} with {}", self.command.program);
        let result = self.executor.run(&self.command.program, &arg_refs)?;

        if !result.status.success() {
            return Err(PipelineError::ExternalTool {
                program: self.command.program.clone(),
                message: stderr_message(&result),
            });
        }
        if !output.is_file() {
            return Err(PipelineError::MissingArchive {
                path: output.to_owned(),
            });
        }
        Ok(())
    }
}

/// Identity transformation used when no remapper is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRemapper;

impl Remapper for PassthroughRemapper {
    fn remap(&self, input: &Utf8Path, output: &Utf8Path) -> Result<()> {
        require_input(input)?;
        prepare_output(output)?;
        debug!("no remapper configured, copying {input} to {output}");
        std::fs::copy(input, output)?;
        Ok(())
    }
}

fn require_input(input: &Utf8Path) -> Result<()> {
    if input.is_file() {
        Ok(())
    } else {
        Err(PipelineError::MissingArchive {
            path: input.to_owned(),
        })
    }
}

/// Create the output directory and clear any stale output.
fn prepare_output(output: &Utf8Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::remove_file(output) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;
    use crate::test_utils::{failure_output, success_output};
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn dirs() -> (TempDir, Utf8PathBuf, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8 temp dir");
        let input = root.join("devlibs/mod-dev.jar");
        std::fs::create_dir_all(input.parent().expect("parent")).expect("mkdir");
        std::fs::write(&input, b"PK dev").expect("write input");
        (dir, input, root.join("libs/mod.jar"))
    }

    fn command(args: &[&str]) -> RemapCommand {
        RemapCommand::new(
            "java".to_owned(),
            args.iter().map(|a| (*a).to_owned()).collect(),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn placeholders_are_substituted() {
        let cmd = command(&["-jar", "remap.jar", "--in={input}", "--out={output}"]);
        let args = cmd.arguments(Utf8Path::new("/a/in.jar"), Utf8Path::new("/b/out.jar"));
        assert_eq!(args, vec!["-jar", "remap.jar", "--in=/a/in.jar", "--out=/b/out.jar"]);
    }

    #[test]
    fn paths_are_appended_without_placeholders() {
        let cmd = command(&["-jar", "remap.jar"]);
        let args = cmd.arguments(Utf8Path::new("in.jar"), Utf8Path::new("out.jar"));
        assert_eq!(args, vec!["-jar", "remap.jar", "in.jar", "out.jar"]);
    }

    #[rstest]
    fn successful_tool_must_produce_output(dirs: (TempDir, Utf8PathBuf, Utf8PathBuf)) {
        let (_guard, input, output) = dirs;
        let cmd = command(&[]);
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(success_output()));

        let err = CommandRemapper::new(&cmd, &executor)
            .remap(&input, &output)
            .expect_err("tool wrote nothing");
        assert!(matches!(err, PipelineError::MissingArchive { ref path } if *path == output));
    }

    #[rstest]
    fn tool_output_is_accepted(dirs: (TempDir, Utf8PathBuf, Utf8PathBuf)) {
        let (_guard, input, output) = dirs;
        let cmd = command(&[]);
        let mut executor = MockCommandExecutor::new();
        let expected_out = output.clone();
        executor
            .expect_run()
            .withf(|program, args| program == "java" && args.len() == 2)
            .returning(move |_, _| {
                std::fs::write(&expected_out, b"PK final").expect("simulate tool");
                Ok(success_output())
            });

        CommandRemapper::new(&cmd, &executor)
            .remap(&input, &output)
            .expect("remap succeeds");
        assert_eq!(std::fs::read(&output).expect("output"), b"PK final");
    }

    #[rstest]
    fn failing_tool_reports_stderr(dirs: (TempDir, Utf8PathBuf, Utf8PathBuf)) {
        let (_guard, input, output) = dirs;
        let cmd = command(&[]);
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .returning(|_, _| Ok(failure_output("missing mappings")));

        let err = CommandRemapper::new(&cmd, &executor)
            .remap(&input, &output)
            .expect_err("tool failed");
        assert_eq!(err.to_string(), "java failed: missing mappings");
    }

    #[rstest]
    fn missing_input_fails_before_running(dirs: (TempDir, Utf8PathBuf, Utf8PathBuf)) {
        let (_guard, input, output) = dirs;
        std::fs::remove_file(&input).expect("remove input");
        let cmd = command(&[]);
        let mut executor = MockCommandExecutor::new();
        executor.expect_run().never();

        let err = CommandRemapper::new(&cmd, &executor)
            .remap(&input, &output)
            .expect_err("no input");
        assert!(matches!(err, PipelineError::MissingArchive { .. }));
    }

    #[rstest]
    fn passthrough_copies_bytes(dirs: (TempDir, Utf8PathBuf, Utf8PathBuf)) {
        let (_guard, input, output) = dirs;
        PassthroughRemapper.remap(&input, &output).expect("copy");
        assert_eq!(std::fs::read(&output).expect("output"), b"PK dev");
    }
}
