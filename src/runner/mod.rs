//! External script execution, report archiving and the audit → harden → audit sequence.

pub mod reports;
pub mod sequence;

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::core::config::RunnerConfig;
use crate::core::errors::{HsnError, Result};

/// Runs one script to completion.
///
/// `Ok(())` means the script exited with status 0. Any other outcome is an
/// error: [`HsnError::ProcessFailure`] for a non-zero or signalled exit and
/// [`HsnError::Spawn`] when the interpreter could not be started.
pub trait ScriptRunner {
    fn run_script(&self, script: &Path) -> Result<()>;
}

impl<F> ScriptRunner for F
where
    F: Fn(&Path) -> Result<()>,
{
    fn run_script(&self, script: &Path) -> Result<()> {
        self(script)
    }
}

/// Runs scripts through an interpreter, e.g.
/// `powershell -ExecutionPolicy Bypass -File <script>`.
///
/// Blocks until the child exits. Stdio is inherited so the script talks to
/// the user's terminal directly. No timeout is applied.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn command_for(&self, script: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(script)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::from_config(&RunnerConfig::default())
    }
}

impl ScriptRunner for CommandRunner {
    fn run_script(&self, script: &Path) -> Result<()> {
        let status = self
            .command_for(script)
            .status()
            .map_err(|source| HsnError::Spawn {
                program: self.program.clone(),
                script: script.to_path_buf(),
                source,
            })?;
        check_status(script, status)
    }
}

fn check_status(script: &Path, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(HsnError::ProcessFailure {
        script: script.to_path_buf(),
        exit_code: status.code(),
        detail: status.code().map_or_else(
            || format!("terminated by signal ({status})"),
            |code| format!("exit code {code}"),
        ),
    })
}
