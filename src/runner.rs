//! Command runner: executes one command and decodes what it produced.
//!
//! The spawner reports a process through two independent events, the
//! termination payload and the exit code. The runner awaits both, decodes
//! the captured bytes with the requested encoding and folds everything into
//! an [`ExecutionResult`]. Process failures are data, never errors.

use std::fmt;

use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::encoding::{Charset, UnknownEncoding};
use crate::ports::process::{ProcessSpawner, RawFailure, SpawnRequest, Termination};

const LOST_TERMINATION: &str = "process terminated without reporting output";

/// A command to run and the encoding its output is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Shell command line, executed as-is.
    pub command: String,
    /// Name of the encoding used to decode the output.
    pub encoding_name: String,
}

impl ExecutionRequest {
    /// Creates a request.
    pub fn new(command: impl Into<String>, encoding_name: impl Into<String>) -> Self {
        Self { command: command.into(), encoding_name: encoding_name.into() }
    }
}

/// A process failure with its diagnostic text already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecFailure {
    /// Plain-text summary line.
    pub summary: String,
    /// Decoded diagnostic output, usually the child's stderr.
    pub detail: String,
}

impl ExecFailure {
    /// Full message: the summary, a newline, then the decoded detail.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ExecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.summary, self.detail)
    }
}

impl std::error::Error for ExecFailure {}

/// Everything observed about one finished command.
///
/// `stdout` and `stderr` are always decoded, whether or not `failure` is
/// set. `exit_code` and `failure` are independent of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code; 0 when the process reported none.
    pub exit_code: i32,
    /// Decoded, trimmed standard output.
    pub stdout: String,
    /// Decoded, trimmed standard error.
    pub stderr: String,
    /// Set when the process could not run or terminated unsuccessfully.
    pub failure: Option<ExecFailure>,
}

impl ExecutionResult {
    fn decode(termination: Termination, exit_code: i32, charset: Charset) -> Self {
        let stdout = charset.decode(&termination.stdout).trim().to_string();
        let stderr = charset.decode(&termination.stderr).trim().to_string();
        let failure = termination.failure.map(|RawFailure { summary, detail }| ExecFailure {
            summary,
            detail: charset.decode(&detail),
        });
        Self { exit_code, stdout, stderr, failure }
    }
}

/// Runs commands through a [`ProcessSpawner`].
pub struct CommandRunner<'a> {
    spawner: &'a dyn ProcessSpawner,
    config: &'a RunnerConfig,
}

impl<'a> CommandRunner<'a> {
    /// Creates a runner using `spawner` with the given configuration.
    #[must_use]
    pub fn new(spawner: &'a dyn ProcessSpawner, config: &'a RunnerConfig) -> Self {
        Self { spawner, config }
    }

    /// Validates the request's encoding, then runs the command.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownEncoding`] before anything is spawned if the encoding
    /// name is not supported. Process failures are reported in
    /// [`ExecutionResult::failure`] instead.
    pub async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, UnknownEncoding> {
        let charset = Charset::resolve(&request.encoding_name)?;
        Ok(self.execute_with(&request.command, charset).await)
    }

    /// Runs `command` and decodes its output with `charset`.
    ///
    /// Suspends until the child has fully exited.
    pub async fn execute_with(&self, command: &str, charset: Charset) -> ExecutionResult {
        let request = SpawnRequest {
            command: command.to_string(),
            cwd: self.config.cwd.clone(),
            shell: self.config.shell.clone(),
        };
        debug!(command, cwd = %request.cwd.display(), encoding = %charset, "running command");

        let handle = self.spawner.spawn(&request);
        let (termination, exit) = tokio::join!(handle.termination, handle.exit);

        let termination = termination.unwrap_or_else(|_| Termination {
            failure: Some(RawFailure::new(LOST_TERMINATION, Vec::new())),
            ..Termination::default()
        });
        let result = ExecutionResult::decode(termination, exit.unwrap_or(0), charset);

        info!(
            command,
            exit_code = result.exit_code,
            failed = result.failure.is_some(),
            "command finished"
        );
        result
    }
}
