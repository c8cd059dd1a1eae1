//! Runner configuration.
//!
//! Values are layered: built-in defaults, then environment variables, then
//! command-line flags applied by the caller.

use std::env;
use std::path::PathBuf;

use crate::ports::process::ShellProgram;

/// Overrides the working directory commands run in.
pub const CWD_VAR: &str = "CMDPLUS_CWD";
/// Overrides the shell program.
pub const SHELL_VAR: &str = "CMDPLUS_SHELL";
/// Overrides the flag passed to the shell before the command.
pub const SHELL_ARG_VAR: &str = "CMDPLUS_SHELL_ARG";

/// Errors raised while building a [`RunnerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No working directory was configured and the current one is unreadable.
    #[error("Failed to determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    /// A variable was set to an empty string.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Where and how commands are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Working directory for every child process.
    pub cwd: PathBuf,
    /// Shell that interprets command lines.
    pub shell: ShellProgram,
}

impl RunnerConfig {
    /// Configuration running commands in `cwd` with the platform shell.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into(), shell: ShellProgram::default() }
    }

    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is empty or the current directory
    /// cannot be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`RunnerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &'static str| match lookup(key) {
            Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
            other => Ok(other),
        };

        let cwd = match non_empty(CWD_VAR)? {
            Some(cwd) => PathBuf::from(cwd),
            None => env::current_dir().map_err(ConfigError::CurrentDir)?,
        };

        let mut shell = ShellProgram::default();
        if let Some(program) = non_empty(SHELL_VAR)? {
            shell.program = program;
        }
        if let Some(arg) = non_empty(SHELL_ARG_VAR)? {
            shell.arg = arg;
        }

        Ok(Self { cwd, shell })
    }

    /// Replaces the working directory when `cwd` is given.
    #[must_use]
    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        if let Some(cwd) = cwd {
            self.cwd = cwd;
        }
        self
    }
}
