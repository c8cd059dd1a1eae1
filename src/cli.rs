//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::encoding::DEFAULT_ENCODING;

/// Top-level CLI parser for `cmdplus`.
#[derive(Debug, Parser)]
#[command(name = "cmdplus", version, about = "Run shell commands and decode their output")]
pub struct Cli {
    /// Working directory for executed commands (overrides `CMDPLUS_CWD`).
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one shell command and print its exit code and decoded output.
    Run {
        /// Command line passed to the shell as-is.
        #[arg(value_name = "COMMAND")]
        command: String,

        /// Encoding of the command's output.
        #[arg(short, long, default_value = DEFAULT_ENCODING)]
        encoding: String,
    },
    /// Run a command for each item of a JSON array.
    Batch {
        /// File holding the JSON array of items (`-` or omitted for stdin).
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Command for items without a `command` field.
        #[arg(short, long)]
        command: Option<String>,

        /// Encoding for items without an `encoding` field.
        #[arg(short, long, default_value = DEFAULT_ENCODING)]
        encoding: String,

        /// Run only once, with the first item's parameters.
        #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
        execute_once: bool,

        /// Emit error records for failing items instead of stopping.
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Check an encoding name and print its canonical form.
    Encoding {
        /// Encoding name to look up.
        name: String,
    },
}
