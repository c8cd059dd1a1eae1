//! Command dispatch and handlers.

pub mod batch;
pub mod encoding;
pub mod run;

use std::env;
use std::path::Path;

use serde::Serialize;

use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::config::RunnerConfig;
use crate::context::ServiceContext;

/// Environment variable naming the directory a recording session is created in.
pub const RECORD_VAR: &str = "CMDPLUS_RECORD";
/// Environment variable naming a process cassette to replay.
pub const REPLAY_VAR: &str = "CMDPLUS_REPLAY";

/// Dispatch a parsed command line to its handler.
///
/// When `CMDPLUS_REPLAY` is set to a cassette file, processes are served
/// from that cassette instead of being spawned. Otherwise, when
/// `CMDPLUS_RECORD` is set to a directory path, every spawned process is
/// recorded to a cassette below that directory.
///
/// # Errors
///
/// Returns an error string if configuration fails or the selected command
/// handler fails.
pub async fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = RunnerConfig::from_env().map_err(|e| e.to_string())?.with_cwd(cli.cwd.clone());

    if let Ok(path) = env::var(REPLAY_VAR) {
        let ctx = ServiceContext::replaying(config, Path::new(&path)).map_err(|e| e.to_string())?;
        return dispatch_with_context(&cli.command, &ctx).await;
    }

    if let Ok(root) = env::var(RECORD_VAR) {
        let session = RecordingSession::new(Path::new(&root))?;
        let ctx = ServiceContext::recording(config, &session);
        let result = dispatch_with_context(&cli.command, &ctx).await;

        // Drop context first to release the recorder
        drop(ctx);
        finish_recording(session)?;
        return result;
    }

    dispatch_with_context(&cli.command, &ServiceContext::live(config)).await
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Run { command, encoding } => run::run(ctx, command, encoding).await,
        Command::Batch { input, command, encoding, execute_once, continue_on_fail } => {
            let args = batch::BatchArgs {
                input: input.as_deref(),
                command: command.clone(),
                encoding: encoding.clone(),
                execute_once: *execute_once,
                continue_on_fail: *continue_on_fail,
            };
            batch::run(ctx, &args).await
        }
        Command::Encoding { name } => encoding::run(name),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}

/// Print `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}
