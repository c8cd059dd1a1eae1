//! Live process spawner using `tokio::process::Command`.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::ports::process::{
    ProcessHandle, ProcessSignals, ProcessSpawner, RawFailure, SpawnRequest, Termination,
};

/// Live spawner that runs commands through the host shell.
///
/// Must be called from within a tokio runtime; the child is supervised by a
/// spawned task.
pub struct LiveProcessSpawner;

impl ProcessSpawner for LiveProcessSpawner {
    fn spawn(&self, request: &SpawnRequest) -> ProcessHandle {
        let (signals, handle) = ProcessHandle::channel();

        let child = shell_command(request)
            .current_dir(&request.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        match child {
            Ok(child) => {
                debug!(command = %request.command, pid = ?child.id(), "spawned child process");
                tokio::spawn(supervise(child, request.command.clone(), signals));
            }
            Err(err) => {
                warn!(command = %request.command, error = %err, "failed to spawn child process");
                signals.terminate(Termination {
                    failure: Some(RawFailure::new(
                        format!("failed to spawn {}: {err}", request.shell.program),
                        Vec::new(),
                    )),
                    ..Termination::default()
                });
            }
        }

        handle
    }
}

/// `cmd.exe` parses its own command line, so the command goes through verbatim.
#[cfg(windows)]
fn shell_command(request: &SpawnRequest) -> Command {
    let mut command = Command::new(&request.shell.program);
    command.raw_arg(request.shell.raw_command_line(&request.command));
    command
}

#[cfg(not(windows))]
fn shell_command(request: &SpawnRequest) -> Command {
    let mut command = Command::new(&request.shell.program);
    command.arg(&request.shell.arg).arg(&request.command);
    command
}

/// Drains both pipes while waiting for the child, then fires both events.
async fn supervise(mut child: Child, command: String, mut signals: ProcessSignals) {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr, status) =
        tokio::join!(read_all(stdout, "stdout"), read_all(stderr, "stderr"), child.wait());

    let failure = match status {
        Ok(status) => {
            if let Some(code) = status.code() {
                signals.exit(code);
            }
            failure_for(&status, &command, &stderr)
        }
        Err(err) => {
            Some(RawFailure::new(format!("failed to wait for {command}: {err}"), Vec::new()))
        }
    };

    signals.terminate(Termination { stdout, stderr, failure });
}

fn failure_for(status: &ExitStatus, command: &str, stderr: &[u8]) -> Option<RawFailure> {
    if status.success() {
        None
    } else {
        Some(RawFailure::new(format!("Command failed: {command}"), stderr))
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>, stream: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(err) = pipe.read_to_end(&mut buf).await {
            warn!(stream, error = %err, "failed to read child output; keeping partial bytes");
        }
    }
    buf
}
