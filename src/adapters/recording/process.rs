//! Recording adapter for the `ProcessSpawner` port.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_interaction;
use crate::cassette::format::ProcessRecord;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::process::{ProcessHandle, ProcessSpawner, SpawnRequest};

/// Records process interactions while delegating to an inner spawner.
pub struct RecordingProcessSpawner {
    inner: Box<dyn ProcessSpawner>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingProcessSpawner {
    /// Creates a new recording spawner wrapping the given implementation.
    pub fn new(inner: Box<dyn ProcessSpawner>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

/// Recorded input of a `process::spawn` interaction.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SpawnInput {
    pub(crate) command: String,
    pub(crate) cwd: PathBuf,
}

impl ProcessSpawner for RecordingProcessSpawner {
    fn spawn(&self, request: &SpawnRequest) -> ProcessHandle {
        let inner = self.inner.spawn(request);
        let (mut signals, handle) = ProcessHandle::channel();
        let recorder = Arc::clone(&self.recorder);
        let input = SpawnInput { command: request.command.clone(), cwd: request.cwd.clone() };

        tokio::spawn(async move {
            let (termination, exit) = tokio::join!(inner.termination, inner.exit);
            let exit = exit.ok();
            // A lost termination is not recorded; the runner sees the same loss
            // but still gets any exit code the inner spawner reported.
            let Ok(termination) = termination else {
                if let Some(code) = exit {
                    signals.exit(code);
                }
                return;
            };

            record_interaction(
                &recorder,
                "process",
                "spawn",
                &input,
                &ProcessRecord::capture(&termination, exit),
            );
            drop(recorder);

            if let Some(code) = exit {
                signals.exit(code);
            }
            signals.terminate(termination);
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::process::ShellProgram;

    /// Reports an exit code, then loses the termination event.
    struct ExitOnlySpawner;

    impl ProcessSpawner for ExitOnlySpawner {
        fn spawn(&self, _request: &SpawnRequest) -> ProcessHandle {
            let (mut signals, handle) = ProcessHandle::channel();
            signals.exit(3);
            drop(signals);
            handle
        }
    }

    #[tokio::test]
    async fn forwards_exit_code_when_termination_is_lost() {
        let dir = tempfile::tempdir().unwrap();
        let recorder =
            Arc::new(Mutex::new(CassetteRecorder::new(dir.path().join("c.yaml"), "t", "c")));

        let spawner =
            RecordingProcessSpawner::new(Box::new(ExitOnlySpawner), Arc::clone(&recorder));
        let handle = spawner.spawn(&SpawnRequest {
            command: "anything".into(),
            cwd: dir.path().to_path_buf(),
            shell: ShellProgram::default(),
        });
        let (termination, exit) = tokio::join!(handle.termination, handle.exit);

        assert_eq!(exit, Ok(3));
        assert!(termination.is_err());
        assert_eq!(recorder.lock().unwrap().len(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn records_spawn_interaction() {
        use crate::adapters::live::LiveProcessSpawner;

        let dir = tempfile::tempdir().unwrap();
        let cassette_path = dir.path().join("process.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "test", "abc")));

        {
            let spawner =
                RecordingProcessSpawner::new(Box::new(LiveProcessSpawner), Arc::clone(&recorder));
            let handle = spawner.spawn(&SpawnRequest {
                command: "echo hello; exit 3".into(),
                cwd: dir.path().to_path_buf(),
                shell: ShellProgram::default(),
            });
            let (termination, exit) = tokio::join!(handle.termination, handle.exit);
            assert_eq!(exit, Ok(3));
            assert_eq!(termination.unwrap().stdout, b"hello\n");
        }

        let recorder = Arc::try_unwrap(recorder).unwrap().into_inner().unwrap();
        recorder.finish().unwrap();

        let content = std::fs::read_to_string(&cassette_path).unwrap();
        assert!(content.contains("process"));
        assert!(content.contains("spawn"));
        assert!(content.contains("echo hello; exit 3"));
        assert!(content.contains("aGVsbG8K"));
        assert!(content.contains("Command failed"));
    }
}
