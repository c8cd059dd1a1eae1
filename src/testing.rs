//! Scripted spawner shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::process::{
    ProcessHandle, ProcessSpawner, RawFailure, SpawnRequest, Termination,
};

/// One scripted process outcome: the termination payload and exit code.
pub(crate) type Outcome = (Termination, Option<i32>);

/// Serves pre-built outcomes in order and remembers every request.
pub(crate) struct ScriptedSpawner {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<SpawnRequest>>,
}

impl ScriptedSpawner {
    pub(crate) fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes: Mutex::new(outcomes.into()), requests: Mutex::new(Vec::new()) }
    }

    /// Commands spawned so far, in order.
    pub(crate) fn commands(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|r| r.command.clone()).collect()
    }

    pub(crate) fn requests(&self) -> Vec<SpawnRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProcessSpawner for ScriptedSpawner {
    fn spawn(&self, request: &SpawnRequest) -> ProcessHandle {
        self.requests.lock().unwrap().push(request.clone());
        let (termination, exit) =
            self.outcomes.lock().unwrap().pop_front().expect("no scripted outcome left");
        ProcessHandle::completed(termination, exit)
    }
}

pub(crate) fn succeeded(stdout: &[u8]) -> Outcome {
    (Termination { stdout: stdout.to_vec(), ..Termination::default() }, Some(0))
}

pub(crate) fn failed(command: &str, code: i32, stderr: &[u8]) -> Outcome {
    (
        Termination {
            stdout: Vec::new(),
            stderr: stderr.to_vec(),
            failure: Some(RawFailure::new(format!("Command failed: {command}"), stderr)),
        },
        Some(code),
    )
}
