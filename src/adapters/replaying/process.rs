//! Replaying adapter for the `ProcessSpawner` port.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::cassette::format::ProcessRecord;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::process::{ProcessHandle, ProcessSpawner, RawFailure, SpawnRequest, Termination};

/// Serves recorded process outcomes from a cassette without spawning.
pub struct ReplayingProcessSpawner {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingProcessSpawner {
    /// Creates a new replaying spawner from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn next_record(&self, request: &SpawnRequest) -> Result<ProcessRecord, String> {
        let mut replayer = self.replayer.lock().unwrap_or_else(PoisonError::into_inner);
        let interaction =
            replayer.next_interaction("process", "spawn").map_err(|e| e.to_string())?;

        let recorded = interaction.input.get("command").and_then(serde_json::Value::as_str);
        if recorded != Some(request.command.as_str()) {
            warn!(
                seq = interaction.seq,
                recorded = ?recorded,
                requested = %request.command,
                "replayed command differs from recording"
            );
        }

        serde_json::from_value(interaction.output.clone())
            .map_err(|e| format!("Malformed process interaction seq={}: {e}", interaction.seq))
    }
}

impl ProcessSpawner for ReplayingProcessSpawner {
    fn spawn(&self, request: &SpawnRequest) -> ProcessHandle {
        match self.next_record(request) {
            Ok(record) => ProcessHandle::completed(record.to_termination(), record.exit_code),
            Err(message) => ProcessHandle::completed(
                Termination {
                    failure: Some(RawFailure::new(message, Vec::new())),
                    ..Termination::default()
                },
                None,
            ),
        }
    }
}
