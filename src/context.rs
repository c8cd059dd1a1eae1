//! Service context bundling the process spawner with runner configuration.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::LiveProcessSpawner;
use crate::adapters::recording::RecordingProcessSpawner;
use crate::adapters::replaying::ReplayingProcessSpawner;
use crate::cassette::replayer::{CassetteReplayer, ReplayError};
use crate::cassette::session::RecordingSession;
use crate::config::RunnerConfig;
use crate::ports::process::ProcessSpawner;
use crate::runner::CommandRunner;

/// Bundles the process boundary and the configuration commands run with.
///
/// Constructors wire up different spawner implementations (live,
/// recording, replaying).
pub struct ServiceContext {
    /// Spawner for child processes.
    pub spawner: Box<dyn ProcessSpawner>,
    /// Working directory and shell.
    pub config: RunnerConfig,
}

impl ServiceContext {
    /// Creates a live context that spawns real processes.
    #[must_use]
    pub fn live(config: RunnerConfig) -> Self {
        Self { spawner: Box::new(LiveProcessSpawner), config }
    }

    /// Creates a context that spawns real processes and records every
    /// interaction into `session`.
    ///
    /// The context must be dropped before the session is finished.
    #[must_use]
    pub fn recording(config: RunnerConfig, session: &RecordingSession) -> Self {
        Self {
            spawner: Box::new(RecordingProcessSpawner::new(
                Box::new(LiveProcessSpawner),
                Arc::clone(&session.process),
            )),
            config,
        }
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(config: RunnerConfig, path: &Path) -> Result<Self, ReplayError> {
        let replayer = CassetteReplayer::load(path)?;
        Ok(Self { spawner: Box::new(ReplayingProcessSpawner::new(replayer)), config })
    }

    /// A runner borrowing this context's spawner and configuration.
    #[must_use]
    pub fn runner(&self) -> CommandRunner<'_> {
        CommandRunner::new(self.spawner.as_ref(), &self.config)
    }
}
