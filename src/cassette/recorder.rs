//! Records interactions into a cassette file.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::format::{Cassette, Interaction};

/// Errors raised while writing a cassette.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The cassette could not be rendered as YAML.
    #[error("Failed to serialize cassette: {0}")]
    Serialize(#[from] serde_yaml::Error),
    /// The cassette file could not be written.
    #[error("Failed to write cassette {path}: {source}")]
    Write {
        /// Cassette path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Append an interaction, numbering it after the previous one.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let interaction = Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        };
        debug!(
            seq = interaction.seq,
            port = %interaction.port,
            method = %interaction.method,
            "recorded interaction"
        );
        self.next_seq += 1;
        self.interactions.push(interaction);
    }

    /// Serialize `input` and `output` and record them.
    ///
    /// # Errors
    ///
    /// Returns an error if either value cannot be represented as JSON; nothing
    /// is recorded in that case.
    pub fn record_serialized<I, O>(
        &mut self,
        port: &str,
        method: &str,
        input: &I,
        output: &O,
    ) -> Result<(), serde_json::Error>
    where
        I: Serialize,
        O: Serialize,
    {
        let input = serde_json::to_value(input)?;
        let output = serde_json::to_value(output)?;
        self.record(port, method, input, output);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Write the cassette YAML file, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be serialized or written.
    pub fn finish(self) -> Result<PathBuf, RecordError> {
        let count = self.interactions.len();
        let yaml = serde_yaml::to_string(&Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        })?;
        std::fs::write(&self.path, yaml).map_err(|source| RecordError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), count, "wrote cassette");
        Ok(self.path)
    }
}
