//! Replays recorded interactions from a cassette.

use std::collections::HashMap;
use std::path::Path;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Errors raised while loading or consuming a cassette.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The cassette file could not be read.
    #[error("Failed to read cassette file {path}: {source}")]
    Read {
        /// Cassette path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The cassette file is not valid cassette YAML.
    #[error("Failed to parse cassette file {path}: {source}")]
    Parse {
        /// Cassette path.
        path: String,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
    /// Nothing was recorded for the requested pair.
    #[error(
        "Cassette has no interactions recorded for port={port:?} method={method:?}. \
         Available port::method pairs: [{available}]"
    )]
    NotRecorded {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Comma-separated `port::method` pairs that do exist.
        available: String,
    },
    /// Every interaction for the pair has already been served.
    #[error(
        "Cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
         have been consumed. Last interaction was seq={last_seq}."
    )]
    Exhausted {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Number of interactions recorded for the pair.
        count: usize,
        /// Sequence number of the last one.
        last_seq: u64,
    },
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
pub struct CassetteReplayer {
    /// Per port+method queue of interactions (in order).
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    /// Per port+method cursor tracking position.
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Load a cassette file and create a replayer for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ReplayError::Read { path: path.display().to_string(), source })?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|source| ReplayError::Parse { path: path.display().to_string(), source })?;
        Ok(Self::new(&cassette))
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette has no (more) interactions for the
    /// given port/method combination, describing what was requested versus
    /// what remains.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
    ) -> Result<&Interaction, ReplayError> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(ReplayError::NotRecorded {
                port: port.to_string(),
                method: method.to_string(),
                available: available.join(", "),
            });
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        let Some(interaction) = queue.get(*cursor) else {
            return Err(ReplayError::Exhausted {
                port: port.to_string(),
                method: method.to_string(),
                count: queue.len(),
                last_seq: queue.last().map_or(0, |i| i.seq),
            });
        };

        *cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    fn spawn_interaction(seq: u64, command: &str) -> Interaction {
        Interaction {
            seq,
            port: "process".into(),
            method: "spawn".into(),
            input: json!({"command": command}),
            output: json!({"exit_code": seq}),
        }
    }

    #[test]
    fn replays_interactions_in_order() {
        let cassette = make_cassette(vec![
            spawn_interaction(0, "first"),
            Interaction {
                seq: 1,
                port: "other".into(),
                method: "call".into(),
                input: json!({}),
                output: json!("x"),
            },
            spawn_interaction(2, "second"),
        ]);

        let mut replayer = CassetteReplayer::new(&cassette);

        let i1 = replayer.next_interaction("process", "spawn").unwrap();
        assert_eq!(i1.input, json!({"command": "first"}));

        let i2 = replayer.next_interaction("other", "call").unwrap();
        assert_eq!(i2.seq, 1);

        let i3 = replayer.next_interaction("process", "spawn").unwrap();
        assert_eq!(i3.input, json!({"command": "second"}));
    }

    #[test]
    fn exhausted_replayer_reports_descriptive_error() {
        let cassette = make_cassette(vec![spawn_interaction(0, "only")]);

        let mut replayer = CassetteReplayer::new(&cassette);
        assert!(replayer.next_interaction("process", "spawn").is_ok());

        let err = replayer.next_interaction("process", "spawn").unwrap_err();
        assert!(matches!(err, ReplayError::Exhausted { count: 1, last_seq: 0, .. }));
        assert!(err.to_string().contains("Cassette exhausted"));
    }

    #[test]
    fn unknown_port_lists_available_pairs() {
        let cassette = make_cassette(vec![spawn_interaction(0, "x")]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let err = replayer.next_interaction("unknown", "method").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no interactions recorded"));
        assert!(message.contains("process::spawn"));
    }

    #[test]
    fn load_reads_cassette_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("process.cassette.yaml");
        let yaml = serde_yaml::to_string(&make_cassette(vec![spawn_interaction(0, "x")])).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let mut replayer = CassetteReplayer::load(&path).unwrap();
        assert_eq!(replayer.next_interaction("process", "spawn").unwrap().seq, 0);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(CassetteReplayer::load(&missing), Err(ReplayError::Read { .. })));

        let malformed = dir.path().join("bad.yaml");
        std::fs::write(&malformed, "name: [unterminated").unwrap();
        assert!(matches!(CassetteReplayer::load(&malformed), Err(ReplayError::Parse { .. })));
    }
}
