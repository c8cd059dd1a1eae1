//! Cassette data structures for recording and replaying interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::process::{RawFailure, Termination};

/// A single recorded interaction with an external port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (e.g. "process").
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input data sent to the port.
    pub input: serde_json::Value,
    /// Output data returned from the port.
    pub output: serde_json::Value,
}

/// A cassette containing a sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Git commit hash at recording time.
    pub commit: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

/// Recorded outcome of one `process::spawn` interaction.
///
/// Byte buffers are stored as base64 so that output in any encoding
/// survives the YAML round trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessRecord {
    /// Exit code, absent when the process reported none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Raw standard output.
    #[serde(default, with = "base64_bytes")]
    pub stdout: Vec<u8>,
    /// Raw standard error.
    #[serde(default, with = "base64_bytes")]
    pub stderr: Vec<u8>,
    /// Failure reported by the spawn layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureRecord>,
}

/// Recorded failure, either split into parts or as one raw message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FailureRecord {
    /// Summary and raw detail carried separately.
    Split {
        /// Plain-text summary line.
        summary: String,
        /// Raw detail bytes.
        #[serde(default, with = "base64_bytes")]
        detail: Vec<u8>,
    },
    /// A single `<summary>\n<bytes>` message.
    Message {
        /// The raw message bytes.
        #[serde(with = "base64_bytes")]
        message: Vec<u8>,
    },
}

impl ProcessRecord {
    /// Captures a termination and its exit code for recording.
    #[must_use]
    pub fn capture(termination: &Termination, exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            stdout: termination.stdout.clone(),
            stderr: termination.stderr.clone(),
            failure: termination.failure.as_ref().map(|failure| FailureRecord::Split {
                summary: failure.summary.clone(),
                detail: failure.detail.clone(),
            }),
        }
    }

    /// Rebuilds the termination payload this record describes.
    #[must_use]
    pub fn to_termination(&self) -> Termination {
        Termination {
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            failure: self.failure.as_ref().map(|failure| match failure {
                FailureRecord::Split { summary, detail } => {
                    RawFailure::new(summary.clone(), detail.clone())
                }
                FailureRecord::Message { message } => RawFailure::from_message(message),
            }),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}
