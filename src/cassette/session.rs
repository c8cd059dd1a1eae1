//! Recording session owning the cassette recorder for a CLI run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;

use super::recorder::CassetteRecorder;

/// File name of the process cassette inside a session directory.
pub const PROCESS_CASSETTE: &str = "process.cassette.yaml";

/// Manages the recorder for one recording session.
///
/// Cassettes are stored in a timestamped directory below the session root.
pub struct RecordingSession {
    /// Recorder for process interactions.
    pub process: Arc<Mutex<CassetteRecorder>>,
    /// Output directory containing the cassette files.
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session at `<root>/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cassette directory already exists
    /// - The directory cannot be created
    pub fn new(root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }

        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let commit = get_commit_hash();
        let recorder = CassetteRecorder::new(
            output_dir.join(PROCESS_CASSETTE),
            format!("{timestamp}-process"),
            commit,
        );

        Ok(Self { process: Arc::new(Mutex::new(recorder)), output_dir })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Finish the recorder and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a recording adapter still holds the recorder or
    /// the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.process)
            .map_err(|_| "Recording adapter for process still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock for process poisoned: {e}"))?;
        recorder.finish().map_err(|e| e.to_string())?;

        Ok(self.output_dir)
    }
}

/// Get the current git commit hash, or "unknown" with a warning if unavailable.
fn get_commit_hash() -> String {
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string());

    if let Some(h) = hash {
        h
    } else {
        warn!("could not get git commit hash, using 'unknown'");
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_creates_output_directory_and_finishes() {
        let root = tempfile::tempdir().unwrap();
        let session = RecordingSession::new(root.path()).expect("session should start");

        let dir = session.output_dir().to_path_buf();
        assert!(dir.exists(), "Output directory should exist after new()");
        assert!(dir.starts_with(root.path()));

        let finished = session.finish().expect("finish should succeed");
        assert_eq!(finished, dir);
        assert!(dir.join(PROCESS_CASSETTE).exists());
    }

    #[test]
    fn finish_fails_while_recorder_is_shared() {
        let root = tempfile::tempdir().unwrap();
        let session = RecordingSession::new(root.path()).unwrap();
        let _held = Arc::clone(&session.process);

        let err = session.finish().unwrap_err();
        assert!(err.contains("still has references"));
    }

    #[test]
    fn get_commit_hash_returns_string() {
        assert!(!get_commit_hash().is_empty());
    }
}
