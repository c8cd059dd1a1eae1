//! Recording adapters that capture interactions to cassettes.

pub mod process;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;

pub use process::RecordingProcessSpawner;

/// Record one interaction, logging instead of failing when the values
/// cannot be serialized.
pub(crate) fn record_interaction<I, O>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let mut guard = recorder.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(err) = guard.record_serialized(port, method, input, output) {
        warn!(port, method, error = %err, "failed to record interaction");
    }
}
