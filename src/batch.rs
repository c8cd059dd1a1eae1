//! Batch orchestration: one command execution per input item.
//!
//! Each item is a JSON value that may carry its own `command` and
//! `encoding`; missing parameters fall back to batch-level defaults. Items
//! run strictly one after another, in input order, and every output record
//! is tagged with the position of the item it came from.

use serde::Serialize;
use serde_json::Value;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::encoding::{Charset, UnknownEncoding, DEFAULT_ENCODING};
use crate::runner::{CommandRunner, ExecFailure, ExecutionResult};

/// Batch-level parameter values used when an item does not supply its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefaults {
    /// Command to run for items without a `command` field.
    pub command: Option<String>,
    /// Encoding for items without an `encoding` field.
    pub encoding: String,
}

impl Default for ParameterDefaults {
    fn default() -> Self {
        Self { command: None, encoding: DEFAULT_ENCODING.to_string() }
    }
}

/// How a batch is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Run the command once, with the first item's parameters, instead of
    /// once per item.
    pub execute_once: bool,
    /// Turn per-item failures into error records instead of aborting.
    pub continue_on_fail: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { execute_once: true, continue_on_fail: false }
    }
}

/// Parameters resolved for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemParameters {
    /// Command line to run.
    pub command: String,
    /// Encoding name of the command's output.
    pub encoding: String,
}

impl ItemParameters {
    /// Reads `command` and `encoding` from `item`, falling back to `defaults`.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter is present but not a string, or if no
    /// command is available at all.
    pub fn resolve(item: &Value, defaults: &ParameterDefaults) -> Result<Self, ItemErrorKind> {
        let command = string_field(item, "command")?
            .or_else(|| defaults.command.clone())
            .ok_or(ItemErrorKind::MissingParameter("command"))?;
        let encoding =
            string_field(item, "encoding")?.unwrap_or_else(|| defaults.encoding.clone());
        Ok(Self { command, encoding })
    }
}

fn string_field(item: &Value, name: &'static str) -> Result<Option<String>, ItemErrorKind> {
    match item.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ItemErrorKind::InvalidParameter(name)),
    }
}

/// Why a single item failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemErrorKind {
    /// Neither the item nor the defaults supply the parameter.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),
    /// The item supplies the parameter with a non-string value.
    #[error("Parameter '{0}' must be a string")]
    InvalidParameter(&'static str),
    /// The encoding name is not supported.
    #[error(transparent)]
    UnknownEncoding(#[from] UnknownEncoding),
    /// The command could not run or terminated unsuccessfully.
    #[error(transparent)]
    Execution(#[from] ExecFailure),
}

/// A failure of the item at position `index`, aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("item {index}: {kind}")]
pub struct ItemError {
    /// Position of the failing item in the input.
    pub index: usize,
    /// What went wrong.
    pub kind: ItemErrorKind,
}

/// Link from an output record back to its input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    /// Position of the input item.
    pub item: usize,
}

/// Payload of an output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordBody {
    /// The command ran successfully.
    Success {
        /// Process exit code.
        #[serde(rename = "exitCode")]
        exit_code: i32,
        /// Decoded standard output.
        stdout: String,
        /// Decoded standard error.
        stderr: String,
    },
    /// The item failed; only produced when continuing past failures.
    Error {
        /// Failure message.
        error: String,
    },
}

impl From<ExecutionResult> for RecordBody {
    fn from(result: ExecutionResult) -> Self {
        Self::Success { exit_code: result.exit_code, stdout: result.stdout, stderr: result.stderr }
    }
}

/// One output record, tagged with the originating item's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    /// Record payload.
    pub json: RecordBody,
    /// Originating item.
    #[serde(rename = "pairedItem")]
    pub paired_item: PairedItem,
}

impl OutputRecord {
    fn new(index: usize, json: RecordBody) -> Self {
        Self { json, paired_item: PairedItem { item: index } }
    }
}

/// Runs the command for one item's parameters.
///
/// # Errors
///
/// Returns an error if the encoding is unknown or the process reported a
/// failure; the failure carries its decoded message.
pub async fn run_item(
    runner: &CommandRunner<'_>,
    params: &ItemParameters,
) -> Result<ExecutionResult, ItemErrorKind> {
    let charset = Charset::resolve(&params.encoding)?;
    let mut result = runner.execute_with(&params.command, charset).await;
    match result.failure.take() {
        Some(failure) => Err(ItemErrorKind::Execution(failure)),
        None => Ok(result),
    }
}

/// Runs a whole batch and returns its output records in item order.
///
/// # Errors
///
/// Unless `options.continue_on_fail` is set, the first failing item stops
/// the batch and is returned with its position.
pub async fn run_batch(
    runner: &CommandRunner<'_>,
    items: &[Value],
    defaults: &ParameterDefaults,
    options: BatchOptions,
) -> Result<Vec<OutputRecord>, ItemError> {
    let batch_id = Uuid::new_v4();
    let span = info_span!(
        "batch",
        %batch_id,
        items = items.len(),
        execute_once = options.execute_once,
        continue_on_fail = options.continue_on_fail
    );

    async move {
        let selected = if options.execute_once { &items[..items.len().min(1)] } else { items };
        let mut records = Vec::with_capacity(selected.len());

        for (index, item) in selected.iter().enumerate() {
            let outcome = match ItemParameters::resolve(item, defaults) {
                Ok(params) => {
                    run_item(runner, &params).instrument(info_span!("item", index)).await
                }
                Err(kind) => Err(kind),
            };

            match outcome {
                Ok(result) => records.push(OutputRecord::new(index, result.into())),
                Err(kind) if options.continue_on_fail => {
                    warn!(index, error = %kind, "item failed; continuing");
                    let body = RecordBody::Error { error: kind.to_string() };
                    records.push(OutputRecord::new(index, body));
                }
                Err(kind) => {
                    warn!(index, error = %kind, "item failed; aborting batch");
                    return Err(ItemError { index, kind });
                }
            }
        }

        Ok(records)
    }
    .instrument(span)
    .await
}
