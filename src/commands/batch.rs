//! `batch` command: run a command for each item of a JSON array.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::batch::{run_batch, BatchOptions, ParameterDefaults};
use crate::context::ServiceContext;

use super::print_json;

/// Arguments of the `batch` command.
#[derive(Debug, Clone)]
pub struct BatchArgs<'a> {
    /// Input file; stdin when `None` or `-`.
    pub input: Option<&'a Path>,
    /// Default command for items without one.
    pub command: Option<String>,
    /// Default encoding for items without one.
    pub encoding: String,
    /// Run only the first item.
    pub execute_once: bool,
    /// Keep going after a failing item.
    pub continue_on_fail: bool,
}

/// Read the items, run the batch and print the output records.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or if an item
/// fails while `continue_on_fail` is off.
pub async fn run(ctx: &ServiceContext, args: &BatchArgs<'_>) -> Result<(), String> {
    let text = read_input(args.input)?;
    let items = parse_items(&text)?;

    let defaults =
        ParameterDefaults { command: args.command.clone(), encoding: args.encoding.clone() };
    let options =
        BatchOptions { execute_once: args.execute_once, continue_on_fail: args.continue_on_fail };

    let records =
        run_batch(&ctx.runner(), &items, &defaults, options).await.map_err(|e| e.to_string())?;
    print_json(&records)
}

fn read_input(input: Option<&Path>) -> Result<String, String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("Failed to read stdin: {e}"))?;
            Ok(text)
        }
    }
}

/// Parse batch input: a JSON array of items, or a single object as one item.
fn parse_items(text: &str) -> Result<Vec<Value>, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("Invalid batch input: {e}"))?;
    match value {
        Value::Array(items) => Ok(items),
        item @ Value::Object(_) => Ok(vec![item]),
        _ => Err("Invalid batch input: expected a JSON array of objects".to_string()),
    }
}
