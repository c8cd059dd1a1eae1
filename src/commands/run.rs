//! `run` command: execute one shell command.

use crate::batch::{run_item, ItemParameters, RecordBody};
use crate::context::ServiceContext;

use super::print_json;

/// Run `command`, decode its output with `encoding` and print the result.
///
/// # Errors
///
/// Returns the decoded failure message if the encoding is unknown or the
/// command fails.
pub async fn run(ctx: &ServiceContext, command: &str, encoding: &str) -> Result<(), String> {
    let params = ItemParameters { command: command.to_string(), encoding: encoding.to_string() };
    let body = execute(ctx, &params).await?;
    print_json(&body)
}

async fn execute(ctx: &ServiceContext, params: &ItemParameters) -> Result<RecordBody, String> {
    let result = run_item(&ctx.runner(), params).await.map_err(|e| e.to_string())?;
    Ok(RecordBody::from(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::testing::{failed, succeeded, ScriptedSpawner};

    fn context(spawner: ScriptedSpawner) -> ServiceContext {
        ServiceContext { spawner: Box::new(spawner), config: RunnerConfig::new("/") }
    }

    fn params(command: &str, encoding: &str) -> ItemParameters {
        ItemParameters { command: command.into(), encoding: encoding.into() }
    }

    #[tokio::test]
    async fn returns_decoded_record() {
        let ctx = context(ScriptedSpawner::new(vec![succeeded(b"hello\n")]));

        let body = execute(&ctx, &params("echo hello", "utf-8")).await.unwrap();

        assert_eq!(
            body,
            RecordBody::Success { exit_code: 0, stdout: "hello".into(), stderr: String::new() }
        );
    }

    #[tokio::test]
    async fn failure_becomes_message() {
        let ctx = context(ScriptedSpawner::new(vec![failed("false", 1, b"oops")]));

        let err = execute(&ctx, &params("false", "utf-8")).await.unwrap_err();

        assert_eq!(err, "Command failed: false\noops");
    }

    #[tokio::test]
    async fn unknown_encoding_is_reported() {
        let ctx = context(ScriptedSpawner::new(vec![]));

        let err = run(&ctx, "ls", "klingon").await.unwrap_err();

        assert_eq!(err, "Encoding not recognized: 'klingon'");
    }
}
