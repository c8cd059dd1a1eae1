//! Integration tests for top-level CLI behavior.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::{json, Value};

fn cmdplus() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cmdplus"));
    command.env_remove("CMDPLUS_RECORD").env_remove("CMDPLUS_REPLAY").env_remove("CMDPLUS_CWD");
    command
}

fn run_cmdplus(args: &[&str]) -> std::process::Output {
    cmdplus().args(args).output().expect("failed to run cmdplus binary")
}

fn run_with_stdin(args: &[&str], input: &str) -> std::process::Output {
    let mut child = cmdplus()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run cmdplus binary");
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[cfg(unix)]
#[test]
fn run_prints_result_as_json() {
    let output = run_cmdplus(&["run", "echo hello; echo warn >&2"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!({"exitCode": 0, "stdout": "hello", "stderr": "warn"}));
}

#[cfg(unix)]
#[test]
fn run_reports_failure_on_stderr() {
    let output = run_cmdplus(&["run", "echo broken >&2; exit 3"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("Command failed: echo broken >&2; exit 3\nbroken"));
}

#[cfg(unix)]
#[test]
fn run_uses_cwd_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "").unwrap();
    let cwd = dir.path().to_str().unwrap();

    let output = run_cmdplus(&["run", "ls", "--cwd", cwd]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["stdout"], "marker.txt");
}

#[test]
fn run_rejects_unknown_encoding() {
    let output = run_cmdplus(&["run", "echo hi", "--encoding", "utf-42"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Encoding not recognized: 'utf-42'"));
}

#[test]
fn encoding_prints_canonical_name() {
    let output = run_cmdplus(&["encoding", "cp932"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Shift_JIS");
}

#[test]
fn encoding_rejects_unknown_name() {
    let output = run_cmdplus(&["encoding", "martian"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Encoding not recognized"));
}

#[cfg(unix)]
#[test]
fn batch_reads_items_from_stdin() {
    let input = r#"[{"command": "echo one"}, {"command": "echo two"}]"#;
    let output = run_with_stdin(&["batch", "--execute-once", "false"], input);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([
            {"json": {"exitCode": 0, "stdout": "one", "stderr": ""}, "pairedItem": {"item": 0}},
            {"json": {"exitCode": 0, "stdout": "two", "stderr": ""}, "pairedItem": {"item": 1}}
        ])
    );
}

#[cfg(unix)]
#[test]
fn batch_executes_once_by_default() {
    let input = r#"[{"command": "echo first"}, {"command": "echo second"}]"#;
    let output = run_with_stdin(&["batch"], input);
    assert!(output.status.success());
    let records = stdout_json(&output);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["json"]["stdout"], "first");
}

#[cfg(unix)]
#[test]
fn batch_continues_past_failures_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(&path, r#"[{"command": "exit 1"}, {}, {"encoding": "nope"}]"#).unwrap();

    let output = run_cmdplus(&[
        "batch",
        "--input",
        path.to_str().unwrap(),
        "--command",
        "echo default",
        "--execute-once",
        "false",
        "--continue-on-fail",
    ]);

    assert!(output.status.success());
    let records = stdout_json(&output);
    assert!(records[0]["json"]["error"].as_str().unwrap().starts_with("Command failed: exit 1"));
    assert_eq!(records[1]["json"]["stdout"], "default");
    assert_eq!(records[2]["json"]["error"], "Encoding not recognized: 'nope'");
    assert_eq!(records[2]["pairedItem"]["item"], 2);
}

#[cfg(unix)]
#[test]
fn batch_stops_at_first_failure() {
    let input = r#"[{"command": "echo ok"}, {"command": "exit 4"}]"#;
    let output = run_with_stdin(&["batch", "--execute-once", "false"], input);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("item 1: Command failed: exit 4"));
}

#[test]
fn batch_rejects_invalid_input() {
    let output = run_with_stdin(&["batch"], "not json");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid batch input"));
}

#[test]
fn help_lists_subcommands() {
    let output = run_cmdplus(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("run"));
    assert!(stdout.contains("batch"));
    assert!(stdout.contains("encoding"));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_cmdplus(&["frobnicate"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}
