//! Process spawner port for running shell commands as child processes.

use std::path::PathBuf;

use tokio::sync::oneshot;

/// Shell used to interpret a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProgram {
    /// Program to execute (e.g. `sh`).
    pub program: String,
    /// Flag that makes the program read the command from the next argument
    /// (e.g. `-c`, or `/d /s /c` for `cmd`).
    pub arg: String,
}

impl ShellProgram {
    /// Argument string for shells that parse their own command line.
    ///
    /// `cmd.exe` does not follow the MSVC quoting rules, so the command is
    /// wrapped in one pair of quotes and passed verbatim. With `/s`, `cmd`
    /// strips exactly that pair and runs the rest unchanged.
    #[must_use]
    pub fn raw_command_line(&self, command: &str) -> String {
        format!("{} \"{command}\"", self.arg)
    }
}

impl Default for ShellProgram {
    #[cfg(windows)]
    fn default() -> Self {
        Self { program: "cmd".into(), arg: "/d /s /c".into() }
    }

    #[cfg(not(windows))]
    fn default() -> Self {
        Self { program: "sh".into(), arg: "-c".into() }
    }
}

/// Everything a spawner needs to start one child process.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    /// Command line, passed to the shell as-is.
    pub command: String,
    /// Working directory of the child.
    pub cwd: PathBuf,
    /// Shell that interprets `command`.
    pub shell: ShellProgram,
}

/// A failure reported by the spawn layer, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFailure {
    /// One-line plain-text summary.
    pub summary: String,
    /// Undecoded diagnostic bytes, usually the child's stderr.
    pub detail: Vec<u8>,
}

impl RawFailure {
    /// Creates a failure from its two parts.
    pub fn new(summary: impl Into<String>, detail: impl Into<Vec<u8>>) -> Self {
        Self { summary: summary.into(), detail: detail.into() }
    }

    /// Splits a single raw message of the form `<summary>\n<bytes>`.
    ///
    /// Only for sources that cannot carry the two parts separately. The
    /// summary line is assumed to be ASCII-compatible text.
    #[must_use]
    pub fn from_message(raw: &[u8]) -> Self {
        match raw.iter().position(|&b| b == b'\n') {
            Some(pos) => Self {
                summary: String::from_utf8_lossy(&raw[..pos]).into_owned(),
                detail: raw[pos + 1..].to_vec(),
            },
            None => Self { summary: String::from_utf8_lossy(raw).into_owned(), detail: Vec::new() },
        }
    }
}

/// Payload of the termination event: raw streams plus an optional failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Termination {
    /// Captured standard output bytes.
    pub stdout: Vec<u8>,
    /// Captured standard error bytes.
    pub stderr: Vec<u8>,
    /// Set when the process could not run or terminated unsuccessfully.
    pub failure: Option<RawFailure>,
}

/// Receiving side of a spawned process: two independent completion events.
///
/// The exit code and the termination payload arrive on separate channels
/// and in no guaranteed order. A dropped exit sender means no exit code
/// was observed.
#[derive(Debug)]
pub struct ProcessHandle {
    /// Resolves with the captured output once the streams are closed.
    pub termination: oneshot::Receiver<Termination>,
    /// Resolves with the numeric exit code, if the process reported one.
    pub exit: oneshot::Receiver<i32>,
}

/// Sending side paired with a [`ProcessHandle`].
#[derive(Debug)]
pub struct ProcessSignals {
    termination: oneshot::Sender<Termination>,
    exit: Option<oneshot::Sender<i32>>,
}

impl ProcessHandle {
    /// Creates a connected signals/handle pair.
    #[must_use]
    pub fn channel() -> (ProcessSignals, ProcessHandle) {
        let (termination_tx, termination_rx) = oneshot::channel();
        let (exit_tx, exit_rx) = oneshot::channel();
        (
            ProcessSignals { termination: termination_tx, exit: Some(exit_tx) },
            ProcessHandle { termination: termination_rx, exit: exit_rx },
        )
    }

    /// Creates a handle whose events have already fired.
    #[must_use]
    pub fn completed(termination: Termination, exit_code: Option<i32>) -> Self {
        let (mut signals, handle) = Self::channel();
        if let Some(code) = exit_code {
            signals.exit(code);
        }
        signals.terminate(termination);
        handle
    }
}

impl ProcessSignals {
    /// Fires the exit-code event. Later calls are ignored.
    pub fn exit(&mut self, code: i32) {
        if let Some(tx) = self.exit.take() {
            // The receiver may already be gone; nothing waits for the code then.
            let _ = tx.send(code);
        }
    }

    /// Fires the termination event, consuming the signals.
    ///
    /// An exit event that never fired is dropped, which the receiver
    /// observes as "no exit code".
    pub fn terminate(self, termination: Termination) {
        let _ = self.termination.send(termination);
    }
}

/// Starts child processes.
///
/// Abstracting process creation lets the runner be driven by live OS
/// processes, by a recording wrapper, or by a replayed cassette.
pub trait ProcessSpawner: Send + Sync {
    /// Starts `request` and returns the handle its two events arrive on.
    ///
    /// Spawn errors are not returned here; they are delivered as a
    /// [`Termination`] carrying a [`RawFailure`].
    fn spawn(&self, request: &SpawnRequest) -> ProcessHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_command_line_quotes_the_whole_command_once() {
        let cmd = ShellProgram { program: "cmd".into(), arg: "/d /s /c".into() };
        assert_eq!(
            cmd.raw_command_line(r#"echo "a b" & dir "C:\Program Files""#),
            r#"/d /s /c "echo "a b" & dir "C:\Program Files"""#
        );
    }

    #[test]
    fn from_message_splits_at_first_newline() {
        let failure = RawFailure::from_message(b"Command failed: ls\n\x82\xb1\nsecond");
        assert_eq!(failure.summary, "Command failed: ls");
        assert_eq!(failure.detail, b"\x82\xb1\nsecond");
    }

    #[test]
    fn from_message_without_newline_has_empty_detail() {
        let failure = RawFailure::from_message(b"spawn sh ENOENT");
        assert_eq!(failure.summary, "spawn sh ENOENT");
        assert!(failure.detail.is_empty());
    }

    #[tokio::test]
    async fn completed_handle_delivers_both_events() {
        let termination = Termination { stdout: b"hi".to_vec(), ..Termination::default() };
        let handle = ProcessHandle::completed(termination.clone(), Some(3));
        assert_eq!(handle.exit.await, Ok(3));
        assert_eq!(handle.termination.await, Ok(termination));
    }

    #[tokio::test]
    async fn missing_exit_code_closes_the_channel() {
        let handle = ProcessHandle::completed(Termination::default(), None);
        assert!(handle.exit.await.is_err());
        assert!(handle.termination.await.is_ok());
    }

    #[tokio::test]
    async fn exit_fires_only_once() {
        let (mut signals, handle) = ProcessHandle::channel();
        signals.exit(1);
        signals.exit(2);
        signals.terminate(Termination::default());
        assert_eq!(handle.exit.await, Ok(1));
    }
}
