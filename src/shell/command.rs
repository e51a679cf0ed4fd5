//! Subprocess execution.
//!
//! The managed binary is always invoked directly (no intermediate shell) with
//! its stdout and stderr captured. Every invocation can carry a timeout; a
//! child that outlives it is killed and reported as a failure.

use crate::error::Result;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled while waiting for it to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long to keep reading output once the child itself has exited.
///
/// A grandchild that inherited the pipes can hold them open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timeout).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            success: true,
            timed_out: false,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            success: false,
            timed_out: false,
        }
    }

    /// Stdout followed by stderr, trimmed, for diagnostics.
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Maximum run time (None = wait indefinitely).
    pub timeout: Option<Duration>,
}

impl CommandOptions {
    /// Options with only a timeout set.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Run `program` with `args`, capturing its output.
///
/// Returns `Err` only if the process could not be spawned or waited on. A
/// non-zero exit or a timeout is reported through [`CommandResult`].
pub fn execute(program: &Path, args: &[&str], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Running {} {}", program.display(), args.join(" "));

    let mut child = cmd.spawn()?;

    let stdout_rx = child.stdout.take().map(drain);
    let stderr_rx = child.stderr.take().map(drain);

    let (status, timed_out) = wait_with_timeout(&mut child, options.timeout)?;

    // Both drains share one grace window after the child is gone.
    let drain_deadline = Instant::now() + DRAIN_GRACE;
    let stdout = collect(stdout_rx, drain_deadline);
    let stderr = collect(stderr_rx, drain_deadline);

    if timed_out {
        tracing::warn!(
            "{} {} timed out after {:?}",
            program.display(),
            args.join(" "),
            start.elapsed()
        );
        let mut result = CommandResult::failure(None, stdout, stderr);
        result.timed_out = true;
        return Ok(result);
    }

    if status.success() {
        Ok(CommandResult::success(stdout, stderr))
    } else {
        Ok(CommandResult::failure(status.code(), stdout, stderr))
    }
}

/// Read `pipe` to the end on a background thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Take whatever a drain produced by `deadline`; an unfinished drain yields "".
fn collect(rx: Option<Receiver<Vec<u8>>>, deadline: Instant) -> String {
    rx.and_then(|rx| {
        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .ok()
    })
    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    .unwrap_or_default()
}

/// Wait for `child`, killing it once `timeout` elapses.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<(ExitStatus, bool)> {
    let Some(timeout) = timeout else {
        return Ok((child.wait()?, false));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            return Ok((child.wait()?, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
