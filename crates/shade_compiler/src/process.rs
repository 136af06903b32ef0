//! Running a child process under a wall-clock limit.

use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Minimum time allowed for the output pipes to reach end-of-file once the
/// child has exited, even if the deadline has just passed.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Captured result of a child that exited on its own.
#[derive(Debug)]
pub struct ProcessOutput {
    /// The child's exit status.
    pub status: ExitStatus,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

/// Why a bounded run did not produce a [`ProcessOutput`].
#[derive(Debug)]
pub enum RunError {
    /// The process could not be started.
    Spawn(std::io::Error),
    /// Waiting on the process failed; it has been killed.
    Wait(std::io::Error),
    /// The process exceeded its limit and has been killed.
    TimedOut,
}

/// Runs `command` to completion or until `timeout` elapses.
///
/// Stdin is closed and both output pipes are drained on helper threads so a
/// verbose child cannot block on a full pipe. On timeout the child is killed
/// and reaped before returning; it is never left running. A timeout too
/// large to represent as an instant means no limit.
///
/// Output is collected until the pipes close or the deadline passes,
/// whichever is first. A background process that inherited the pipes and
/// keeps them open therefore cannot hold the caller past the deadline; only
/// what was read by then is returned.
pub fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> Result<ProcessOutput, RunError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().map_err(RunError::Spawn)?;

    let stdout = Drain::start(child.stdout.take());
    let stderr = Drain::start(child.stderr.take());

    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child);
                return Err(RunError::Wait(e));
            }
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            terminate(&mut child);
            return Err(RunError::TimedOut);
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    Ok(ProcessOutput {
        status,
        stdout: Drain::finish(stdout, deadline),
        stderr: Drain::finish(stderr, deadline),
    })
}

fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("failed to kill child {}: {e}", child.id());
    }
    let _ = child.wait();
}

/// One output pipe being read on a helper thread.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    closed: Receiver<()>,
}

impl Drain {
    fn start<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Self> {
        let mut pipe = pipe?;
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, closed) = mpsc::channel();
        let shared = Arc::clone(&buf);
        std::thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => shared
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Some(Self { buf, closed })
    }

    /// Waits for end-of-file until `deadline` and returns what was read.
    fn finish(drain: Option<Self>, deadline: Option<Instant>) -> String {
        let Some(drain) = drain else {
            return String::new();
        };
        let closed = match deadline {
            Some(d) => {
                let wait = d.saturating_duration_since(Instant::now()).max(DRAIN_GRACE);
                drain.closed.recv_timeout(wait).is_ok()
            }
            None => drain.closed.recv().is_ok(),
        };
        if !closed {
            log::debug!("child output still open after exit, keeping partial output");
        }
        let bytes = drain.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
