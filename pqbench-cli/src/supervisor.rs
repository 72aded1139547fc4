//! Supervisor Process
//!
//! Runs one signature executable per request, bounded by a timeout, and
//! classifies how it ended.

use pqbench_core::Invocation;
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Process group of the child currently running, 0 when idle
static FOREGROUND_GROUP: AtomicI32 = AtomicI32::new(0);
static FORWARDING: Once = Once::new();

/// Errors raised while starting or waiting on a child
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The executable could not be started
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        /// Executable path
        program: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Polling the child's status failed
    #[error("Failed to wait for child: {0}")]
    WaitFailed(#[source] std::io::Error),
}

/// How a single invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Exit status 0, with the captured stdout
    Success(String),
    /// Non-zero exit status, or `code: None` when killed by a signal
    NonZeroExit {
        /// Exit code, `None` after a signal
        code: Option<i32>,
        /// Captured stderr
        stderr: String,
    },
    /// Still running when the timeout expired
    TimedOut,
    /// The executable could not be started
    LaunchFailed(String),
}

impl ExecutionOutcome {
    /// Exited with status 0
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }
}

/// Executes an invocation with a hard timeout. One attempt per call.
pub trait ProcessRunner {
    /// Run `invocation` once, killing it after `timeout`
    fn run(&self, invocation: &Invocation, timeout: Duration) -> ExecutionOutcome;
}

/// Runs invocations as child processes in their own process group
#[derive(Debug, Clone)]
pub struct ChildProcessRunner {
    grace_period: Duration,
}

impl Default for ChildProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl ChildProcessRunner {
    /// `grace_period` is the wait between SIGTERM and SIGKILL on timeout
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// Wait between SIGTERM and SIGKILL
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    fn supervise(
        &self,
        invocation: &Invocation,
        timeout: Duration,
    ) -> Result<ExecutionOutcome, SupervisorError> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        install_signal_forwarding();
        let mut child = command.spawn().map_err(|source| SupervisorError::SpawnFailed {
            program: invocation.program.display().to_string(),
            source,
        })?;
        let pid = child.id();
        let _foreground = ForegroundGroup::enter(pid);

        let stdout = Drain::spawn(child.stdout.take());
        let stderr = Drain::spawn(child.stderr.take());

        match wait_with_timeout(&mut child, timeout)? {
            Some(status) => {
                self.close_pipes(pid, &stdout, &stderr);
                Ok(classify(status, stdout.take(), stderr.take()))
            }
            None => {
                self.terminate(&mut child)?;
                Ok(ExecutionOutcome::TimedOut)
            }
        }
    }

    /// Wait for both pipes to reach EOF. A background process left behind by
    /// the child keeps them open, so after the grace period the whole group
    /// is killed.
    fn close_pipes(&self, pid: u32, stdout: &Drain, stderr: &Drain) {
        let stdout_closed = stdout.closed_within(self.grace_period);
        let stderr_closed = stderr.closed_within(self.grace_period);
        if stdout_closed && stderr_closed {
            return;
        }

        tracing::debug!(pid, "pipes still open after exit; killing process group");
        let _ = signal_group(pid, libc::SIGKILL);
        stdout.closed_within(self.grace_period);
        stderr.closed_within(self.grace_period);
    }

    /// SIGTERM the group, wait out the grace period, then SIGKILL.
    fn terminate(&self, child: &mut Child) -> Result<(), SupervisorError> {
        let pid = child.id();
        // Ignore errors: the group may already be gone
        let _ = signal_group(pid, libc::SIGTERM);

        let deadline = Instant::now() + self.grace_period;
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(_)) => {
                    let _ = signal_group(pid, libc::SIGKILL);
                    return Ok(());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(SupervisorError::WaitFailed(e)),
            }
        }

        let _ = signal_group(pid, libc::SIGKILL);
        child.wait().map_err(SupervisorError::WaitFailed)?;
        Ok(())
    }
}

impl ProcessRunner for ChildProcessRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> ExecutionOutcome {
        match self.supervise(invocation, timeout) {
            Ok(outcome) => outcome,
            Err(e) => ExecutionOutcome::LaunchFailed(e.to_string()),
        }
    }
}

/// Poll until the child exits or `timeout` elapses. `None` means timed out.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<ExitStatus>, SupervisorError> {
    let started_at = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if started_at.elapsed() >= timeout {
                    return Ok(None);
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(SupervisorError::WaitFailed(e)),
        }
    }
}

fn classify(status: ExitStatus, stdout: String, stderr: String) -> ExecutionOutcome {
    if status.success() {
        ExecutionOutcome::Success(stdout)
    } else {
        ExecutionOutcome::NonZeroExit {
            code: status.code(),
            stderr,
        }
    }
}

/// A pipe read on a helper thread into a buffer shared with the runner.
///
/// Bytes read so far stay available even if EOF never arrives.
struct Drain {
    buffer: Arc<Mutex<Vec<u8>>>,
    eof: Receiver<()>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (tx, eof) = mpsc::channel();
        if let Some(mut pipe) = pipe {
            let shared = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => match shared.lock() {
                            Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                            Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
                        },
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(_) => break,
                    }
                }
                let _ = tx.send(());
            });
        }
        Self { buffer, eof }
    }

    /// `true` once the reader has hit EOF (or there was no pipe)
    fn closed_within(&self, wait: Duration) -> bool {
        !matches!(self.eof.recv_timeout(wait), Err(RecvTimeoutError::Timeout))
    }

    fn take(&self) -> String {
        let bytes = match self.buffer.lock() {
            Ok(mut buf) => std::mem::take(&mut *buf),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Marks a child's process group as the target of forwarded signals
/// until dropped.
struct ForegroundGroup;

impl ForegroundGroup {
    fn enter(pid: u32) -> Self {
        FOREGROUND_GROUP.store(pid as i32, Ordering::SeqCst);
        ForegroundGroup
    }
}

impl Drop for ForegroundGroup {
    fn drop(&mut self) {
        FOREGROUND_GROUP.store(0, Ordering::SeqCst);
    }
}

/// The child runs in its own process group and never sees a terminal Ctrl-C.
/// SIGINT and SIGTERM are passed on to the running child's group, then the
/// harness dies of the signal as usual.
fn install_signal_forwarding() {
    FORWARDING.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = forward_signal as *const () as usize;
        sa.sa_flags = libc::SA_RESETHAND;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
        libc::sigaction(libc::SIGTERM, &sa, std::ptr::null_mut());
    });
}

/// Async-signal-safe: one atomic load, then `kill` and `raise`.
extern "C" fn forward_signal(signal: libc::c_int) {
    let group = FOREGROUND_GROUP.load(Ordering::SeqCst);
    unsafe {
        if group > 0 {
            libc::kill(-group, signal);
        }
        // SA_RESETHAND restored the default action
        libc::raise(signal);
    }
}
