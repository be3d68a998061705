//! Script execution.

use crate::error::{Result, ShellStepError};
use crate::shell::output::{OutputLine, OutputSink};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Options for script execution.
#[derive(Debug, Clone)]
pub struct ScriptOptions {
    /// Shell binary; the script path is its only argument.
    pub interpreter: String,

    /// Working directory.
    pub cwd: PathBuf,

    /// Environment variables (merged over the inherited environment).
    pub env: BTreeMap<String, String>,
}

/// Result of executing a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Terminating signal, if any.
    pub signal: Option<i32>,

    /// Whether the run was stopped through a [`KillHandle`].
    pub interrupted: bool,

    /// Execution duration.
    pub duration: Duration,
}

impl ScriptResult {
    fn from_status(status: ExitStatus, interrupted: bool, duration: Duration) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self {
            exit_code: status.code(),
            signal,
            interrupted,
            duration,
        }
    }

    /// Whether the script exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.interrupted
    }

    /// Failure detail for the step result, `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        if self.success() {
            return None;
        }
        let detail = match (self.exit_code, self.signal) {
            _ if self.interrupted => "interrupted".to_string(),
            (Some(code), _) => format!("exit code {}", code),
            (None, Some(signal)) => format!("terminated by signal {}", signal),
            (None, None) => "terminated abnormally".to_string(),
        };
        Some(format!("Script failed to run: {}", detail))
    }
}

#[derive(Debug, Default)]
struct ChildSlot {
    child: Option<Child>,
    killed: bool,
}

/// Stops one running script from another thread.
///
/// A handle belongs to a single script run: create a fresh one per run. A
/// kill requested before the script starts stops it as soon as it is
/// spawned. On unix the script runs in its own process group and the whole
/// group is killed, so commands the script started die with it.
#[derive(Debug, Clone, Default)]
pub struct KillHandle {
    slot: Arc<Mutex<ChildSlot>>,
}

impl KillHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the running script. Returns whether a live process was signalled.
    pub fn kill(&self) -> bool {
        let mut slot = self.lock();
        slot.killed = true;
        match slot.child.as_mut() {
            Some(child) => kill_child(child),
            None => false,
        }
    }

    pub fn is_killed(&self) -> bool {
        self.lock().killed
    }

    fn attach(&self, mut child: Child) -> std::io::Result<()> {
        let mut slot = self.lock();
        if slot.child.is_some() {
            kill_child(&mut child);
            let _ = child.wait();
            return Err(std::io::Error::other(
                "kill handle is already attached to a running script",
            ));
        }
        if slot.killed {
            kill_child(&mut child);
        }
        slot.child = Some(child);
        Ok(())
    }

    fn try_reap(&self) -> std::io::Result<Option<ExitStatus>> {
        let mut slot = self.lock();
        let status = match slot.child.as_mut() {
            Some(child) => child.try_wait()?,
            None => return Err(std::io::Error::other("no child process attached")),
        };
        if status.is_some() {
            slot.child = None;
        }
        Ok(status)
    }

    fn lock(&self) -> MutexGuard<'_, ChildSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Kill the child's process group. The child is not yet reaped, so its pid
/// (and group id) cannot have been reused.
#[cfg(unix)]
fn kill_child(child: &mut Child) -> bool {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return child.kill().is_ok();
    };
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    rc == 0 || child.kill().is_ok()
}

#[cfg(not(unix))]
fn kill_child(child: &mut Child) -> bool {
    child.kill().is_ok()
}

/// Run `script` with `options.interpreter`, streaming output to `sink`.
///
/// Stdout and stderr are drained by two threads so a child filling both
/// pipes cannot deadlock. A non-zero exit is reported in the returned
/// [`ScriptResult`], not as an error.
///
/// # Errors
///
/// Returns `ScriptLaunch` if the interpreter cannot be started or waited on.
pub fn execute_script(
    script: &Path,
    options: &ScriptOptions,
    sink: &mut dyn OutputSink,
    kill: &KillHandle,
) -> Result<ScriptResult> {
    let start = Instant::now();
    let launch_error = |source| ShellStepError::ScriptLaunch {
        interpreter: options.interpreter.clone(),
        source,
    };

    let mut cmd = Command::new(&options.interpreter);
    cmd.arg(script)
        .current_dir(&options.cwd)
        .envs(&options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

    tracing::debug!(
        "Running {} {} in {}",
        options.interpreter,
        script.display(),
        options.cwd.display()
    );

    let mut child = cmd.spawn().map_err(launch_error)?;

    let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => (stdout, stderr),
        _ => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(launch_error(std::io::Error::other(
                "child output pipes were not captured",
            )));
        }
    };
    kill.attach(child).map_err(launch_error)?;

    let (tx, rx) = mpsc::channel();
    let stdout_handle = spawn_reader(stdout, tx.clone(), OutputLine::Stdout);
    let stderr_handle = spawn_reader(stderr, tx, OutputLine::Stderr);

    for line in rx {
        sink.line(line);
    }

    for handle in [stdout_handle, stderr_handle] {
        if let Ok(Err(e)) = handle.join() {
            tracing::warn!("Failed reading script output: {}", e);
        }
    }

    let status = loop {
        if let Some(status) = kill.try_reap().map_err(launch_error)? {
            break status;
        }
        thread::sleep(WAIT_POLL_INTERVAL);
    };

    Ok(ScriptResult::from_status(
        status,
        kill.is_killed(),
        start.elapsed(),
    ))
}

fn spawn_reader<R>(
    pipe: R,
    tx: Sender<OutputLine>,
    wrap: fn(String) -> OutputLine,
) -> thread::JoinHandle<std::io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            // Keep draining even when nobody listens, so the child never blocks.
            let _ = tx.send(wrap(line));
        }
    })
}
