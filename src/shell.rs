use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

pub(crate) const DEFAULT_SHELL: &str = "sh";

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// How long to keep reading pipes after the shell exits, in case a background child holds them.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandOutput {
    /// `None` when the process was killed by a signal or by the timeout.
    pub(crate) exit_code: Option<i32>,
    pub(crate) timed_out: bool,
    /// stdout and stderr, interleaved in arrival order.
    pub(crate) output: String,
}

impl CommandOutput {
    pub(crate) fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs one command string through a shell and waits for it.
///
/// `Err` means the process could not be started or waited on at all.
pub(crate) trait CommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, String>;
}

#[derive(Debug, Clone)]
pub(crate) struct ShellRunner {
    shell: String,
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub(crate) fn new(shell: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, String> {
        let mut shell = Command::new(&self.shell);
        shell
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // The shell leads a fresh process group so a timeout reaches its subshells too.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            shell.process_group(0);
        }
        let mut child = shell
            .spawn()
            .map_err(|err| {
                format!(
                    "Failed to run command '{}' with {}: {}",
                    command, self.shell, err
                )
            })?;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        if let Some(stdout) = child.stdout.take() {
            forward_pipe(stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_pipe(stderr, tx.clone());
        }
        drop(tx);

        let deadline = self.timeout.map(|limit| Instant::now() + limit);
        let mut captured = Vec::new();
        let mut pipes_open = true;

        let status = loop {
            if pipes_open {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok(chunk) => captured.extend_from_slice(&chunk),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => pipes_open = false,
                }
            } else {
                thread::sleep(POLL_INTERVAL);
            }

            let polled = child
                .try_wait()
                .map_err(|err| format!("Failed to wait for command '{}': {}", command, err))?;
            if let Some(status) = polled {
                break Some(status);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                kill_process_group(&mut child);
                let _ = child.wait();
                break None;
            }
        };

        match status {
            Some(status) => {
                while let Ok(chunk) = rx.recv_timeout(DRAIN_GRACE) {
                    captured.extend_from_slice(&chunk);
                }
                Ok(CommandOutput {
                    exit_code: status.code(),
                    timed_out: false,
                    output: String::from_utf8_lossy(&captured).to_string(),
                })
            }
            None => {
                captured.extend(rx.try_iter().flatten());
                Ok(CommandOutput {
                    exit_code: None,
                    timed_out: true,
                    output: String::from_utf8_lossy(&captured).to_string(),
                })
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: signalling a process group we created; no memory is shared with the callee.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

fn forward_pipe<R: Read + Send + 'static>(mut reader: R, tx: Sender<Vec<u8>>) {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });
}
