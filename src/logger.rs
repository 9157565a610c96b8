use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Captured command output longer than this is cut before it reaches the log.
const MAX_LOGGED_OUTPUT: usize = 2048;

#[derive(Debug)]
pub(crate) struct Logger {
    path: Option<PathBuf>,
    mirror_stderr: bool,
    disabled: AtomicBool,
}

impl Logger {
    pub(crate) fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            mirror_stderr: false,
            disabled: AtomicBool::new(false),
        }
    }

    pub(crate) fn with_stderr_mirror(mut self, enabled: bool) -> Self {
        self.mirror_stderr = enabled;
        self
    }

    pub(crate) fn log_transition(&self, message: &str) {
        if self.path.is_none() && !self.mirror_stderr {
            return;
        }
        let ts = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let line = format!("{} {}\n", ts, sanitize_log_value(message));

        if self.mirror_stderr {
            let mut stderr = std::io::stderr().lock();
            let _ = stderr.write_all(line.as_bytes());
        }

        let Some(path) = &self.path else {
            return;
        };
        if self.disabled.load(Ordering::Relaxed) {
            return;
        }
        let mut file = match fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => file,
            Err(err) => {
                self.disable_with_warning(path, &err);
                return;
            }
        };
        if let Err(err) = file.write_all(line.as_bytes()) {
            self.disable_with_warning(path, &err);
        }
    }

    fn disable_with_warning(&self, path: &Path, err: &std::io::Error) {
        // Hooks keep running; the file sink is dropped after the first failure.
        if self
            .disabled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(
                stderr,
                "Warning: hook logging disabled log_path={} io_error={}",
                path.display(),
                err
            );
        }
    }
}

pub(crate) fn sanitize_log_value(value: &str) -> String {
    value
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Trimmed, length-capped rendering of captured command output.
pub(crate) fn output_excerpt(output: &str) -> String {
    let trimmed = output.trim_end();
    if trimmed.chars().count() <= MAX_LOGGED_OUTPUT {
        return trimmed.to_string();
    }
    let mut excerpt: String = trimmed.chars().take(MAX_LOGGED_OUTPUT).collect();
    excerpt.push_str("...");
    excerpt
}
