use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use crate::config_store::ConfigStore;
use crate::shell::DEFAULT_SHELL;

pub(crate) const RUNTIME_SECTION: &str = "runtime";

const RUNTIME_KEYS: [&str; 3] = ["log_path", "shell", "timeout_secs"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuntimeConfig {
    pub(crate) log_path: Option<PathBuf>,
    pub(crate) shell: String,
    /// No timeout when absent: a hanging command blocks its event.
    pub(crate) timeout: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            shell: DEFAULT_SHELL.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct LoadedRuntime {
    pub(crate) config: RuntimeConfig,
    pub(crate) warnings: Vec<String>,
}

pub(crate) fn load_runtime_config(store: &ConfigStore) -> Result<LoadedRuntime, String> {
    let warnings = unknown_runtime_keys(store);
    emit_unknown_key_warnings(&warnings);

    let mut config = RuntimeConfig::default();
    if let Some(value) = store.get(RUNTIME_SECTION, "log_path") {
        config.log_path = Some(PathBuf::from(require_non_empty(value, "runtime.log_path")?));
    }
    if let Some(value) = store.get(RUNTIME_SECTION, "shell") {
        config.shell = require_non_empty(value, "runtime.shell")?.to_string();
    }
    if let Some(value) = store.get(RUNTIME_SECTION, "timeout_secs") {
        config.timeout = Some(parse_timeout(value)?);
    }

    Ok(LoadedRuntime { config, warnings })
}

fn emit_unknown_key_warnings(keys: &[String]) {
    for key in keys {
        eprintln!("Warning: unknown config key: {}", key);
    }
}

fn unknown_runtime_keys(store: &ConfigStore) -> Vec<String> {
    store
        .options(RUNTIME_SECTION)
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| !RUNTIME_KEYS.contains(key))
        .map(|key| format!("{}.{}", RUNTIME_SECTION, key))
        .collect()
}

fn require_non_empty<'a>(value: &'a str, label: &str) -> Result<&'a str, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} must not be empty", label));
    }
    Ok(trimmed)
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs = value
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| {
            format!(
                "runtime.timeout_secs must be a positive integer (got {}).",
                value
            )
        })?;
    Ok(Duration::from_secs(secs.get()))
}
