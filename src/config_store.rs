//! Section/option key-value store persisted as a YAML mapping of mappings.
//!
//! ```yaml
//! exec_plugin:
//!   start_command: notify-send "$event"
//! runtime:
//!   log_path: /tmp/hookexec.log
//! ```
//!
//! Values are kept as strings; scalar YAML numbers and booleans are read as
//! their textual form. Null sections and null options read as absent.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

type Sections = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Flag(value) => value.to_string(),
        }
    }
}

type RawSections = BTreeMap<String, Option<BTreeMap<String, Option<RawScalar>>>>;

#[derive(Debug)]
pub(crate) struct ConfigStore {
    path: PathBuf,
    sections: Sections,
}

impl ConfigStore {
    /// An empty store bound to `path`; nothing is read until [`ConfigStore::load`].
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            sections: Sections::new(),
        }
    }

    pub(crate) fn open(path: &Path) -> Result<Self, String> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Replaces the in-memory state with the file contents. A missing file is an empty store.
    pub(crate) fn load(&mut self) -> Result<(), String> {
        if !self.path.exists() {
            self.sections.clear();
            return Ok(());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|err| format!("Failed to read config {}: {}", self.path.display(), err))?;
        self.sections = parse_sections(&content)
            .map_err(|err| format!("Failed to parse config {}: {}", self.path.display(), err))?;
        Ok(())
    }

    /// Writes the store through a temp file in the same directory, then renames it into place.
    pub(crate) fn save(&self) -> Result<(), String> {
        let rendered = serde_yaml::to_string(&self.sections).map_err(|err| {
            format!(
                "Failed to serialize config {}: {}",
                self.path.display(),
                err
            )
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|err| format!("Failed to create directory {}: {}", dir.display(), err))?;

        let mut temp = NamedTempFile::new_in(&dir)
            .map_err(|err| format!("Failed to write config {}: {}", self.path.display(), err))?;
        temp.write_all(rendered.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(|err| format!("Failed to write config {}: {}", self.path.display(), err))?;
        temp.persist(&self.path).map_err(|err| {
            format!(
                "Failed to write config {}: {}",
                self.path.display(),
                err.error
            )
        })?;
        Ok(())
    }

    pub(crate) fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(option))
            .map(String::as_str)
    }

    pub(crate) fn set(&mut self, section: &str, option: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value.to_string());
    }

    /// Returns whether an option was removed. Emptied sections are dropped.
    pub(crate) fn remove(&mut self, section: &str, option: &str) -> bool {
        let Some(options) = self.sections.get_mut(section) else {
            return false;
        };
        let removed = options.remove(option).is_some();
        if options.is_empty() {
            self.sections.remove(section);
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub(crate) fn has_option(&self, section: &str, option: &str) -> bool {
        self.get(section, option).is_some()
    }

    #[cfg(test)]
    pub(crate) fn remove_section(&mut self, section: &str) -> bool {
        self.sections.remove(section).is_some()
    }

    pub(crate) fn options(&self, section: &str) -> Vec<(&str, &str)> {
        self.sections
            .get(section)
            .map(|options| {
                options
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_sections(content: &str) -> Result<Sections, String> {
    if content.trim().is_empty() {
        return Ok(Sections::new());
    }
    let value: Value = serde_yaml::from_str(content).map_err(|err| err.to_string())?;
    if value.is_null() {
        return Ok(Sections::new());
    }
    let raw: RawSections = serde_path_to_error::deserialize(value)
        .map_err(|err| format!("{}: {}", err.path(), err.inner()))?;

    let mut sections = Sections::new();
    for (name, options) in raw {
        let options: BTreeMap<String, String> = options
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value.into_text())))
            .collect();
        if !options.is_empty() {
            sections.insert(name, options);
        }
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_empty_store() {
        let temp = TempDir::new().expect("temp dir");
        let store = ConfigStore::open(&temp.path().join("absent.yml")).expect("open");
        assert!(!store.has_section("exec_plugin"));
        assert_eq!(store.get("exec_plugin", "start_command"), None);
    }

    #[test]
    fn scalars_and_nulls_are_normalized() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.yml");
        fs::write(
            &path,
            "exec_plugin:\n  start_command: echo hi\n  stop_command: ~\nruntime:\n  timeout_secs: 30\n  verbose: true\nempty:\n",
        )
        .expect("write config");

        let store = ConfigStore::open(&path).expect("open");
        assert_eq!(store.get("exec_plugin", "start_command"), Some("echo hi"));
        assert!(!store.has_option("exec_plugin", "stop_command"));
        assert_eq!(store.get("runtime", "timeout_secs"), Some("30"));
        assert_eq!(store.get("runtime", "verbose"), Some("true"));
        assert!(!store.has_section("empty"));
    }

    #[test]
    fn comment_only_file_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.yml");
        fs::write(&path, "# nothing configured yet\n").expect("write config");
        let store = ConfigStore::open(&path).expect("open");
        assert!(store.options("exec_plugin").is_empty());
    }

    #[test]
    fn parse_error_names_path_and_location() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.yml");
        fs::write(&path, "exec_plugin:\n  start_command: [1, 2]\n").expect("write config");

        let err = ConfigStore::open(&path).expect_err("list value should fail");
        assert!(
            err.contains(&path.display().to_string()),
            "error should include path, got: {err}"
        );
        assert!(
            err.contains("exec_plugin"),
            "error should include section, got: {err}"
        );
    }

    #[test]
    fn save_then_load_keeps_values() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("nested").join("config.yml");

        let mut store = ConfigStore::new(&path);
        store.set("exec_plugin", "finish_command", "echo 'done: $type'");
        store.save().expect("save");

        let reopened = ConfigStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("exec_plugin", "finish_command"),
            Some("echo 'done: $type'")
        );
    }

    #[test]
    fn remove_drops_empty_sections_and_tolerates_absence() {
        let temp = TempDir::new().expect("temp dir");
        let mut store = ConfigStore::new(&temp.path().join("config.yml"));
        assert!(!store.remove("exec_plugin", "start_command"));

        store.set("exec_plugin", "start_command", "true");
        assert!(store.remove("exec_plugin", "start_command"));
        assert!(!store.has_section("exec_plugin"));
    }

    #[test]
    fn remove_section_clears_all_options() {
        let temp = TempDir::new().expect("temp dir");
        let mut store = ConfigStore::new(&temp.path().join("config.yml"));
        store.set("exec_plugin", "start_command", "true");
        store.set("exec_plugin", "stop_command", "false");

        assert!(store.remove_section("exec_plugin"));
        assert!(!store.has_option("exec_plugin", "stop_command"));
        assert!(!store.remove_section("exec_plugin"));
    }

    #[test]
    fn load_discards_unsaved_changes() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.yml");
        let mut store = ConfigStore::new(&path);
        store.set("exec_plugin", "start_command", "echo saved");
        store.save().expect("save");

        store.set("exec_plugin", "start_command", "echo unsaved");
        store.load().expect("reload");
        assert_eq!(store.get("exec_plugin", "start_command"), Some("echo saved"));
    }
}
