use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Which configured command a lifecycle event runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub(crate) enum CommandSlot {
    Start,
    Stop,
    Finish,
}

impl CommandSlot {
    pub(crate) const ALL: [CommandSlot; 3] = [Self::Start, Self::Stop, Self::Finish];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Finish => "finish",
        }
    }

    /// Option key inside the `exec_plugin` config section.
    pub(crate) fn option_name(self) -> &'static str {
        match self {
            Self::Start => "start_command",
            Self::Stop => "stop_command",
            Self::Finish => "finish_command",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Start => 0,
            Self::Stop => 1,
            Self::Finish => 2,
        }
    }
}

impl fmt::Display for CommandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub(crate) enum LifecycleEvent {
    #[value(alias = "started")]
    Start,
    #[value(aliases = ["stopped", "interrupted"])]
    Stop,
    #[value(aliases = ["finished", "ended"])]
    Finish,
}

impl LifecycleEvent {
    pub(crate) const ALL: [LifecycleEvent; 3] = [Self::Start, Self::Stop, Self::Finish];

    /// Canonical name substituted for `$event`.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Finish => "finish",
        }
    }

    pub(crate) fn slot(self) -> CommandSlot {
        match self {
            Self::Start => CommandSlot::Start,
            Self::Stop => CommandSlot::Stop,
            Self::Finish => CommandSlot::Finish,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum SessionType {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pomodoro => "POMODORO",
            Self::ShortBreak => "SHORT_BREAK",
            Self::LongBreak => "LONG_BREAK",
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "POMODORO" => Ok(Self::Pomodoro),
            "SHORT_BREAK" => Ok(Self::ShortBreak),
            "LONG_BREAK" => Ok(Self::LongBreak),
            _ => Err(format!(
                "unknown session type {:?} (expected POMODORO, SHORT_BREAK or LONG_BREAK)",
                value
            )),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata delivered with a lifecycle event. Read-only to the hooks.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct SessionPayload {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) session_type: SessionType,
    /// Session length in seconds.
    #[serde(default)]
    pub(crate) duration: u64,
    /// Completed work intervals so far.
    #[serde(default)]
    pub(crate) pomodoros: u32,
}

impl SessionPayload {
    pub(crate) fn from_json_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read payload {}: {}", path.display(), err))?;
        let mut deserializer = serde_json::Deserializer::from_str(&content);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            format!(
                "Failed to parse payload {} at {}: {}",
                path.display(),
                err.path(),
                err.inner()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn events_map_to_matching_slots() {
        for event in LifecycleEvent::ALL {
            assert_eq!(event.as_str(), event.slot().as_str());
        }
        assert_eq!(CommandSlot::Stop.option_name(), "stop_command");
    }

    #[test]
    fn slot_indices_follow_declaration_order() {
        for (position, slot) in CommandSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), position);
        }
    }

    #[test]
    fn session_type_parses_loose_spellings() {
        assert_eq!("pomodoro".parse::<SessionType>(), Ok(SessionType::Pomodoro));
        assert_eq!(
            "short-break".parse::<SessionType>(),
            Ok(SessionType::ShortBreak)
        );
        assert_eq!("LONG_BREAK".parse::<SessionType>(), Ok(SessionType::LongBreak));
        let err = "nap".parse::<SessionType>().expect_err("unknown type");
        assert!(err.contains("nap"), "error should echo input, got: {err}");
    }

    #[test]
    fn payload_loads_from_json_with_defaults() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), r#"{"type": "SHORT_BREAK", "duration": 300}"#)
            .expect("write payload");
        let payload = SessionPayload::from_json_file(file.path()).expect("payload");
        assert_eq!(payload.session_type, SessionType::ShortBreak);
        assert_eq!(payload.duration, 300);
        assert_eq!(payload.pomodoros, 0);
        assert!(payload.id.is_empty());
    }

    #[test]
    fn payload_error_names_field_path() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), r#"{"type": "POMODORO", "pomodoros": "many"}"#)
            .expect("write payload");
        let err = SessionPayload::from_json_file(file.path()).expect_err("bad payload");
        assert!(err.contains("pomodoros"), "error should name field, got: {err}");
    }
}
