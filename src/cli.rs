use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::session::{CommandSlot, LifecycleEvent, SessionPayload, SessionType};

#[derive(Debug, Parser)]
#[command(
    name = "hookexec",
    about = "Run operator-configured shell commands when a timer session starts, stops or finishes.",
    long_about = "hookexec keeps one shell command per lifecycle slot (start, stop, finish) and runs it when the matching event fires.\n\nCommands may contain $event and $type, which are replaced with the event name and the session type before the command runs.",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Load configuration from PATH instead of ~/.config/hookexec.yml.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "PATH",
        help = "Load configuration from PATH instead of ~/.config/hookexec.yml."
    )]
    pub(crate) config: Option<PathBuf>,

    /// Mirror transition log lines to stderr.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Fire a lifecycle event and run its configured command.
    Fire(FireArgs),
    /// Print the command configured for a slot.
    Get { slot: CommandSlot },
    /// Store a command for a slot (blank text removes it).
    Set {
        slot: CommandSlot,
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "TEXT"
        )]
        text: Vec<String>,
    },
    /// Remove the command for a slot.
    Remove { slot: CommandSlot },
    /// Inspect or edit the per-slot enabled/text settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum SettingsCommand {
    /// Show every slot with its enabled flag and text.
    Show,
    /// Enable a slot for editing (nothing is stored until text is committed).
    Enable { slot: CommandSlot },
    /// Disable a slot, clearing its stored command.
    Disable { slot: CommandSlot },
    /// Enable a slot, replace its text and commit.
    Edit {
        slot: CommandSlot,
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "TEXT"
        )]
        text: Vec<String>,
    },
}

#[derive(Debug, Args)]
pub(crate) struct FireArgs {
    pub(crate) event: LifecycleEvent,

    #[arg(
        long = "type",
        value_name = "TYPE",
        help = "Session type: POMODORO, SHORT_BREAK or LONG_BREAK."
    )]
    pub(crate) session_type: Option<SessionType>,

    #[arg(long, value_name = "ID", requires = "session_type")]
    pub(crate) id: Option<String>,

    #[arg(long, value_name = "SECS", requires = "session_type")]
    pub(crate) duration: Option<u64>,

    #[arg(long, value_name = "N", requires = "session_type")]
    pub(crate) pomodoros: Option<u32>,

    #[arg(
        long = "payload-json",
        value_name = "FILE",
        conflicts_with = "session_type",
        help = "Read the session payload from a JSON file."
    )]
    pub(crate) payload_json: Option<PathBuf>,
}

impl FireArgs {
    pub(crate) fn payload(&self) -> Result<Option<SessionPayload>, String> {
        if let Some(path) = &self.payload_json {
            return SessionPayload::from_json_file(path).map(Some);
        }
        Ok(self.session_type.map(|session_type| SessionPayload {
            id: self.id.clone().unwrap_or_default(),
            session_type,
            duration: self.duration.unwrap_or(0),
            pomodoros: self.pomodoros.unwrap_or(0),
        }))
    }
}

pub(crate) fn join_text(words: &[String]) -> String {
    words.join(" ")
}
