use clap::Parser;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use crate::cli::{join_text, Cli, CliCommand, FireArgs, SettingsCommand};
use crate::command_store::CommandStore;
use crate::config::{load_runtime_config, RuntimeConfig};
use crate::config_store::ConfigStore;
use crate::dispatcher::HookDispatcher;
use crate::event_bus::EventBus;
use crate::logger::{sanitize_log_value, Logger};
use crate::settings::{SettingsSync, SlotSetting};
use crate::shell::ShellRunner;

const DEFAULT_CONFIG_REL: &str = ".config/hookexec.yml";

#[derive(Debug)]
pub(crate) struct Quit {
    pub(crate) code: i32,
    #[allow(dead_code)]
    pub(crate) reason: String,
}

impl Quit {
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code as u8)
    }
}

pub(crate) fn quit(logger: &Logger, reason: &str, code: i32) -> Quit {
    let sanitized = if reason.trim().is_empty() {
        "unknown".to_string()
    } else {
        sanitize_log_value(reason)
    };
    logger.log_transition(&format!("quit reason={}", sanitized));
    Quit {
        code,
        reason: reason.to_string(),
    }
}

fn fail(message: String) -> Quit {
    eprintln!("{}", message);
    Quit {
        code: 1,
        reason: message,
    }
}

fn home_dir() -> Result<PathBuf, String> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| "Missing HOME environment variable".to_string())
}

struct Runtime {
    config: RuntimeConfig,
    logger: Rc<Logger>,
    store: Rc<CommandStore>,
}

fn open_runtime(config_path: &Path, verbose: bool) -> Result<Runtime, Quit> {
    let config_store = ConfigStore::open(config_path).map_err(fail)?;
    let loaded = load_runtime_config(&config_store).map_err(fail)?;
    let logger = Rc::new(Logger::new(loaded.config.log_path.clone()).with_stderr_mirror(verbose));
    for key in &loaded.warnings {
        logger.log_transition(&format!("config unknown_key={}", key));
    }
    let store = Rc::new(CommandStore::new(config_store, Rc::clone(&logger)));
    Ok(Runtime {
        config: loaded.config,
        logger,
        store,
    })
}

fn run_fire(runtime: &Runtime, args: &FireArgs) -> Result<(), Quit> {
    let payload = args.payload().map_err(fail)?;
    let runner = ShellRunner::new(runtime.config.shell.clone(), runtime.config.timeout);
    let dispatcher = Rc::new(HookDispatcher::new(
        Rc::clone(&runtime.store),
        Box::new(runner),
        Rc::clone(&runtime.logger),
    ));

    let mut bus = EventBus::new();
    let handlers = dispatcher.activate(&mut bus);
    let results = bus.dispatch(args.event, payload.as_ref());
    HookDispatcher::deactivate(&mut bus, &handlers);

    if !results.is_empty() && results.iter().all(|ok| *ok) {
        return Ok(());
    }
    Err(quit(
        &runtime.logger,
        &format!("hook_not_successful:{}", args.event),
        1,
    ))
}

fn print_setting(record: &SlotSetting) {
    let state = if record.enabled { "enabled" } else { "disabled" };
    println!("{}\t{}\t{}", record.slot, state, record.text);
}

fn run_settings(runtime: &Runtime, command: &SettingsCommand) -> Result<(), Quit> {
    let mut settings = SettingsSync::new(Rc::clone(&runtime.store));
    match command {
        SettingsCommand::Show => {}
        SettingsCommand::Enable { slot } => {
            settings.set_enabled(*slot, true).map_err(fail)?;
            if settings.record(*slot).text.is_empty() {
                eprintln!(
                    "{} is enabled for editing; nothing is stored until text is committed (hookexec settings edit {} TEXT).",
                    slot, slot
                );
            }
        }
        SettingsCommand::Disable { slot } => {
            settings.set_enabled(*slot, false).map_err(fail)?;
        }
        SettingsCommand::Edit { slot, text } => {
            settings.set_enabled(*slot, true).map_err(fail)?;
            settings.edit_text(*slot, &join_text(text)).map_err(fail)?;
            settings.commit().map_err(fail)?;
        }
    }
    for record in settings.records() {
        print_setting(record);
    }
    Ok(())
}

pub(crate) fn run_with_cli(cli: Cli) -> Result<(), Quit> {
    let config_path = match cli.config {
        Some(path) => path,
        None => home_dir().map_err(fail)?.join(DEFAULT_CONFIG_REL),
    };
    let runtime = open_runtime(&config_path, cli.verbose)?;

    match &cli.command {
        CliCommand::Fire(args) => run_fire(&runtime, args),
        CliCommand::Get { slot } => match runtime.store.get(*slot) {
            Some(command) => {
                println!("{}", command);
                Ok(())
            }
            None => Err(fail(format!("No {} command configured.", slot))),
        },
        CliCommand::Set { slot, text } => runtime.store.set(*slot, &join_text(text)).map_err(fail),
        CliCommand::Remove { slot } => runtime.store.remove(*slot).map_err(fail),
        CliCommand::Settings(command) => run_settings(&runtime, command),
    }
}

pub(crate) fn run_with_args(args: Vec<OsString>) -> Result<(), Quit> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            // Rendered by hand so help and errors stay capturable in tests.
            eprintln!("{err}");
            return Err(Quit {
                code: err.exit_code(),
                reason: "cli_parse".to_string(),
            });
        }
    };
    run_with_cli(cli)
}

pub(crate) fn main_with_args(args: Vec<OsString>) -> ExitCode {
    match run_with_args(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(quit) => quit.exit_code(),
    }
}

pub(crate) fn main() -> ExitCode {
    main_with_args(env::args_os().collect())
}
