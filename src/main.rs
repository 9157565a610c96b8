use std::process::ExitCode;

mod app;
mod cli;
mod command_store;
mod config;
mod config_store;
mod dispatcher;
mod event_bus;
mod logger;
mod session;
mod settings;
mod shell;
mod template;


fn main() -> ExitCode {
    app::main()
}
