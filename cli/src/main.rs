mod cli;
mod commands;
mod config;
mod daemon;
mod logging;
mod modules;
mod monitor;
mod prefs;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);
    let stderr_logging = || logging::init(config.log_level, LogMode::Stderr, log_level_override);

    match cli.command {
        Some(Commands::Daemon { command }) => {
            commands::daemon::run(command, config.log_level, log_level_override)
        }
        Some(Commands::Run { once }) => {
            let _guard = stderr_logging();
            commands::run::run(once)
        }
        Some(Commands::Data { key, json }) => {
            let _guard = stderr_logging();
            commands::data::run(key, json)
        }
        Some(Commands::Modules { command }) => {
            let _guard = stderr_logging();
            commands::modules::run(command)
        }
        Some(Commands::Unlock) => {
            let _guard = stderr_logging();
            commands::unlock::run()
        }
        Some(Commands::Config {
            command,
            path,
            reset,
        }) => {
            let _guard = stderr_logging();
            commands::config::run(command, path, reset)
        }
        Some(Commands::Logs { lines, follow }) => commands::logs::run(lines, follow),
        Some(Commands::Status) | None => {
            let _guard = stderr_logging();
            commands::status::run()
        }
    }
}
