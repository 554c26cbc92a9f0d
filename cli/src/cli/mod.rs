mod config;
mod daemon;
mod modules;

pub use config::ConfigCommands;
pub use daemon::DaemonCommands;
pub use modules::ModulesCommands;

use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the monitor in this terminal without the socket
    Run {
        /// Run the first cycle, print the report and exit
        #[arg(long)]
        once: bool,
    },

    /// Manage the background daemon
    Daemon {
        #[command(subcommand)]
        command: DaemonCommands,
    },

    /// Show the current report and recent alerts
    Status,

    /// Show the latest data points, for one module or all
    Data {
        key: Option<String>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// List modules, or enable/disable one
    #[command(alias = "mod")]
    Modules {
        #[command(subcommand)]
        command: Option<ModulesCommands>,
    },

    /// Record one screen unlock with the daemon
    Unlock,

    /// Show, locate, reset or edit the config file
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,

        #[arg(long)]
        path: bool,

        #[arg(long)]
        reset: bool,
    },

    /// Show daemon logs
    Logs {
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,

        #[arg(short, long)]
        follow: bool,
    },
}

/// Extension Box: battery, network and unlock monitoring in one status line.
#[derive(Debug, Parser)]
#[command(name = "ebox", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the configured log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}
