use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum DaemonCommands {
    /// Start the daemon (detached unless --foreground)
    Start {
        #[arg(short, long)]
        foreground: bool,
    },

    Stop,

    Status,
}
