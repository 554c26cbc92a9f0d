use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Set a tuning value, e.g. `ebox config set net_interval 5000`
    Set {
        key: String,

        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}
