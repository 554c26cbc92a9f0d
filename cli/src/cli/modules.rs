use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ModulesCommands {
    Enable { key: String },

    Disable { key: String },
}
