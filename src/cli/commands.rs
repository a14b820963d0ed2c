use clap::Subcommand;

use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Invoke one action against a fixture document
    Run(RunArgs),

    /// Print the effective configuration
    Config,
}
