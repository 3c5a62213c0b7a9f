use std::path::PathBuf;

use clap::Parser;
use sea_orm_cli::MigrateSubcommands;

/// Helpdesk database schema manager.
#[derive(Parser)]
#[clap(version)]
pub(crate) struct Cli {
    /// Configuration file, `Config.toml` when omitted.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Defaults to applying every pending migration.
    #[clap(subcommand)]
    pub command: Option<MigrateSubcommands>,
}
