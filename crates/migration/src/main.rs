mod cli;

use std::error::Error;

use clap::Parser;
use cli::Cli;
use common::{config::Config, logging};
use migration::{
    sea_orm::{Database, DatabaseConnection},
    Migrator, MigratorTrait,
};
use sea_orm_cli::{run_migrate_generate, run_migrate_init, MigrateSubcommands};
use tracing::info;

/// Directory new migration files are generated in.
const MIGRATION_DIR: &str = "./";

/// Apply the selected command to the helpdesk database.
///
/// Without a command every pending migration is applied, so a fresh
/// database ends up with the seeded directions.
async fn apply(
    db: &DatabaseConnection,
    command: MigrateSubcommands,
) -> Result<(), Box<dyn Error>> {
    match command {
        MigrateSubcommands::Fresh => Migrator::fresh(db).await?,
        MigrateSubcommands::Refresh => Migrator::refresh(db).await?,
        MigrateSubcommands::Reset => Migrator::reset(db).await?,
        MigrateSubcommands::Status => Migrator::status(db).await?,
        MigrateSubcommands::Up { num } => Migrator::up(db, num).await?,
        MigrateSubcommands::Down { num } => Migrator::down(db, Some(num)).await?,
        MigrateSubcommands::Init => run_migrate_init(MIGRATION_DIR)?,
        MigrateSubcommands::Generate {
            migration_name,
            local_time,
            ..
        } => run_migrate_generate(MIGRATION_DIR, &migration_name, !local_time)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::new(cli.config)?;

    logging::init(&config);

    let db = Database::connect(&config.database.url).await?;
    let command = cli.command.unwrap_or(MigrateSubcommands::Up { num: None });

    apply(&db, command).await?;

    info!("migrations finished");

    Ok(())
}
