//! # Helpdesk API server
//!
//! Employees register IT problems tagged with a department direction,
//! propose solutions and let problem authors accept the one that worked.
//!
//! Public routes expose the problem list, search and problem details.
//! Bearer token authentication is required to post problems and solutions,
//! staff accounts are able to edit problems, while superusers manage
//! employees and have access to the `/admin` routes.

mod attachments;
mod auth;
mod cli;
mod commands;
mod data;
mod form;
mod handlers;
mod pagination;
mod password;
mod search;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use clap::Parser;
use cli::{Cli, Command};
use common::{config::Config, logging};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let config = Config::new(cli.config)?;

    logging::init(&config);

    info!("connecting to database");
    let database = Database::connect(&config.database.url).await?;
    info!("database connection established");

    match cli.command {
        Command::Serve => commands::serve(config, database).await?,
        Command::CreateSuperuser {
            username,
            email,
            password,
        } => commands::create_superuser(database, username, email, password).await?,
    }

    Ok(())
}

fn app_router(database: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let max_upload_size = config.storage.max_upload_size;

    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::directions::routes())
        .merge(handlers::problems::routes(database.clone()))
        .merge(handlers::employees::routes(database.clone()))
        .merge(handlers::admin::routes(database.clone()))
        .merge(handlers::media::routes())
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(Extension(config))
        .with_state(database)
}
