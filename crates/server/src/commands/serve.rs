use std::sync::Arc;

use axum::Server;
use common::config::Config;
use db::DatabaseConnection;
use tracing::{info, instrument};

/// Serve API requests until the server fails.
#[instrument(skip_all, err)]
pub(crate) async fn serve(config: Config, database: DatabaseConnection) -> Result<(), anyhow::Error> {
    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    let server = Server::bind(&server_config.address);
    info!(address = %server_config.address, "listening");

    server
        .serve(crate::app_router(Arc::new(database), Arc::new(config)).into_make_service())
        .await?;

    Ok(())
}
