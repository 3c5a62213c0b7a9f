/// User authentication route.
mod login;

/// Authentication token removal route.
mod logout;

use std::sync::Arc;

use axum::{routing::post, Router};
use db::DatabaseConnection;

/// Create a router that provides an API server with authentication routes.
pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/login/", post(login::login))
        .route("/logout/", post(logout::logout))
}
