/// Solution acceptance route.
mod accept;

/// Problem creation route.
mod create;

/// Problem details route.
mod details;

/// Problem editing routes.
mod edit;

/// Problem form shared by creation and editing.
pub(crate) mod form;

/// Problem list and search route.
mod list;

/// Solution submission route.
mod solution;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;
use serde::Serialize;

use crate::{auth, data::ProblemDetailsData};

/// Problem details along with a message for the user.
#[derive(Serialize)]
pub(super) struct ProblemResponse {
    problem: ProblemDetailsData,
    message: &'static str,
}

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    let public_routes = Router::new()
        .route("/", get(list::list))
        .route("/problem/:id/", get(details::details));

    let protected_routes = Router::new()
        .route("/problem/create/", post(create::create))
        .route("/problem/:id/", post(solution::create))
        .route("/problem/:id/accept/:solution_id/", post(accept::accept))
        .route_layer(from_fn_with_state(
            database.clone(),
            auth::require_authentication::<false, false, _>,
        ));

    let staff_routes = Router::new()
        .route("/problem/:id/edit/", get(edit::form).post(edit::edit))
        .route_layer(from_fn_with_state(
            database,
            auth::require_authentication::<true, false, _>,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(staff_routes)
}
