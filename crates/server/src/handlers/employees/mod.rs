mod create;
mod delete;
mod edit;
mod form;
mod list;
mod toggle_active;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use db::{user, DatabaseConnection};
use serde::Serialize;

use crate::{auth, data::timestamp};

/// Employee account data.
#[derive(Serialize)]
pub(super) struct EmployeeData {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
    date_joined: i64,
}

impl From<user::Model> for EmployeeData {
    fn from(model: user::Model) -> Self {
        EmployeeData {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            is_staff: model.is_staff,
            is_active: model.is_active,
            is_superuser: model.is_superuser,
            date_joined: timestamp(model.date_joined),
        }
    }
}

/// Employee account along with a message for the user.
#[derive(Serialize)]
pub(super) struct EmployeeResponse {
    employee: EmployeeData,
    message: String,
}

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/employees/", get(list::list))
        .route("/employees/create/", post(create::create))
        .route("/employees/:id/edit/", get(edit::form).post(edit::edit))
        .route(
            "/employees/:id/delete/",
            get(delete::confirm).post(delete::delete),
        )
        .route(
            "/employees/:id/toggle-active/",
            post(toggle_active::toggle_active),
        )
        .route_layer(from_fn_with_state(
            database,
            auth::require_authentication::<false, true, _>,
        ))
}
