use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    user, ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use tracing::info;

use super::EmployeeResponse;
use crate::auth::AuthenticatedUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum EmployeeToggleError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "employee not found")]
    EmployeeNotFound,

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "you can not deactivate your own account")]
    OwnAccount,
}

/// Activate an inactive account or deactivate an active one.
///
/// Deactivated accounts are unable to log in, their tokens are rejected as well.
pub(super) async fn toggle_active(
    Path(id): Path<i64>,
    Extension(current_user): Extension<AuthenticatedUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<EmployeeResponse>, EmployeeToggleError> {
    if id == current_user.id() {
        return Err(EmployeeToggleError::OwnAccount);
    }

    let model = db
        .transaction::<_, _, EmployeeToggleError>(|txn| {
            Box::pin(async move {
                let model = user::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(EmployeeToggleError::EmployeeNotFound)?;

                let is_active = !model.is_active;
                let mut model: user::ActiveModel = model.into();
                model.is_active = ActiveValue::Set(is_active);

                Ok(model.update(txn).await?)
            })
        })
        .await
        .into_raw_result()?;

    info!(id, is_active = model.is_active, "employee activity toggled");

    let message = if model.is_active {
        format!("Employee {} activated", model.username)
    } else {
        format!("Employee {} deactivated", model.username)
    };

    Ok(Json(EmployeeResponse {
        employee: model.into(),
        message,
    }))
}
