use std::sync::Arc;

use argon2::password_hash;
use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use db::{
    user, ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, TransactionErrorExt,
    TransactionTrait,
};
use derive_more::{Display, Error, From};
use tracing::info;
use validator::ValidationErrors;

use super::{form::EmployeeForm, EmployeeResponse};
use crate::{password, validation::ValidatedJson};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum EmployeeCreateError {
    DatabaseError(DbErr),

    PasswordHashError(password_hash::Error),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),
}

/// Create a new active employee account.
pub(super) async fn create(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<EmployeeForm>,
) -> Result<(StatusCode, Json<EmployeeResponse>), EmployeeCreateError> {
    let password = password::hash(&request.password1)?;

    let model = db
        .transaction::<_, _, EmployeeCreateError>(|txn| {
            Box::pin(async move {
                request
                    .check_username::<_, EmployeeCreateError>(txn, None)
                    .await?;

                let model = user::ActiveModel {
                    username: ActiveValue::Set(request.username),
                    first_name: ActiveValue::Set(request.first_name),
                    last_name: ActiveValue::Set(request.last_name),
                    email: ActiveValue::Set(request.email),
                    password: ActiveValue::Set(password),
                    is_staff: ActiveValue::Set(request.is_staff),
                    is_active: ActiveValue::Set(true),
                    is_superuser: ActiveValue::Set(false),
                    date_joined: ActiveValue::Set(db::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok(model)
            })
        })
        .await
        .into_raw_result()?;

    info!(id = model.id, username = %model.username, "employee created");

    let message = format!("Employee {} created successfully", model.username);

    Ok((
        StatusCode::CREATED,
        Json(EmployeeResponse {
            employee: model.into(),
            message,
        }),
    ))
}
