use std::sync::Arc;

use argon2::password_hash;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    user, ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use tracing::info;
use validator::ValidationErrors;

use super::{form::EmployeeForm, EmployeeResponse};
use crate::{password, validation::ValidatedJson};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum EmployeeEditError {
    DatabaseError(DbErr),

    PasswordHashError(password_hash::Error),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "employee not found")]
    EmployeeNotFound,
}

/// Current employee form values, passwords excluded.
#[derive(Serialize)]
pub(super) struct EmployeeFormData {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_staff: bool,
}

/// Values to pre-populate the employee edit form with.
pub(super) async fn form(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<EmployeeFormData>, EmployeeEditError> {
    let model = user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(EmployeeEditError::EmployeeNotFound)?;

    Ok(Json(EmployeeFormData {
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        is_staff: model.is_staff,
    }))
}

/// Update an employee account, replacing its password.
pub(super) async fn edit(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<EmployeeForm>,
) -> Result<Json<EmployeeResponse>, EmployeeEditError> {
    let password = password::hash(&request.password1)?;

    let model = db
        .transaction::<_, _, EmployeeEditError>(|txn| {
            Box::pin(async move {
                let model = user::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(EmployeeEditError::EmployeeNotFound)?;

                request
                    .check_username::<_, EmployeeEditError>(txn, Some(id))
                    .await?;

                let mut model: user::ActiveModel = model.into();
                model.username = ActiveValue::Set(request.username);
                model.first_name = ActiveValue::Set(request.first_name);
                model.last_name = ActiveValue::Set(request.last_name);
                model.email = ActiveValue::Set(request.email);
                model.password = ActiveValue::Set(password);
                model.is_staff = ActiveValue::Set(request.is_staff);

                Ok(model.update(txn).await?)
            })
        })
        .await
        .into_raw_result()?;

    info!(id, username = %model.username, "employee updated");

    let message = format!("Employee {} updated", model.username);

    Ok(Json(EmployeeResponse {
        employee: model.into(),
        message,
    }))
}
