use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use common::{
    config::Config,
    storage::{self, FilenameError, MediaStorage, Owner},
};
use db::{
    problem, ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use tracing::info;
use validator::ValidationErrors;

use super::{form::ProblemForm, ProblemResponse};
use crate::{attachments, auth::AuthenticatedUser, data, form::MultipartForm};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ProblemEditError {
    DatabaseError(DbErr),

    StorageError(storage::Error),

    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    InvalidFilename(FilenameError),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "problem not found")]
    ProblemNotFound,
}

/// Current problem form values.
#[derive(Serialize)]
pub(super) struct ProblemFormData {
    title: String,
    description: String,
    direction: i64,
}

/// Values to pre-populate the problem edit form with.
pub(super) async fn form(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<ProblemFormData>, ProblemEditError> {
    let model = problem::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(ProblemEditError::ProblemNotFound)?;

    Ok(Json(ProblemFormData {
        title: model.title,
        description: model.description,
        direction: model.direction_id,
    }))
}

/// Update problem fields and append new attachments.
///
/// Previously uploaded files are kept.
pub(super) async fn edit(
    Path(id): Path<i64>,
    Extension(current_user): Extension<AuthenticatedUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    multipart: Multipart,
) -> Result<Json<ProblemResponse>, ProblemEditError> {
    let mut form = MultipartForm::read::<ProblemEditError>(multipart).await?;
    let request = ProblemForm::from_multipart(&mut form)?;
    let uploads = form.take_files();

    let problem = db
        .transaction::<_, _, ProblemEditError>(|txn| {
            Box::pin(async move {
                let model = problem::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(ProblemEditError::ProblemNotFound)?;

                request.check_direction::<_, ProblemEditError>(txn).await?;

                let mut model: problem::ActiveModel = model.into();
                model.title = ActiveValue::Set(request.title);
                model.description = ActiveValue::Set(request.description);
                model.direction_id = ActiveValue::Set(request.direction);
                model.updated_at = ActiveValue::Set(db::now());
                model.update(txn).await?;

                let storage = MediaStorage::new(&config.storage);
                attachments::attach::<_, ProblemEditError>(
                    txn,
                    &storage,
                    Owner::Problem(id),
                    &uploads,
                )
                .await?;

                data::load_problem_details(txn, id)
                    .await?
                    .ok_or(ProblemEditError::ProblemNotFound)
            })
        })
        .await
        .into_raw_result()?;

    info!(id, editor = current_user.id(), "problem updated");

    Ok(Json(ProblemResponse {
        problem,
        message: "Problem updated successfully",
    }))
}
