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
    problem, solution, ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use tracing::info;
use validator::{Validate, ValidationErrors};

use super::ProblemResponse;
use crate::{attachments, auth::AuthenticatedUser, data, form::MultipartForm};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SolutionCreateError {
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

#[derive(Validate)]
struct SolutionForm {
    #[validate(length(min = 1, max = "solution::DESCRIPTION_MAX_LENGTH"))]
    description: String,
}

/// Propose a solution to a problem.
pub(super) async fn create(
    Path(problem_id): Path<i64>,
    Extension(current_user): Extension<AuthenticatedUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProblemResponse>), SolutionCreateError> {
    let mut form = MultipartForm::read::<SolutionCreateError>(multipart).await?;

    let request = SolutionForm {
        description: form.take("description").unwrap_or_default(),
    };
    request.validate()?;

    let uploads = form.take_files();

    let (solution_id, problem) = db
        .transaction::<_, _, SolutionCreateError>(|txn| {
            Box::pin(async move {
                let problem_exists = problem::Entity::find_by_id(problem_id)
                    .select_only()
                    .exists(txn)
                    .await?;

                if !problem_exists {
                    return Err(SolutionCreateError::ProblemNotFound);
                }

                let model = solution::ActiveModel {
                    problem_id: ActiveValue::Set(problem_id),
                    description: ActiveValue::Set(request.description),
                    author_id: ActiveValue::Set(current_user.id()),
                    created_at: ActiveValue::Set(db::now()),
                    is_accepted: ActiveValue::Set(false),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let storage = MediaStorage::new(&config.storage);
                attachments::attach::<_, SolutionCreateError>(
                    txn,
                    &storage,
                    Owner::Solution(model.id),
                    &uploads,
                )
                .await?;

                let problem = data::load_problem_details(txn, problem_id)
                    .await?
                    .ok_or(SolutionCreateError::ProblemNotFound)?;

                Ok((model.id, problem))
            })
        })
        .await
        .into_raw_result()?;

    info!(
        id = solution_id,
        problem_id,
        author = current_user.id(),
        "solution added"
    );

    Ok((
        StatusCode::CREATED,
        Json(ProblemResponse {
            problem,
            message: "Solution added successfully",
        }),
    ))
}
