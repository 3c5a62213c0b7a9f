use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{DatabaseConnection, DbErr};
use derive_more::{Display, Error, From};

use crate::data::{self, ProblemDetailsData};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ProblemDetailsError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "problem not found")]
    ProblemNotFound,
}

/// Problem details, including attachments and solutions.
pub(super) async fn details(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<ProblemDetailsData>, ProblemDetailsError> {
    data::load_problem_details(&*db, id)
        .await?
        .map(Json)
        .ok_or(ProblemDetailsError::ProblemNotFound)
}
