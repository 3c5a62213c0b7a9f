use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    problem, solution, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthenticatedUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum SolutionAcceptError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "problem not found")]
    ProblemNotFound,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "solution not found")]
    SolutionNotFound,
}

#[derive(Serialize)]
pub(super) struct SolutionAcceptResponse {
    /// Identifier of the currently accepted solution.
    accepted_solution_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// Mark a solution as the accepted one.
///
/// Only the problem author is able to accept solutions, requests of
/// other users are ignored.
pub(super) async fn accept(
    Path((problem_id, solution_id)): Path<(i64, i64)>,
    Extension(current_user): Extension<AuthenticatedUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<SolutionAcceptResponse>, SolutionAcceptError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let author_id: i64 = problem::Entity::find_by_id(problem_id)
                .select_only()
                .column(problem::Column::AuthorId)
                .into_tuple()
                .one(txn)
                .await?
                .ok_or(SolutionAcceptError::ProblemNotFound)?;

            if author_id != current_user.id() {
                let accepted_solution_id = solution::Entity::find()
                    .select_only()
                    .column(solution::Column::Id)
                    .filter(solution::Column::ProblemId.eq(problem_id))
                    .filter(solution::Column::IsAccepted.eq(true))
                    .into_tuple::<i64>()
                    .one(txn)
                    .await?;

                return Ok(Json(SolutionAcceptResponse {
                    accepted_solution_id,
                    message: None,
                }));
            }

            let solution_exists = solution::Entity::find_by_id(solution_id)
                .select_only()
                .filter(solution::Column::ProblemId.eq(problem_id))
                .exists(txn)
                .await?;

            if !solution_exists {
                return Err(SolutionAcceptError::SolutionNotFound);
            }

            solution::accept(txn, problem_id, solution_id).await?;

            info!(problem_id, solution_id, "solution accepted");

            Ok(Json(SolutionAcceptResponse {
                accepted_solution_id: Some(solution_id),
                message: Some("Solution marked as accepted"),
            }))
        })
    })
    .await
    .into_raw_result()
}
