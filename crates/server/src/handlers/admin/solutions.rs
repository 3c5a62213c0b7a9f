use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use common::{
    config::Config,
    storage::{self, FilenameError, MediaStorage, Owner},
};
use db::{
    problem, solution, solution_file, user, ActiveModelTrait, ActiveValue, ColumnTrait,
    Condition, DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QuerySelect, RelationTrait, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationErrors};

use super::{
    count_by, created_since, id_filter, BulkActionRequest, BulkActionResponse, Page,
    UpdateResponse,
};
use crate::{
    attachments,
    data::{self, AuthorData, SolutionData},
    form::MultipartForm,
    pagination::Pagination,
    search,
    validation::{field_error, ValidatedJson},
};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AdminSolutionError {
    DatabaseError(DbErr),

    StorageError(storage::Error),

    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    InvalidFilename(FilenameError),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "solution not found")]
    SolutionNotFound,
}

#[derive(Deserialize)]
pub(super) struct SolutionListQuery {
    #[serde(default)]
    search: Option<String>,

    /// `true` or `false`, other values are ignored.
    #[serde(default)]
    accepted: Option<String>,

    #[serde(default)]
    author: Option<String>,

    /// `today`, `past_7_days`, `this_month` or `this_year`.
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Serialize)]
pub(super) struct SolutionProblem {
    id: i64,
    title: String,
}

#[derive(Serialize)]
pub(super) struct SolutionRow {
    id: i64,
    problem: SolutionProblem,
    author: AuthorData,
    created_at: i64,
    is_accepted: bool,
    files_count: u64,
}

/// List solutions, accepted first and newest first after that.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
    Query(query): Query<SolutionListQuery>,
    Query(pagination): Query<Pagination<25>>,
) -> Result<Json<Page<SolutionRow>>, AdminSolutionError> {
    let mut select = solution::display_order(
        solution::Entity::find()
            .join(JoinType::InnerJoin, solution::Relation::Problem.def())
            .join(JoinType::InnerJoin, solution::Relation::Author.def()),
    );

    if let Some(search) = search::query(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(search::contains(
                    solution::Entity,
                    solution::Column::Description,
                    search,
                ))
                .add(search::contains(problem::Entity, problem::Column::Title, search))
                .add(search::contains(user::Entity, user::Column::Username, search)),
        );
    }

    match search::query(query.accepted.as_deref()) {
        Some("true") => select = select.filter(solution::Column::IsAccepted.eq(true)),
        Some("false") => select = select.filter(solution::Column::IsAccepted.eq(false)),
        _ => {}
    }

    if let Some(author) = id_filter(query.author.as_deref()) {
        select = select.filter(solution::Column::AuthorId.eq(author));
    }

    if let Some(since) = created_since(query.created_at.as_deref(), db::now()) {
        select = select.filter(solution::Column::CreatedAt.gte(since));
    }

    let total = select.clone().count(&*db).await?;

    let solutions = select
        .limit(pagination.limit())
        .offset(pagination.offset())
        .all(&*db)
        .await?;

    let authors =
        data::load_authors(&*db, solutions.iter().map(|solution| solution.author_id)).await?;

    let problems: HashMap<i64, String> = problem::Entity::find()
        .select_only()
        .columns([problem::Column::Id, problem::Column::Title])
        .filter(problem::Column::Id.is_in(solutions.iter().map(|solution| solution.problem_id)))
        .into_tuple::<(i64, String)>()
        .all(&*db)
        .await?
        .into_iter()
        .collect();

    let files_count = count_by::<_, solution_file::Entity>(
        &*db,
        solution_file::Column::SolutionId,
        solutions.iter().map(|solution| solution.id).collect(),
    )
    .await?;

    let items = solutions
        .into_iter()
        .map(|solution| -> Result<_, DbErr> {
            let title = problems
                .get(&solution.problem_id)
                .cloned()
                .ok_or_else(|| DbErr::RecordNotFound(format!("problem {}", solution.problem_id)))?;

            Ok(SolutionRow {
                id: solution.id,
                problem: SolutionProblem {
                    id: solution.problem_id,
                    title,
                },
                author: data::author(&authors, solution.author_id)?,
                created_at: data::timestamp(solution.created_at),
                is_accepted: solution.is_accepted,
                files_count: files_count.get(&solution.id).copied().unwrap_or_default(),
            })
        })
        .collect::<Result<_, DbErr>>()?;

    Ok(Json(Page {
        items,
        total,
        page: pagination.page(),
    }))
}

#[derive(Validate)]
struct SolutionForm {
    #[validate(length(min = 1, max = "solution::DESCRIPTION_MAX_LENGTH"))]
    description: String,

    /// Missing when the flag is left as is.
    is_accepted: Option<bool>,
}

impl SolutionForm {
    fn from_multipart(form: &mut MultipartForm) -> Result<Self, ValidationErrors> {
        let is_accepted = match form.take("is_accepted").as_deref() {
            None => None,
            Some("true" | "on" | "1") => Some(true),
            Some("false" | "off" | "0" | "") => Some(false),
            Some(_) => {
                return Err(field_error(
                    "is_accepted",
                    "invalid",
                    "must be either true or false",
                ))
            }
        };

        let solution_form = SolutionForm {
            description: form.take("description").unwrap_or_default(),
            is_accepted,
        };
        solution_form.validate()?;

        Ok(solution_form)
    }
}

/// Update a solution description and acceptance, appending new attachments.
///
/// Accepting a solution clears acceptance of the other solutions of its problem.
pub(super) async fn update(
    Path(id): Path<i64>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    multipart: Multipart,
) -> Result<Json<UpdateResponse<SolutionData>>, AdminSolutionError> {
    let mut form = MultipartForm::read::<AdminSolutionError>(multipart).await?;
    let request = SolutionForm::from_multipart(&mut form)?;
    let uploads = form.take_files();

    let solution = db
        .transaction::<_, _, AdminSolutionError>(|txn| {
            Box::pin(async move {
                let model = solution::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(AdminSolutionError::SolutionNotFound)?;

                let problem_id = model.problem_id;

                let mut model: solution::ActiveModel = model.into();
                model.description = ActiveValue::Set(request.description);

                if request.is_accepted == Some(false) {
                    model.is_accepted = ActiveValue::Set(false);
                }

                model.update(txn).await?;

                if request.is_accepted == Some(true) {
                    solution::accept(txn, problem_id, id).await?;
                }

                let storage = MediaStorage::new(&config.storage);
                let paths = attachments::attach::<_, AdminSolutionError>(
                    txn,
                    &storage,
                    Owner::Solution(id),
                    &uploads,
                )
                .await?;

                let solution = data::load_solution(txn, id)
                    .await?
                    .ok_or(AdminSolutionError::SolutionNotFound)?;

                info!(id, attached = paths.len(), "solution updated from the admin panel");

                Ok(solution)
            })
        })
        .await
        .into_raw_result()?;

    Ok(Json(UpdateResponse {
        item: solution,
        message: "Solution updated successfully",
    }))
}

/// Delete the selected solutions along with their attachment records.
pub(super) async fn delete(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminSolutionError> {
    let affected = solution::Entity::delete_many()
        .filter(solution::Column::Id.is_in(request.ids))
        .exec(&*db)
        .await?
        .rows_affected;

    info!(affected, "solutions deleted");

    Ok(Json(BulkActionResponse {
        affected,
        messages: vec![format!("Deleted {affected} solutions")],
    }))
}

/// Accept every selected solution.
///
/// Other solutions of the same problems lose their accepted flag, so
/// selecting several solutions of one problem leaves the last of them accepted.
pub(super) async fn accept(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminSolutionError> {
    db.transaction::<_, _, AdminSolutionError>(|txn| {
        Box::pin(async move {
            let solutions: Vec<(i64, i64)> = solution::Entity::find()
                .select_only()
                .columns([solution::Column::Id, solution::Column::ProblemId])
                .filter(solution::Column::Id.is_in(request.ids))
                .into_tuple()
                .all(txn)
                .await?;

            for &(solution_id, problem_id) in &solutions {
                solution::accept(txn, problem_id, solution_id).await?;
            }

            let affected = solutions.len() as u64;

            info!(affected, "solutions accepted");

            Ok(Json(BulkActionResponse {
                affected,
                messages: vec![format!("Marked {affected} solutions as accepted")],
            }))
        })
    })
    .await
    .into_raw_result()
}

/// Clear the accepted flag of every selected solution.
pub(super) async fn unaccept(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminSolutionError> {
    db.transaction::<_, _, AdminSolutionError>(|txn| {
        Box::pin(async move {
            let affected = solution::Entity::find()
                .filter(solution::Column::Id.is_in(request.ids.clone()))
                .count(txn)
                .await?;

            solution::Entity::update_many()
                .col_expr(
                    solution::Column::IsAccepted,
                    db::sea_query::Expr::value(false),
                )
                .filter(solution::Column::Id.is_in(request.ids))
                .exec(txn)
                .await?;

            info!(affected, "solutions unaccepted");

            Ok(Json(BulkActionResponse {
                affected,
                messages: vec![format!("Removed acceptance from {affected} solutions")],
            }))
        })
    })
    .await
    .into_raw_result()
}
