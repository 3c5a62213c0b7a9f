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
    direction, problem, problem_file, solution, solution_file, user, ActiveModelTrait,
    ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::ValidationErrors;

use super::{
    count_by, created_since, id_filter, BulkActionRequest, BulkActionResponse, Page,
    UpdateResponse, DATE_TIME_FORMAT,
};
use crate::{
    attachments,
    data::{self, AuthorData, FileData, ProblemData, ProblemDetailsData},
    form::MultipartForm,
    handlers::problems::form::ProblemForm,
    pagination::Pagination,
    search,
    validation::ValidatedJson,
};

/// Extensions previewed as images.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

/// Max number of characters in a solution excerpt.
const EXCERPT_LENGTH: usize = 100;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AdminProblemError {
    DatabaseError(DbErr),

    DateFormatError(time::error::Format),

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

#[derive(Deserialize)]
pub(super) struct ProblemListQuery {
    #[serde(default)]
    search: Option<String>,

    #[serde(default)]
    direction: Option<String>,

    #[serde(default)]
    author: Option<String>,

    /// `today`, `past_7_days`, `this_month` or `this_year`.
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum ProblemStatus {
    Solved,
    InProgress,
    NoSolutions,
}

#[derive(Serialize)]
pub(super) struct ProblemRow {
    #[serde(flatten)]
    problem: ProblemData,

    solutions_count: u64,
    has_accepted: bool,
    files_count: u64,
    status: ProblemStatus,
}

/// List problems with solution and attachment counters.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
    Query(query): Query<ProblemListQuery>,
    Query(pagination): Query<Pagination<25>>,
) -> Result<Json<Page<ProblemRow>>, AdminProblemError> {
    let mut select = problem::Entity::find()
        .join(JoinType::InnerJoin, problem::Relation::Author.def())
        .order_by_desc(problem::Column::CreatedAt)
        .order_by_desc(problem::Column::Id);

    if let Some(search) = search::query(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(search::contains(problem::Entity, problem::Column::Title, search))
                .add(search::contains(
                    problem::Entity,
                    problem::Column::Description,
                    search,
                ))
                .add(search::contains(user::Entity, user::Column::Username, search)),
        );
    }

    if let Some(direction) = id_filter(query.direction.as_deref()) {
        select = select.filter(problem::Column::DirectionId.eq(direction));
    }

    if let Some(author) = id_filter(query.author.as_deref()) {
        select = select.filter(problem::Column::AuthorId.eq(author));
    }

    if let Some(since) = created_since(query.created_at.as_deref(), db::now()) {
        select = select.filter(problem::Column::CreatedAt.gte(since));
    }

    let total = select.clone().count(&*db).await?;

    let rows = select
        .limit(pagination.limit())
        .offset(pagination.offset())
        .find_also_related(direction::Entity)
        .all(&*db)
        .await?;

    let problems = data::problem_list(&*db, rows).await?;
    let ids: Vec<i64> = problems.iter().map(|problem| problem.id).collect();

    let mut solutions: HashMap<i64, (u64, bool)> = HashMap::new();

    for (problem_id, is_accepted) in solution::Entity::find()
        .select_only()
        .columns([solution::Column::ProblemId, solution::Column::IsAccepted])
        .filter(solution::Column::ProblemId.is_in(ids.clone()))
        .into_tuple::<(i64, bool)>()
        .all(&*db)
        .await?
    {
        let (count, accepted) = solutions.entry(problem_id).or_default();
        *count += 1;
        *accepted |= is_accepted;
    }

    let mut files =
        count_by::<_, problem_file::Entity>(&*db, problem_file::Column::ProblemId, ids).await?;

    let items = problems
        .into_iter()
        .map(|problem| {
            let (solutions_count, has_accepted) = solutions.remove(&problem.id).unwrap_or_default();

            let status = if has_accepted {
                ProblemStatus::Solved
            } else if solutions_count > 0 {
                ProblemStatus::InProgress
            } else {
                ProblemStatus::NoSolutions
            };

            ProblemRow {
                files_count: files.remove(&problem.id).unwrap_or_default(),
                problem,
                solutions_count,
                has_accepted,
                status,
            }
        })
        .collect();

    Ok(Json(Page {
        items,
        total,
        page: pagination.page(),
    }))
}

#[derive(Serialize)]
pub(super) struct AdminFileData {
    #[serde(flatten)]
    file: FileData,

    /// `image` for pictures, upper-cased extension otherwise.
    preview: String,
}

fn preview(path: &str) -> String {
    let extension = path.rsplit('.').next().unwrap_or(path);

    if IMAGE_EXTENSIONS
        .iter()
        .any(|image| extension.eq_ignore_ascii_case(image))
    {
        String::from("image")
    } else {
        extension.to_uppercase()
    }
}

fn excerpt(description: &str) -> String {
    let mut chars = description.chars();
    let mut excerpt: String = chars.by_ref().take(EXCERPT_LENGTH).collect();

    if chars.next().is_some() {
        excerpt.push_str("...");
    }

    excerpt
}

#[derive(Serialize)]
pub(super) struct AdminSolutionData {
    id: i64,
    author: AuthorData,
    excerpt: String,

    /// Creation date, `dd.mm.YYYY HH:MM`.
    created_at: String,

    is_accepted: bool,
    files_count: u64,
}

#[derive(Serialize)]
pub(super) struct AdminProblemDetails {
    #[serde(flatten)]
    problem: ProblemData,

    files: Vec<AdminFileData>,
    solutions: Vec<AdminSolutionData>,
}

/// Problem details along with a compact solutions table.
pub(super) async fn details(
    Path(id): Path<i64>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<AdminProblemDetails>, AdminProblemError> {
    let problem = data::load_problem(&*db, id)
        .await?
        .ok_or(AdminProblemError::ProblemNotFound)?;

    let files = problem_file::Entity::find()
        .filter(problem_file::Column::ProblemId.eq(id))
        .order_by_asc(problem_file::Column::Id)
        .all(&*db)
        .await?
        .into_iter()
        .map(|file| AdminFileData {
            preview: preview(&file.file),
            file: FileData::new(file.id, &file.file, file.uploaded_at),
        })
        .collect();

    let solutions =
        solution::display_order(solution::Entity::find().filter(solution::Column::ProblemId.eq(id)))
            .all(&*db)
            .await?;

    let authors =
        data::load_authors(&*db, solutions.iter().map(|solution| solution.author_id)).await?;

    let mut files_count = count_by::<_, solution_file::Entity>(
        &*db,
        solution_file::Column::SolutionId,
        solutions.iter().map(|solution| solution.id).collect(),
    )
    .await?;

    let solutions = solutions
        .into_iter()
        .map(|solution| -> Result<_, AdminProblemError> {
            Ok(AdminSolutionData {
                id: solution.id,
                author: data::author(&authors, solution.author_id)?,
                excerpt: excerpt(&solution.description),
                created_at: solution.created_at.format(DATE_TIME_FORMAT)?,
                is_accepted: solution.is_accepted,
                files_count: files_count.remove(&solution.id).unwrap_or_default(),
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(Json(AdminProblemDetails {
        problem,
        files,
        solutions,
    }))
}

/// Update problem fields and append new attachments.
pub(super) async fn update(
    Path(id): Path<i64>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    multipart: Multipart,
) -> Result<Json<UpdateResponse<ProblemDetailsData>>, AdminProblemError> {
    let mut form = MultipartForm::read::<AdminProblemError>(multipart).await?;
    let request = ProblemForm::from_multipart(&mut form)?;
    let uploads = form.take_files();

    let problem = db
        .transaction::<_, _, AdminProblemError>(|txn| {
            Box::pin(async move {
                let model = problem::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(AdminProblemError::ProblemNotFound)?;

                request.check_direction::<_, AdminProblemError>(txn).await?;

                let mut model: problem::ActiveModel = model.into();
                model.title = ActiveValue::Set(request.title);
                model.description = ActiveValue::Set(request.description);
                model.direction_id = ActiveValue::Set(request.direction);
                model.updated_at = ActiveValue::Set(db::now());
                model.update(txn).await?;

                let storage = MediaStorage::new(&config.storage);
                let paths = attachments::attach::<_, AdminProblemError>(
                    txn,
                    &storage,
                    Owner::Problem(id),
                    &uploads,
                )
                .await?;

                let problem = data::load_problem_details(txn, id)
                    .await?
                    .ok_or(AdminProblemError::ProblemNotFound)?;

                info!(id, attached = paths.len(), "problem updated from the admin panel");

                Ok(problem)
            })
        })
        .await
        .into_raw_result()?;

    Ok(Json(UpdateResponse {
        item: problem,
        message: "Problem updated successfully",
    }))
}

/// Delete the selected problems along with their solutions and attachment records.
pub(super) async fn delete(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminProblemError> {
    let affected = problem::Entity::delete_many()
        .filter(problem::Column::Id.is_in(request.ids))
        .exec(&*db)
        .await?
        .rows_affected;

    info!(affected, "problems deleted");

    Ok(Json(BulkActionResponse {
        affected,
        messages: vec![format!("Deleted {affected} problems")],
    }))
}

/// Identifiers of the selected problems that still exist.
async fn selected<C: ConnectionTrait>(db: &C, ids: Vec<i64>) -> Result<Vec<i64>, DbErr> {
    problem::Entity::find()
        .select_only()
        .column(problem::Column::Id)
        .filter(problem::Column::Id.is_in(ids))
        .order_by_asc(problem::Column::Id)
        .into_tuple()
        .all(db)
        .await
}

/// Accept the first displayed solution of every selected problem.
pub(super) async fn mark_solved(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminProblemError> {
    db.transaction::<_, _, AdminProblemError>(|txn| {
        Box::pin(async move {
            let problems = selected(txn, request.ids).await?;

            for &problem_id in &problems {
                let first: Option<i64> = solution::display_order(
                    solution::Entity::find().filter(solution::Column::ProblemId.eq(problem_id)),
                )
                .select_only()
                .column(solution::Column::Id)
                .into_tuple()
                .one(txn)
                .await?;

                if let Some(solution_id) = first {
                    solution::accept(txn, problem_id, solution_id).await?;
                }
            }

            let affected = problems.len() as u64;

            info!(affected, "problems marked as solved");

            Ok(Json(BulkActionResponse {
                affected,
                messages: vec![format!("Marked {affected} problems as solved")],
            }))
        })
    })
    .await
    .into_raw_result()
}

/// Clear solution acceptance of every selected problem.
pub(super) async fn mark_unsolved(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminProblemError> {
    db.transaction::<_, _, AdminProblemError>(|txn| {
        Box::pin(async move {
            let problems = selected(txn, request.ids).await?;
            let affected = problems.len() as u64;

            solution::unaccept_all(txn, problems).await?;

            info!(affected, "problems marked as unsolved");

            Ok(Json(BulkActionResponse {
                affected,
                messages: vec![format!("Marked {affected} problems as unsolved")],
            }))
        })
    })
    .await
    .into_raw_result()
}

/// Delete every solution of the selected problems.
pub(super) async fn delete_solutions(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminProblemError> {
    db.transaction::<_, _, AdminProblemError>(|txn| {
        Box::pin(async move {
            let affected = solution::Entity::delete_many()
                .filter(solution::Column::ProblemId.is_in(request.ids))
                .exec(txn)
                .await?
                .rows_affected;

            info!(affected, "problem solutions deleted");

            Ok(Json(BulkActionResponse {
                affected,
                messages: vec![format!("Deleted {affected} solutions")],
            }))
        })
    })
    .await
    .into_raw_result()
}
