//! Response data shared between multiple handlers.

use std::collections::HashMap;

use db::{
    direction, problem, problem_file, solution, solution_file, user, ColumnTrait,
    ConnectionTrait, DbErr, EntityTrait, PrimitiveDateTime, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;

/// Convert a stored timestamp into a UNIX timestamp.
pub fn timestamp(value: PrimitiveDateTime) -> i64 {
    value.assume_utc().unix_timestamp()
}

/// Direction data.
#[derive(Serialize)]
pub struct DirectionData {
    pub id: i64,
    pub code: String,
    pub display_name: String,
}

impl From<direction::Model> for DirectionData {
    fn from(model: direction::Model) -> Self {
        DirectionData {
            id: model.id,
            code: model.code,
            display_name: model.display_name,
        }
    }
}

/// Problem or solution author data.
#[derive(Clone, Serialize)]
pub struct AuthorData {
    pub id: i64,
    pub username: String,
}

/// Uploaded attachment data.
#[derive(Serialize)]
pub struct FileData {
    pub id: i64,

    /// File name without the owner directory.
    pub name: String,

    /// URL the file is served on.
    pub url: String,

    /// File upload timestamp.
    pub uploaded_at: i64,
}

impl FileData {
    pub fn new(id: i64, path: &str, uploaded_at: PrimitiveDateTime) -> Self {
        FileData {
            id,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            url: format!("/media/{path}"),
            uploaded_at: timestamp(uploaded_at),
        }
    }
}

/// General problem data.
#[derive(Serialize)]
pub struct ProblemData {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub direction: DirectionData,
    pub author: AuthorData,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProblemData {
    pub fn new(model: problem::Model, direction: direction::Model, author: AuthorData) -> Self {
        ProblemData {
            id: model.id,
            title: model.title,
            description: model.description,
            direction: direction.into(),
            author,
            created_at: timestamp(model.created_at),
            updated_at: timestamp(model.updated_at),
        }
    }
}

/// Solution data, including attachments.
#[derive(Serialize)]
pub struct SolutionData {
    pub id: i64,
    pub description: String,
    pub author: AuthorData,
    pub created_at: i64,
    pub is_accepted: bool,
    pub files: Vec<FileData>,
}

/// Problem data along with its attachments and solutions.
#[derive(Serialize)]
pub struct ProblemDetailsData {
    #[serde(flatten)]
    pub problem: ProblemData,

    pub files: Vec<FileData>,

    /// Solutions, accepted first and newest first after that.
    pub solutions: Vec<SolutionData>,
}

/// Load usernames of the provided users.
pub async fn load_authors<C, I>(db: &C, ids: I) -> Result<HashMap<i64, AuthorData>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let authors = user::Entity::find()
        .select_only()
        .columns([user::Column::Id, user::Column::Username])
        .filter(user::Column::Id.is_in(ids))
        .into_tuple::<(i64, String)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(id, username)| (id, AuthorData { id, username }))
        .collect();

    Ok(authors)
}

/// Look up an author inside of a map returned from [`load_authors`].
pub fn author(authors: &HashMap<i64, AuthorData>, id: i64) -> Result<AuthorData, DbErr> {
    authors
        .get(&id)
        .cloned()
        .ok_or_else(|| DbErr::RecordNotFound(format!("user {id}")))
}

/// Attach directions and authors to problem models.
pub async fn problem_list<C: ConnectionTrait>(
    db: &C,
    rows: Vec<(problem::Model, Option<direction::Model>)>,
) -> Result<Vec<ProblemData>, DbErr> {
    let authors = load_authors(db, rows.iter().map(|(problem, _)| problem.author_id)).await?;

    rows.into_iter()
        .map(|(problem, direction)| {
            let direction = direction.ok_or_else(|| {
                DbErr::RecordNotFound(format!("direction {}", problem.direction_id))
            })?;
            let author = author(&authors, problem.author_id)?;

            Ok(ProblemData::new(problem, direction, author))
        })
        .collect()
}

/// Load a single problem.
pub async fn load_problem<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<ProblemData>, DbErr> {
    let Some(row) = problem::Entity::find_by_id(id)
        .find_also_related(direction::Entity)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    Ok(problem_list(db, vec![row]).await?.pop())
}

/// Load a problem with its attachments and ordered solutions.
pub async fn load_problem_details<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<ProblemDetailsData>, DbErr> {
    let Some(problem) = load_problem(db, id).await? else {
        return Ok(None);
    };

    let files = problem_file::Entity::find()
        .filter(problem_file::Column::ProblemId.eq(id))
        .order_by_asc(problem_file::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|file| FileData::new(file.id, &file.file, file.uploaded_at))
        .collect();

    let solutions =
        solution::display_order(solution::Entity::find().filter(solution::Column::ProblemId.eq(id)))
            .all(db)
            .await?;

    let authors = load_authors(db, solutions.iter().map(|solution| solution.author_id)).await?;

    let mut solution_files: HashMap<i64, Vec<FileData>> = HashMap::new();

    for file in solution_file::Entity::find()
        .filter(
            solution_file::Column::SolutionId
                .is_in(solutions.iter().map(|solution| solution.id)),
        )
        .order_by_asc(solution_file::Column::Id)
        .all(db)
        .await?
    {
        solution_files
            .entry(file.solution_id)
            .or_default()
            .push(FileData::new(file.id, &file.file, file.uploaded_at));
    }

    let solutions = solutions
        .into_iter()
        .map(|solution| -> Result<_, DbErr> {
            Ok(SolutionData {
                id: solution.id,
                author: author(&authors, solution.author_id)?,
                files: solution_files.remove(&solution.id).unwrap_or_default(),
                description: solution.description,
                created_at: timestamp(solution.created_at),
                is_accepted: solution.is_accepted,
            })
        })
        .collect::<Result<_, DbErr>>()?;

    Ok(Some(ProblemDetailsData {
        problem,
        files,
        solutions,
    }))
}

/// Load a single solution with its attachments.
pub async fn load_solution<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<SolutionData>, DbErr> {
    let Some(solution) = solution::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let authors = load_authors(db, [solution.author_id]).await?;

    let files = solution_file::Entity::find()
        .filter(solution_file::Column::SolutionId.eq(id))
        .order_by_asc(solution_file::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|file| FileData::new(file.id, &file.file, file.uploaded_at))
        .collect();

    Ok(Some(SolutionData {
        id: solution.id,
        author: author(&authors, solution.author_id)?,
        files,
        description: solution.description,
        created_at: timestamp(solution.created_at),
        is_accepted: solution.is_accepted,
    }))
}
