use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    direction, problem, solution, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, SelectExt,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::{data, data::ProblemData, search};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ProblemListError {
    DatabaseError(DbErr),
}

#[derive(Deserialize)]
pub(super) struct ProblemListQuery {
    #[serde(default)]
    query: Option<String>,

    /// Direction identifier, empty value stands for every direction.
    #[serde(default)]
    direction: Option<String>,
}

/// A single problem list item.
#[derive(Serialize)]
pub(super) struct ProblemListItem {
    #[serde(flatten)]
    problem: ProblemData,

    solutions_count: u64,

    /// Problem has an accepted solution.
    solved: bool,
}

/// Filters of a valid search form.
struct Filters<'a> {
    query: Option<&'a str>,
    direction: Option<i64>,
}

/// Validate the search form.
///
/// An unknown direction makes the whole form invalid, in which case
/// no filter is applied at all.
async fn filters<'a>(
    db: &DatabaseConnection,
    params: &'a ProblemListQuery,
) -> Result<Option<Filters<'a>>, DbErr> {
    let query = search::query(params.query.as_deref());

    let Some(direction) = search::query(params.direction.as_deref()) else {
        return Ok(Some(Filters {
            query,
            direction: None,
        }));
    };

    let Ok(direction) = direction.parse::<i64>() else {
        return Ok(None);
    };

    let exists = direction::Entity::find_by_id(direction)
        .select_only()
        .exists(db)
        .await?;

    Ok(exists.then_some(Filters {
        query,
        direction: Some(direction),
    }))
}

/// List problems newest first, optionally filtered by a search query and direction.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
    Query(params): Query<ProblemListQuery>,
) -> Result<Json<Vec<ProblemListItem>>, ProblemListError> {
    let mut select = problem::Entity::find()
        .find_also_related(direction::Entity)
        .order_by_desc(problem::Column::CreatedAt)
        .order_by_desc(problem::Column::Id);

    if let Some(filters) = filters(&db, &params).await? {
        if let Some(query) = filters.query {
            select = select.filter(
                Condition::any()
                    .add(search::contains(problem::Entity, problem::Column::Title, query))
                    .add(search::contains(
                        problem::Entity,
                        problem::Column::Description,
                        query,
                    )),
            );
        }

        if let Some(direction) = filters.direction {
            select = select.filter(problem::Column::DirectionId.eq(direction));
        }
    }

    let problems = data::problem_list(&*db, select.all(&*db).await?).await?;

    let mut counters: HashMap<i64, (u64, bool)> = HashMap::new();

    for (problem_id, is_accepted) in solution::Entity::find()
        .select_only()
        .columns([solution::Column::ProblemId, solution::Column::IsAccepted])
        .filter(solution::Column::ProblemId.is_in(problems.iter().map(|problem| problem.id)))
        .into_tuple::<(i64, bool)>()
        .all(&*db)
        .await?
    {
        let (count, solved) = counters.entry(problem_id).or_default();
        *count += 1;
        *solved |= is_accepted;
    }

    let items = problems
        .into_iter()
        .map(|problem| {
            let (solutions_count, solved) = counters.remove(&problem.id).unwrap_or_default();

            ProblemListItem {
                problem,
                solutions_count,
                solved,
            }
        })
        .collect();

    Ok(Json(items))
}
