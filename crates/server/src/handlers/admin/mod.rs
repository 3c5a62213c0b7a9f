//! Administrative panel.
//!
//! Superusers browse directions, problems and solutions with computed
//! columns, and run bulk actions over selected records. Every bulk
//! action runs inside of a single transaction.

/// Direction administration routes.
mod directions;

/// Problem administration routes.
mod problems;

/// Solution administration routes.
mod solutions;

use std::{collections::HashMap, sync::Arc};

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use db::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PrimitiveDateTime,
    QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, Duration};
use validator::Validate;

use crate::auth;

/// `dd.mm.YYYY` date format.
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[day].[month].[year]");

/// `dd.mm.YYYY HH:MM` date and time format.
const DATE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[day].[month].[year] [hour]:[minute]");

/// Records selected for a bulk action.
#[derive(Deserialize, Validate)]
pub(super) struct BulkActionRequest {
    #[validate(length(min = 1))]
    ids: Vec<i64>,
}

#[derive(Serialize)]
pub(super) struct BulkActionResponse {
    /// Number of records the action was applied to.
    affected: u64,

    messages: Vec<String>,
}

/// A single page of records.
#[derive(Serialize)]
pub(super) struct Page<T> {
    items: Vec<T>,

    /// Number of records matching the filters across every page.
    total: u64,

    page: u64,
}

/// Updated record along with a message for the user.
#[derive(Serialize)]
pub(super) struct UpdateResponse<T> {
    item: T,
    message: &'static str,
}

/// Parse an optional identifier filter, ignoring malformed values.
fn id_filter(value: Option<&str>) -> Option<i64> {
    crate::search::query(value).and_then(|value| value.parse().ok())
}

/// Lower bound of a `created_at` list filter.
///
/// Accepts `today`, `past_7_days`, `this_month` and `this_year`,
/// other values are ignored.
fn created_since(value: Option<&str>, now: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
    let today = now.date();

    let since = match crate::search::query(value)? {
        "today" => today,
        "past_7_days" => today.checked_sub(Duration::days(7))?,
        "this_month" => today.replace_day(1).ok()?,
        "this_year" => Date::from_ordinal_date(today.year(), 1).ok()?,
        _ => return None,
    };

    Some(since.midnight())
}

/// Count records per owner.
async fn count_by<C, E>(
    db: &C,
    column: E::Column,
    owners: Vec<i64>,
) -> Result<HashMap<i64, u64>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut counters = HashMap::new();

    for owner in E::find()
        .select_only()
        .column(column)
        .filter(column.is_in(owners))
        .into_tuple::<i64>()
        .all(db)
        .await?
    {
        *counters.entry(owner).or_default() += 1;
    }

    Ok(counters)
}

pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route(
            "/admin/directions/",
            get(directions::list)
                .post(directions::create)
                .delete(directions::delete),
        )
        .route("/admin/directions/duplicate/", post(directions::duplicate))
        .route(
            "/admin/directions/clear-problems/",
            post(directions::clear_problems),
        )
        .route(
            "/admin/problems/",
            get(problems::list).delete(problems::delete),
        )
        .route(
            "/admin/problems/:id/",
            get(problems::details).post(problems::update),
        )
        .route("/admin/problems/mark-solved/", post(problems::mark_solved))
        .route(
            "/admin/problems/mark-unsolved/",
            post(problems::mark_unsolved),
        )
        .route(
            "/admin/problems/delete-solutions/",
            post(problems::delete_solutions),
        )
        .route(
            "/admin/solutions/",
            get(solutions::list).delete(solutions::delete),
        )
        .route("/admin/solutions/:id/", post(solutions::update))
        .route("/admin/solutions/accept/", post(solutions::accept))
        .route("/admin/solutions/unaccept/", post(solutions::unaccept))
        .route_layer(from_fn_with_state(
            database,
            auth::require_authentication::<false, true, _>,
        ))
}
