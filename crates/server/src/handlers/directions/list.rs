use std::sync::Arc;

use axum::{extract::State, Json};
use axum_derive_error::ErrorResponse;
use db::{direction, DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use derive_more::{Display, Error, From};

use crate::data::DirectionData;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum DirectionListError {
    DatabaseError(DbErr),
}

/// List every direction, used to fill problem filter and form choices.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<DirectionData>>, DirectionListError> {
    let directions = direction::Entity::find()
        .order_by_asc(direction::Column::Code)
        .all(&*db)
        .await?
        .into_iter()
        .map(DirectionData::from)
        .collect();

    Ok(Json(directions))
}
