use std::sync::Arc;

use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use axum_derive_error::ErrorResponse;
use db::{token, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use derive_more::{Display, Error, From};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LogoutError {
    DatabaseError(DbErr),
}

/// Remove the provided authentication token.
///
/// Requests without a token, or with an unknown one, succeed as well.
pub(super) async fn logout(
    State(db): State<Arc<DatabaseConnection>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<(), LogoutError> {
    if let Some(TypedHeader(authorization)) = authorization {
        token::Entity::delete_many()
            .filter(token::Column::Token.eq(authorization.token()))
            .exec(&*db)
            .await?;
    }

    Ok(())
}
