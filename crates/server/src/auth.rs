use std::sync::Arc;

use axum::{
    extract::State,
    headers::{authorization::Bearer, Authorization},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    TypedHeader,
};
use axum_derive_error::ErrorResponse;
use db::{
    token, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};
use derive_more::{Display, Error, From};

/// Currently authenticated user.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    id: i64,
}

impl AuthenticatedUser {
    /// Get raw user identifier value.
    pub fn id(&self) -> i64 {
        self.id
    }
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AuthenticationError {
    DatabaseError(DbErr),

    #[status(StatusCode::UNAUTHORIZED)]
    #[display(fmt = "authentication token is required")]
    MissingAuthenticationToken,

    #[status(StatusCode::UNAUTHORIZED)]
    #[display(fmt = "invalid authentication token was provided")]
    InvalidAuthenticationToken,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "staff account is required to access")]
    StaffRequired,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "superuser account is required to access")]
    SuperuserRequired,
}

/// Authenticate the request with a bearer token.
///
/// Tokens of inactive accounts are treated as invalid ones.
pub(super) async fn require_authentication<
    const REQUIRE_STAFF: bool,
    const REQUIRE_SUPERUSER: bool,
    B,
>(
    State(db): State<Arc<DatabaseConnection>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, AuthenticationError> {
    let TypedHeader(authorization) =
        authorization.ok_or(AuthenticationError::MissingAuthenticationToken)?;

    if !token::well_formed(authorization.token()) {
        return Err(AuthenticationError::InvalidAuthenticationToken);
    }

    let (id, is_staff, is_superuser) = user::Entity::find()
        .select_only()
        .columns([
            user::Column::Id,
            user::Column::IsStaff,
            user::Column::IsSuperuser,
        ])
        .inner_join(token::Entity)
        .filter(token::Column::Token.eq(authorization.token()))
        .filter(user::Column::IsActive.eq(true))
        .into_tuple::<(i64, bool, bool)>()
        .one(&*db)
        .await?
        .ok_or(AuthenticationError::InvalidAuthenticationToken)?;

    if REQUIRE_STAFF && !is_staff {
        return Err(AuthenticationError::StaffRequired);
    }

    if REQUIRE_SUPERUSER && !is_superuser {
        return Err(AuthenticationError::SuperuserRequired);
    }

    req.extensions_mut().insert(AuthenticatedUser { id });

    Ok(next.run(req).await)
}
