use std::sync::Arc;

use argon2::password_hash;
use axum::{extract::State, http::StatusCode, Json};
use axum_derive_error::ErrorResponse;
use db::{
    token, user, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::password;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum UserAuthenticationError {
    DatabaseError(DbErr),

    PasswordHashError(password_hash::Error),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "invalid username or password")]
    InvalidCredentials,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "account is inactive")]
    InactiveAccount,
}

#[derive(Deserialize)]
pub(super) struct UserAuthenticationRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub(super) struct UserAuthenticationResponse {
    token: String,
}

/// Exchange username and password for a new authentication token.
pub(super) async fn login(
    State(db): State<Arc<DatabaseConnection>>,
    Json(request): Json<UserAuthenticationRequest>,
) -> Result<Json<UserAuthenticationResponse>, UserAuthenticationError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let user = user::Entity::find()
                .filter(user::Column::Username.eq(request.username.as_str()))
                .one(txn)
                .await?
                .ok_or(UserAuthenticationError::InvalidCredentials)?;

            if !password::verify(&request.password, &user.password)? {
                return Err(UserAuthenticationError::InvalidCredentials);
            }

            if !user.is_active {
                return Err(UserAuthenticationError::InactiveAccount);
            }

            let (active_model, token) = token::issue(user.id);

            token::Entity::insert(active_model)
                .exec_without_returning(txn)
                .await?;

            info!(user_id = user.id, "user logged in");

            Ok(Json(UserAuthenticationResponse { token }))
        })
    })
    .await
    .into_raw_result()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_database, create_user, RequestBodyExt, ResponseBodyExt, UserKind};

    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::config::Config;
    use db::{token::TOKEN_LENGTH, user, ActiveModelTrait, ActiveValue};
    use serde_json::json;
    use tower::ServiceExt;

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/login/")
            .header("Content-Type", "application/json")
            .body(Body::from_json(json!({
                "username": username,
                "password": password,
            })))
            .unwrap()
    }

    #[tokio::test]
    async fn login() {
        let db = create_database().await;

        create_user(&db, "operator", UserKind::Regular).await;

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(login_request("operator", "operator-password"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "token": validators::string(|val| {
                (val.len() == TOKEN_LENGTH)
                    .then_some(())
                    .ok_or(String::from("invalid length"))
            })
        });
    }

    #[tokio::test]
    async fn wrong_password() {
        let db = create_database().await;

        create_user(&db, "operator", UserKind::Regular).await;

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(login_request("operator", "wrong-password"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_user() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(login_request("nobody", "operator-password"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn inactive_user() {
        let db = create_database().await;

        let (user_id, _) = create_user(&db, "operator", UserKind::Regular).await;

        user::ActiveModel {
            id: ActiveValue::Unchanged(user_id),
            is_active: ActiveValue::Set(false),
            ..Default::default()
        }
        .update(&db)
        .await
        .unwrap();

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(login_request("operator", "operator-password"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
