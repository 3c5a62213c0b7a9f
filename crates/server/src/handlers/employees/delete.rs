use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    user, DatabaseConnection, DbErr, EntityTrait, ModelTrait, TransactionErrorExt,
    TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use tracing::info;

use super::EmployeeData;
use crate::auth::AuthenticatedUser;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum EmployeeDeleteError {
    DatabaseError(DbErr),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "employee not found")]
    EmployeeNotFound,

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    #[display(fmt = "you can not delete your own account")]
    OwnAccount,
}

#[derive(Serialize)]
pub(super) struct EmployeeDeleteResponse {
    message: String,
}

/// Account to be deleted, for the confirmation dialog.
pub(super) async fn confirm(
    Path(id): Path<i64>,
    Extension(current_user): Extension<AuthenticatedUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<EmployeeData>, EmployeeDeleteError> {
    if id == current_user.id() {
        return Err(EmployeeDeleteError::OwnAccount);
    }

    user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .map(|model| Json(model.into()))
        .ok_or(EmployeeDeleteError::EmployeeNotFound)
}

/// Delete an account along with its problems, solutions and tokens.
pub(super) async fn delete(
    Path(id): Path<i64>,
    Extension(current_user): Extension<AuthenticatedUser>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<EmployeeDeleteResponse>, EmployeeDeleteError> {
    if id == current_user.id() {
        return Err(EmployeeDeleteError::OwnAccount);
    }

    let username = db
        .transaction::<_, _, EmployeeDeleteError>(|txn| {
            Box::pin(async move {
                let model = user::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or(EmployeeDeleteError::EmployeeNotFound)?;

                let username = model.username.clone();
                model.delete(txn).await?;

                Ok(username)
            })
        })
        .await
        .into_raw_result()?;

    info!(id, %username, "employee deleted");

    Ok(Json(EmployeeDeleteResponse {
        message: format!("Employee {username} deleted"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{
        create_database, create_problem, create_solution, create_user, direction_id,
        ResponseBodyExt, UserKind,
    };

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::config::Config;
    use db::{direction::Code, problem, solution, token, user, EntityTrait, PaginatorTrait};
    use tower::{Service, ServiceExt};

    fn delete_request(method: &str, id: i64, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(format!("/employees/{id}/delete/"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn delete_with_cascade() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "admin", UserKind::Superuser).await;
        let (id, _) = create_user(&db, "operator", UserKind::Regular).await;
        let os = direction_id(&db, Code::OperatingSystem).await;
        let problem = create_problem(&db, id, os, "Printer is offline").await;
        create_solution(&db, problem, id, "Restart the spooler").await;

        let mut service = crate::app_router(db.clone(), Arc::new(Config::for_tests()));

        let response = service
            .call(delete_request("GET", id, &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.json().await["username"], "operator");

        let response = service
            .call(delete_request("POST", id, &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.json().await["message"], "Employee operator deleted");

        assert!(user::Entity::find_by_id(id).one(&*db).await.unwrap().is_none());
        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 0);
        assert_eq!(solution::Entity::find().count(&*db).await.unwrap(), 0);
        assert_eq!(token::Entity::find().count(&*db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn own_account() {
        let db = Arc::new(create_database().await);

        let (id, token) = create_user(&db, "admin", UserKind::Superuser).await;

        let mut service = crate::app_router(db.clone(), Arc::new(Config::for_tests()));

        for method in ["GET", "POST"] {
            let response = service
                .call(delete_request(method, id, &token))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(
                response.json().await["error"],
                "you can not delete your own account"
            );
        }

        assert!(user::Entity::find_by_id(id).one(&*db).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_employee() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "admin", UserKind::Superuser).await;

        let response = crate::app_router(db.clone(), Arc::new(Config::for_tests()))
            .oneshot(delete_request("POST", 100, &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
