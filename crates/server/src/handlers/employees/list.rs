use std::sync::Arc;

use axum::{extract::State, Json};
use axum_derive_error::ErrorResponse;
use db::{user, DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use derive_more::{Display, Error, From};
use serde::Serialize;

use super::EmployeeData;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum EmployeeListError {
    DatabaseError(DbErr),
}

#[derive(Serialize)]
pub(super) struct EmployeeListResponse {
    employees: Vec<EmployeeData>,
    total: usize,
    active: usize,
    staff: usize,
    superusers: usize,
}

/// List every account, recently joined first.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<Json<EmployeeListResponse>, EmployeeListError> {
    let users = user::Entity::find()
        .order_by_desc(user::Column::DateJoined)
        .order_by_desc(user::Column::Id)
        .all(&*db)
        .await?;

    let count = |filter: fn(&user::Model) -> bool| users.iter().filter(|user| filter(user)).count();

    Ok(Json(EmployeeListResponse {
        total: users.len(),
        active: count(|user| user.is_active),
        staff: count(|user| user.is_staff),
        superusers: count(|user| user.is_superuser),
        employees: users.into_iter().map(EmployeeData::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_database, create_user, ResponseBodyExt, UserKind};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::config::Config;
    use tower::ServiceExt;

    fn list_request(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/employees/")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn list() {
        let db = create_database().await;

        let (_, token) = create_user(&db, "admin", UserKind::Superuser).await;
        create_user(&db, "support", UserKind::Staff).await;
        create_user(&db, "operator", UserKind::Regular).await;

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(list_request(&token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;

        assert_eq!(body["total"], 3);
        assert_eq!(body["active"], 3);
        assert_eq!(body["staff"], 2);
        assert_eq!(body["superusers"], 1);
        assert_eq!(body["employees"][0]["username"], "operator");
        assert_eq!(body["employees"][2]["username"], "admin");
        assert!(body["employees"][0].get("password").is_none());
    }

    #[tokio::test]
    async fn staff_is_forbidden() {
        let db = create_database().await;

        let (_, token) = create_user(&db, "support", UserKind::Staff).await;

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(list_request(&token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.json().await.get("employees").is_none());
    }

    #[tokio::test]
    async fn anonymous() {
        let db = create_database().await;

        let response = crate::app_router(Arc::new(db), Arc::new(Config::for_tests()))
            .oneshot(
                Request::builder()
                    .uri("/employees/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
