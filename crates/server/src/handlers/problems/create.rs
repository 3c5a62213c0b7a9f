use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use axum_derive_error::ErrorResponse;
use common::{
    config::Config,
    storage::{self, FilenameError, MediaStorage, Owner},
};
use db::{
    problem, ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, TransactionErrorExt,
    TransactionTrait,
};
use derive_more::{Display, Error, From};
use tracing::info;
use validator::ValidationErrors;

use super::{form::ProblemForm, ProblemResponse};
use crate::{attachments, auth::AuthenticatedUser, data, form::MultipartForm};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ProblemCreateError {
    DatabaseError(DbErr),

    StorageError(storage::Error),

    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    InvalidFilename(FilenameError),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),
}

/// Create a new problem authored by the current user.
pub(super) async fn create(
    Extension(current_user): Extension<AuthenticatedUser>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProblemResponse>), ProblemCreateError> {
    let mut form = MultipartForm::read::<ProblemCreateError>(multipart).await?;
    let request = ProblemForm::from_multipart(&mut form)?;
    let uploads = form.take_files();

    let problem = db
        .transaction::<_, _, ProblemCreateError>(|txn| {
            Box::pin(async move {
                request.check_direction::<_, ProblemCreateError>(txn).await?;

                let now = db::now();

                let model = problem::ActiveModel {
                    title: ActiveValue::Set(request.title),
                    description: ActiveValue::Set(request.description),
                    direction_id: ActiveValue::Set(request.direction),
                    author_id: ActiveValue::Set(current_user.id()),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let storage = MediaStorage::new(&config.storage);
                attachments::attach::<_, ProblemCreateError>(
                    txn,
                    &storage,
                    Owner::Problem(model.id),
                    &uploads,
                )
                .await?;

                let problem = data::load_problem_details(txn, model.id)
                    .await?
                    .ok_or_else(|| DbErr::RecordNotFound(format!("problem {}", model.id)))?;

                Ok(problem)
            })
        })
        .await
        .into_raw_result()?;

    info!(
        id = problem.problem.id,
        author = current_user.id(),
        files = problem.files.len(),
        "problem created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ProblemResponse {
            problem,
            message: "Problem created successfully",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, sync::Arc};

    use crate::testing::{
        create_database, create_user, direction_id, media_config, ResponseBodyExt, UserKind,
    };

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common_multipart_rfc7578::client::multipart;
    use db::{direction::Code, problem, problem_file, EntityTrait, PaginatorTrait};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_request(token: &str, form: multipart::Form<'static>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/problem/create/")
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", form.content_type())
            .body(Body::wrap_stream(multipart::Body::from(form)))
            .unwrap()
    }

    fn problem_form(description: &str, direction: i64) -> multipart::Form<'static> {
        let mut form = multipart::Form::default();
        form.add_text("title", "Printer is offline");
        form.add_text("description", description.to_string());
        form.add_text("direction", direction.to_string());
        form
    }

    #[tokio::test]
    async fn create_with_files() {
        let media_root = TempDir::new().unwrap();
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "operator", UserKind::Regular).await;
        let os = direction_id(&db, Code::OperatingSystem).await;

        let mut form = problem_form("Nothing gets printed", os);
        form.add_reader_file("files", Cursor::new(b"log contents"), "spooler.log");
        form.add_reader_file("files", Cursor::new(b"\x89PNG"), "C:\\Users\\ivan\\screen.png");

        let response = crate::app_router(db.clone(), media_config(&media_root))
            .oneshot(create_request(&token, form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.json().await;
        let id = body["problem"]["id"].as_i64().unwrap();

        assert_eq!(body["message"], "Problem created successfully");
        assert_eq!(body["problem"]["author"]["username"], "operator");
        assert_eq!(body["problem"]["files"][1]["name"], "screen.png");

        let files = problem_file::Entity::find().all(&*db).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file, format!("problems/{id}/spooler.log"));
        assert_eq!(
            std::fs::read(media_root.path().join(&files[0].file)).unwrap(),
            b"log contents"
        );
        assert!(media_root
            .path()
            .join(format!("problems/{id}/screen.png"))
            .exists());
    }

    #[tokio::test]
    async fn description_length() {
        let media_root = TempDir::new().unwrap();
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "operator", UserKind::Regular).await;
        let os = direction_id(&db, Code::OperatingSystem).await;
        let router = crate::app_router(db.clone(), media_config(&media_root));

        let response = router
            .clone()
            .oneshot(create_request(&token, problem_form(&"я".repeat(301), os)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 0);

        let response = router
            .oneshot(create_request(&token, problem_form(&"я".repeat(300), os)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_direction() {
        let media_root = TempDir::new().unwrap();
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "operator", UserKind::Regular).await;

        let mut form = problem_form("Nothing gets printed", 999);
        form.add_reader_file("files", Cursor::new(b"log contents"), "spooler.log");

        let response = crate::app_router(db.clone(), media_config(&media_root))
            .oneshot(create_request(&token, form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 0);
        assert!(!media_root.path().join("problems").exists());
    }

    #[tokio::test]
    async fn hidden_file() {
        let media_root = TempDir::new().unwrap();
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "operator", UserKind::Regular).await;
        let os = direction_id(&db, Code::OperatingSystem).await;

        let mut form = problem_form("Nothing gets printed", os);
        form.add_reader_file("files", Cursor::new(b"SECRET=1"), ".env");

        let response = crate::app_router(db.clone(), media_config(&media_root))
            .oneshot(create_request(&token, form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn anonymous() {
        let media_root = TempDir::new().unwrap();
        let db = create_database().await;

        let os = direction_id(&db, Code::OperatingSystem).await;
        let form = problem_form("Nothing gets printed", os);

        let response = crate::app_router(Arc::new(db), media_config(&media_root))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/problem/create/")
                    .header("Content-Type", form.content_type())
                    .body(Body::wrap_stream(multipart::Body::from(form)))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
