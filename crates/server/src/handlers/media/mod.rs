use std::{io, sync::Arc};

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use axum_derive_error::ErrorResponse;
use common::{
    config::Config,
    storage::{self, MediaStorage},
};
use db::DatabaseConnection;
use derive_more::{Display, Error, From};

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum MediaError {
    StorageError(storage::Error),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "file not found")]
    FileNotFound,
}

/// Serve an uploaded attachment with a content type guessed from its extension.
async fn serve(
    Path(path): Path<String>,
    Extension(config): Extension<Arc<Config>>,
) -> Result<impl IntoResponse, MediaError> {
    let data = match MediaStorage::new(&config.storage).read(&path).await {
        Ok(data) => data,
        Err(storage::Error::InvalidPath) => return Err(MediaError::FileNotFound),
        Err(storage::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            return Err(MediaError::FileNotFound)
        }
        Err(err) => return Err(err.into()),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], data))
}

pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new().route("/media/*path", get(serve))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{create_database, media_config, ResponseBodyExt};

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::storage::{MediaStorage, Owner};
    use tempfile::TempDir;
    use tower::{Service, ServiceExt};

    fn media_request(path: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/media/{path}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn serve() {
        let media_root = TempDir::new().unwrap();
        let config = media_config(&media_root);
        let storage = MediaStorage::new(&config.storage);

        let log = storage
            .save(Owner::Problem(1), "spooler.log", b"log contents")
            .await
            .unwrap();
        let image = storage
            .save(Owner::Solution(2), "screen.png", b"\x89PNG")
            .await
            .unwrap();

        let mut service = crate::app_router(Arc::new(create_database().await), config.clone());

        let response = service.call(media_request(&image)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "image/png");
        assert_eq!(&response.bytes().await[..], b"\x89PNG");

        let response = service.call(media_request(&log)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await, "log contents");
    }

    #[tokio::test]
    async fn missing_file() {
        let media_root = TempDir::new().unwrap();
        let config = media_config(&media_root);

        MediaStorage::new(&config.storage)
            .save(Owner::Problem(1), "spooler.log", b"log contents")
            .await
            .unwrap();

        let mut service = crate::app_router(Arc::new(create_database().await), config.clone());

        for path in ["problems/1/missing.log", "problems/1", "problems/1/../1/spooler.log"] {
            let response = service.call(media_request(path)).await.unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        let response = crate::app_router(Arc::new(create_database().await), config)
            .oneshot(media_request("problems/1/spooler.log"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
