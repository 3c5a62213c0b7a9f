use std::{error::Error, sync::Arc};

use axum::async_trait;
use common::config::Config;
use db::{
    direction, problem, solution, token, user, ActiveModelTrait, ActiveValue, ColumnTrait,
    Database, DatabaseConnection, EntityTrait, QueryFilter,
};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use serde::Serialize;
use tempfile::TempDir;

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

/// Test configuration with a dedicated media root.
pub(crate) fn media_config(media_root: &TempDir) -> Arc<Config> {
    let mut config = Config::for_tests();
    config.storage.media_root = media_root.path().to_path_buf();
    Arc::new(config)
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum UserKind {
    Regular,
    Staff,
    Superuser,
}

/// Create an active user and log it in.
///
/// Password of every test user is `<username>-password`.
pub(crate) async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    kind: UserKind,
) -> (i64, String) {
    let password = crate::password::hash(&format!("{username}-password"))
        .expect("unable to hash password");

    let user = user::ActiveModel {
        username: ActiveValue::Set(username.to_string()),
        first_name: ActiveValue::Set(String::from("Test")),
        last_name: ActiveValue::Set(String::from("User")),
        email: ActiveValue::Set(format!("{username}@example.com")),
        password: ActiveValue::Set(password),
        is_staff: ActiveValue::Set(kind != UserKind::Regular),
        is_active: ActiveValue::Set(true),
        is_superuser: ActiveValue::Set(kind == UserKind::Superuser),
        date_joined: ActiveValue::Set(db::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("unable to create user");

    let (active_model, token) = token::issue(user.id);

    token::Entity::insert(active_model)
        .exec_without_returning(db)
        .await
        .expect("unable to create token");

    (user.id, token)
}

/// Identifier of a seeded direction.
pub(crate) async fn direction_id(db: &DatabaseConnection, code: direction::Code) -> i64 {
    direction::Entity::find()
        .filter(direction::Column::Code.eq(code.as_str()))
        .one(db)
        .await
        .expect("unable to find direction")
        .expect("direction is not seeded")
        .id
}

pub(crate) async fn create_problem(
    db: &DatabaseConnection,
    author_id: i64,
    direction_id: i64,
    title: &str,
) -> i64 {
    let now = db::now();

    problem::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set(format!("{title} description")),
        direction_id: ActiveValue::Set(direction_id),
        author_id: ActiveValue::Set(author_id),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("unable to create problem")
    .id
}

pub(crate) async fn create_solution(
    db: &DatabaseConnection,
    problem_id: i64,
    author_id: i64,
    description: &str,
) -> i64 {
    solution::ActiveModel {
        problem_id: ActiveValue::Set(problem_id),
        description: ActiveValue::Set(description.to_string()),
        author_id: ActiveValue::Set(author_id),
        created_at: ActiveValue::Set(db::now()),
        is_accepted: ActiveValue::Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("unable to create solution")
    .id
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn text(self) -> String;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn text(self) -> String {
        String::from_utf8(self.bytes().await.to_vec()).expect("unable to convert to text")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
