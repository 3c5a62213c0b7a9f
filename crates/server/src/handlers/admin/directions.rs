use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_derive_error::ErrorResponse;
use db::{
    direction, problem, ActiveModelTrait, ActiveValue, ColumnTrait, Condition,
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, PrimitiveDateTime, QueryFilter,
    QueryOrder, QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationErrors};

use super::{BulkActionRequest, BulkActionResponse, Page, DATE_FORMAT};
use crate::{
    data::DirectionData,
    pagination::Pagination,
    search,
    validation::{field_error, ValidatedJson},
};

/// Number of recent problems displayed next to each direction.
const RECENT_PROBLEMS: u64 = 5;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum AdminDirectionError {
    DatabaseError(DbErr),

    DateFormatError(time::error::Format),

    #[status(StatusCode::UNPROCESSABLE_ENTITY)]
    ValidationError(ValidationErrors),
}

#[derive(Deserialize)]
pub(super) struct DirectionListQuery {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Serialize)]
pub(super) struct RecentProblem {
    id: i64,
    title: String,

    /// Creation date, `dd.mm.YYYY`.
    date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum DirectionStatus {
    Active,
    Inactive,
}

#[derive(Serialize)]
pub(super) struct DirectionRow {
    id: i64,
    code: String,
    display_name: String,
    problems_count: u64,
    recent_problems: Vec<RecentProblem>,
    status: DirectionStatus,
}

/// List directions along with their problem counters.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
    Query(query): Query<DirectionListQuery>,
    Query(pagination): Query<Pagination<20>>,
) -> Result<Json<Page<DirectionRow>>, AdminDirectionError> {
    let mut select = direction::Entity::find().order_by_asc(direction::Column::Code);

    if let Some(search) = search::query(query.search.as_deref()) {
        select = select.filter(
            Condition::any()
                .add(search::contains(
                    direction::Entity,
                    direction::Column::Code,
                    search,
                ))
                .add(search::contains(
                    direction::Entity,
                    direction::Column::DisplayName,
                    search,
                )),
        );
    }

    let total = select.clone().count(&*db).await?;

    let directions = select
        .limit(pagination.limit())
        .offset(pagination.offset())
        .all(&*db)
        .await?;

    let mut items = Vec::with_capacity(directions.len());

    for direction in directions {
        let problems_count = problem::Entity::find()
            .filter(problem::Column::DirectionId.eq(direction.id))
            .count(&*db)
            .await?;

        let recent_problems = problem::Entity::find()
            .select_only()
            .columns([
                problem::Column::Id,
                problem::Column::Title,
                problem::Column::CreatedAt,
            ])
            .filter(problem::Column::DirectionId.eq(direction.id))
            .order_by_desc(problem::Column::CreatedAt)
            .order_by_desc(problem::Column::Id)
            .limit(RECENT_PROBLEMS)
            .into_tuple::<(i64, String, PrimitiveDateTime)>()
            .all(&*db)
            .await?
            .into_iter()
            .map(|(id, title, created_at)| -> Result<_, AdminDirectionError> {
                Ok(RecentProblem {
                    id,
                    title,
                    date: created_at.format(DATE_FORMAT)?,
                })
            })
            .collect::<Result<_, AdminDirectionError>>()?;

        items.push(DirectionRow {
            id: direction.id,
            code: direction.code,
            display_name: direction.display_name,
            problems_count,
            recent_problems,
            status: if problems_count > 0 {
                DirectionStatus::Active
            } else {
                DirectionStatus::Inactive
            },
        });
    }

    Ok(Json(Page {
        items,
        total,
        page: pagination.page(),
    }))
}

#[derive(Deserialize, Validate)]
pub(super) struct DirectionCreateRequest {
    #[validate(length(min = 1, max = "direction::CODE_MAX_LENGTH"))]
    code: String,

    /// Empty display names are filled from the known code labels.
    #[serde(default)]
    #[validate(length(max = 100))]
    display_name: String,
}

/// Create a direction with one of the known codes.
pub(super) async fn create(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<DirectionCreateRequest>,
) -> Result<(StatusCode, Json<DirectionData>), AdminDirectionError> {
    if request.code.parse::<direction::Code>().is_err() {
        return Err(field_error("code", "invalid_choice", "select a valid direction code").into());
    }

    let model = db
        .transaction::<_, _, AdminDirectionError>(|txn| {
            Box::pin(async move {
                let code_taken = direction::Entity::find()
                    .select_only()
                    .filter(direction::Column::Code.eq(request.code.as_str()))
                    .exists(txn)
                    .await?;

                if code_taken {
                    return Err(field_error(
                        "code",
                        "unique",
                        "direction with this code already exists",
                    )
                    .into());
                }

                let model = direction::ActiveModel {
                    code: ActiveValue::Set(request.code),
                    display_name: ActiveValue::Set(request.display_name.trim().to_string()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                Ok(model)
            })
        })
        .await
        .into_raw_result()?;

    info!(id = model.id, code = %model.code, "direction created");

    Ok((StatusCode::CREATED, Json(model.into())))
}

/// Create a copy of every selected direction.
pub(super) async fn duplicate(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminDirectionError> {
    db.transaction::<_, _, AdminDirectionError>(|txn| {
        Box::pin(async move {
            let directions = direction::Entity::find()
                .filter(direction::Column::Id.is_in(request.ids))
                .order_by_asc(direction::Column::Id)
                .all(txn)
                .await?;

            for direction in &directions {
                let code = format!("{}_copy", direction.code);

                if code.chars().count() as u64 > direction::CODE_MAX_LENGTH {
                    return Err(field_error(
                        "ids",
                        "max_length",
                        "direction copy code is too long",
                    )
                    .into());
                }

                let code_taken = direction::Entity::find()
                    .select_only()
                    .filter(direction::Column::Code.eq(code.as_str()))
                    .exists(txn)
                    .await?;

                if code_taken {
                    return Err(field_error(
                        "ids",
                        "unique",
                        "direction copy with this code already exists",
                    )
                    .into());
                }

                direction::ActiveModel {
                    code: ActiveValue::Set(code),
                    display_name: ActiveValue::Set(format!("{} (копия)", direction.display_name)),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
            }

            let affected = directions.len() as u64;

            info!(affected, "directions duplicated");

            Ok(Json(BulkActionResponse {
                affected,
                messages: vec![format!("Created {affected} direction copies")],
            }))
        })
    })
    .await
    .into_raw_result()
}

/// Delete the selected directions.
///
/// Problems of deleted directions are removed along with their solutions
/// and attachment records.
pub(super) async fn delete(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminDirectionError> {
    let result = direction::Entity::delete_many()
        .filter(direction::Column::Id.is_in(request.ids))
        .exec(&*db)
        .await?;

    let affected = result.rows_affected;

    info!(affected, "directions deleted");

    Ok(Json(BulkActionResponse {
        affected,
        messages: vec![format!("Deleted {affected} directions")],
    }))
}

/// Delete every problem of the selected directions.
pub(super) async fn clear_problems(
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<BulkActionRequest>,
) -> Result<Json<BulkActionResponse>, AdminDirectionError> {
    db.transaction::<_, _, AdminDirectionError>(|txn| {
        Box::pin(async move {
            let directions = direction::Entity::find()
                .filter(direction::Column::Id.is_in(request.ids))
                .order_by_asc(direction::Column::Id)
                .all(txn)
                .await?;

            let mut affected = 0;
            let mut messages = Vec::with_capacity(directions.len());

            for direction in directions {
                let result = problem::Entity::delete_many()
                    .filter(problem::Column::DirectionId.eq(direction.id))
                    .exec(txn)
                    .await?;

                affected += result.rows_affected;
                messages.push(format!(
                    "Deleted {} problems from direction {}",
                    result.rows_affected, direction.display_name
                ));
            }

            info!(affected, "direction problems cleared");

            Ok(Json(BulkActionResponse { affected, messages }))
        })
    })
    .await
    .into_raw_result()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::testing::{
        create_database, create_problem, create_solution, create_user, direction_id,
        RequestBodyExt, ResponseBodyExt, UserKind,
    };

    use assert_json::assert_json;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use common::config::Config;
    use db::{
        direction::{self, Code},
        problem, problem_file, solution, solution_file, ActiveValue, ColumnTrait, EntityTrait,
        PaginatorTrait, QueryFilter,
    };
    use serde_json::{json, Value};
    use tower::{Service, ServiceExt};

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_request(uri: &str, token: &str, body: Value) -> Request<Body> {
        json_request("POST", uri, token, body)
    }

    fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .body(Body::from_json(body))
            .unwrap()
    }

    #[tokio::test]
    async fn list() {
        let db = Arc::new(create_database().await);

        let (admin, token) = create_user(&db, "admin", UserKind::Superuser).await;
        let telephony = direction_id(&db, Code::Telephony).await;

        for index in 0..6 {
            create_problem(&db, admin, telephony, &format!("Problem {index}")).await;
        }

        let mut service = crate::app_router(db.clone(), Arc::new(Config::for_tests()));

        let response = service
            .call(get_request("/admin/directions/", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;

        assert_eq!(body["total"], 7);
        assert_eq!(body["page"], 1);
        assert_eq!(body["items"][0]["code"], "BU");
        assert_eq!(body["items"][0]["status"], "inactive");
        assert_eq!(body["items"][0]["problems_count"], 0);

        let row = &body["items"][3];

        assert_eq!(row["code"], "TEL");
        assert_eq!(row["status"], "active");
        assert_eq!(row["problems_count"], 6);
        assert_eq!(row["recent_problems"].as_array().unwrap().len(), 5);
        assert_eq!(row["recent_problems"][0]["title"], "Problem 5");

        let date = row["recent_problems"][0]["date"].as_str().unwrap();

        assert_eq!(date.len(), 10);
        assert_eq!(&date[2..3], ".");
        assert_eq!(&date[5..6], ".");

        let response = service
            .call(get_request("/admin/directions/?search=video", &token))
            .await
            .unwrap();

        let body = response.json().await;

        assert_eq!(body["total"], 2);
        assert_eq!(body["items"][0]["code"], "VIDEO_PC");
    }

    #[tokio::test]
    async fn create() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "admin", UserKind::Superuser).await;

        direction::Entity::delete_many()
            .filter(direction::Column::Code.eq("TEL"))
            .exec(&*db)
            .await
            .unwrap();

        let mut service = crate::app_router(db.clone(), Arc::new(Config::for_tests()));

        let response = service
            .call(post_request(
                "/admin/directions/",
                &token,
                json!({ "code": "TEL" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_json!(response.json().await, {
            "id": 8,
            "code": "TEL",
            "display_name": "Телефония",
        });

        for body in [
            json!({ "code": "TEL" }),
            json!({ "code": "PRINTERS" }),
            json!({ "code": "TEL_TEL_TEL_TEL_TEL_TEL" }),
        ] {
            let response = service
                .call(post_request("/admin/directions/", &token, body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn duplicate() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "admin", UserKind::Superuser).await;
        let os = direction_id(&db, Code::OperatingSystem).await;
        let telephony = direction_id(&db, Code::Telephony).await;

        let mut service = crate::app_router(db.clone(), Arc::new(Config::for_tests()));

        let response = service
            .call(post_request(
                "/admin/directions/duplicate/",
                &token,
                json!({ "ids": [os, telephony] }),
            ))
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "affected": 2,
            "messages": ["Created 2 direction copies"],
        });

        let copy = direction::Entity::find()
            .filter(direction::Column::Code.eq("OS_copy"))
            .one(&*db)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(copy.display_name, "Операционная система (копия)");

        let response = service
            .call(post_request(
                "/admin/directions/duplicate/",
                &token,
                json!({ "ids": [os] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(direction::Entity::find().count(&*db).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn duplicate_long_code() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "admin", UserKind::Superuser).await;

        let long = direction::Entity::insert(direction::ActiveModel {
            code: ActiveValue::Set(String::from("VIDEO_PC_copy_copy")),
            display_name: ActiveValue::Set(String::from("Видеонаблюдение")),
            ..Default::default()
        })
        .exec(&*db)
        .await
        .unwrap()
        .last_insert_id;

        let response = crate::app_router(db.clone(), Arc::new(Config::for_tests()))
            .oneshot(post_request(
                "/admin/directions/duplicate/",
                &token,
                json!({ "ids": [long] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(direction::Entity::find().count(&*db).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn clear_problems_cascade() {
        let db = Arc::new(create_database().await);

        let (admin, token) = create_user(&db, "admin", UserKind::Superuser).await;
        let os = direction_id(&db, Code::OperatingSystem).await;
        let telephony = direction_id(&db, Code::Telephony).await;

        let cleared = create_problem(&db, admin, os, "Printer is offline").await;
        let kept = create_problem(&db, admin, telephony, "No dial tone").await;
        let solution = create_solution(&db, cleared, admin, "Restart the spooler").await;
        create_solution(&db, kept, admin, "Replace the cable").await;

        problem_file::Entity::insert(problem_file::ActiveModel {
            problem_id: ActiveValue::Set(cleared),
            file: ActiveValue::Set(format!("problems/{cleared}/log.txt")),
            uploaded_at: ActiveValue::Set(db::now()),
            ..Default::default()
        })
        .exec_without_returning(&*db)
        .await
        .unwrap();

        solution_file::Entity::insert(solution_file::ActiveModel {
            solution_id: ActiveValue::Set(solution),
            file: ActiveValue::Set(format!("solutions/{solution}/fix.txt")),
            uploaded_at: ActiveValue::Set(db::now()),
            ..Default::default()
        })
        .exec_without_returning(&*db)
        .await
        .unwrap();

        let response = crate::app_router(db.clone(), Arc::new(Config::for_tests()))
            .oneshot(post_request(
                "/admin/directions/clear-problems/",
                &token,
                json!({ "ids": [os] }),
            ))
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "affected": 1,
            "messages": ["Deleted 1 problems from direction Операционная система"],
        });

        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 1);
        assert_eq!(solution::Entity::find().count(&*db).await.unwrap(), 1);
        assert_eq!(problem_file::Entity::find().count(&*db).await.unwrap(), 0);
        assert_eq!(solution_file::Entity::find().count(&*db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn direction_delete_cascade() {
        let db = Arc::new(create_database().await);

        let (admin, token) = create_user(&db, "admin", UserKind::Superuser).await;
        let os = direction_id(&db, Code::OperatingSystem).await;
        let telephony = direction_id(&db, Code::Telephony).await;
        let problem = create_problem(&db, admin, os, "Printer is offline").await;
        let solution = create_solution(&db, problem, admin, "Restart the spooler").await;

        problem_file::Entity::insert(problem_file::ActiveModel {
            problem_id: ActiveValue::Set(problem),
            file: ActiveValue::Set(format!("problems/{problem}/log.txt")),
            uploaded_at: ActiveValue::Set(db::now()),
            ..Default::default()
        })
        .exec_without_returning(&*db)
        .await
        .unwrap();

        solution_file::Entity::insert(solution_file::ActiveModel {
            solution_id: ActiveValue::Set(solution),
            file: ActiveValue::Set(format!("solutions/{solution}/fix.txt")),
            uploaded_at: ActiveValue::Set(db::now()),
            ..Default::default()
        })
        .exec_without_returning(&*db)
        .await
        .unwrap();

        let response = crate::app_router(db.clone(), Arc::new(Config::for_tests()))
            .oneshot(json_request(
                "DELETE",
                "/admin/directions/",
                &token,
                json!({ "ids": [os, telephony, 999] }),
            ))
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "affected": 2,
            "messages": ["Deleted 2 directions"],
        });

        assert_eq!(direction::Entity::find().count(&*db).await.unwrap(), 5);
        assert_eq!(problem::Entity::find().count(&*db).await.unwrap(), 0);
        assert_eq!(solution::Entity::find().count(&*db).await.unwrap(), 0);
        assert_eq!(problem_file::Entity::find().count(&*db).await.unwrap(), 0);
        assert_eq!(solution_file::Entity::find().count(&*db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn staff_is_forbidden() {
        let db = Arc::new(create_database().await);

        let (_, token) = create_user(&db, "support", UserKind::Staff).await;

        let response = crate::app_router(db.clone(), Arc::new(Config::for_tests()))
            .oneshot(get_request("/admin/directions/", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
