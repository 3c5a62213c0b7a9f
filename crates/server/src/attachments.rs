use common::storage::{self, MediaStorage, Owner};
use db::{problem_file, solution_file, ActiveValue, ConnectionTrait, DbErr, EntityTrait};
use tracing::info;

use crate::form::Upload;

/// Store uploaded files and attach them to the provided owner.
///
/// Files that were already written are removed if either storage
/// or the database fails, so the caller can roll back its transaction
/// without leaving orphaned files behind.
pub(crate) async fn attach<C, E>(
    db: &C,
    storage: &MediaStorage<'_>,
    owner: Owner,
    uploads: &[Upload],
) -> Result<Vec<String>, E>
where
    C: ConnectionTrait,
    E: From<DbErr> + From<storage::Error>,
{
    if uploads.is_empty() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::with_capacity(uploads.len());

    for upload in uploads {
        match storage.save(owner, &upload.filename, &upload.data).await {
            Ok(path) => paths.push(path),
            Err(err) => {
                storage.remove_all(&paths).await;
                return Err(err.into());
            }
        }
    }

    if let Err(err) = insert_records(db, owner, &paths).await {
        storage.remove_all(&paths).await;
        return Err(err.into());
    }

    info!(?owner, count = paths.len(), "attachments stored");

    Ok(paths)
}

async fn insert_records<C: ConnectionTrait>(
    db: &C,
    owner: Owner,
    paths: &[String],
) -> Result<(), DbErr> {
    let uploaded_at = db::now();

    match owner {
        Owner::Problem(problem_id) => {
            problem_file::Entity::insert_many(paths.iter().map(|path| {
                problem_file::ActiveModel {
                    problem_id: ActiveValue::Set(problem_id),
                    file: ActiveValue::Set(path.clone()),
                    uploaded_at: ActiveValue::Set(uploaded_at),
                    ..Default::default()
                }
            }))
            .exec_without_returning(db)
            .await?;
        }
        Owner::Solution(solution_id) => {
            solution_file::Entity::insert_many(paths.iter().map(|path| {
                solution_file::ActiveModel {
                    solution_id: ActiveValue::Set(solution_id),
                    file: ActiveValue::Set(path.clone()),
                    uploaded_at: ActiveValue::Set(uploaded_at),
                    ..Default::default()
                }
            }))
            .exec_without_returning(db)
            .await?;
        }
    }

    Ok(())
}
