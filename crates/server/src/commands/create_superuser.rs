use db::{
    user, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QuerySelect, SelectExt,
};
use tracing::{info, instrument};

use crate::password;

/// Create a new superuser account, which is both staff and active.
#[instrument(skip(database, password), err)]
pub(crate) async fn create_superuser(
    database: DatabaseConnection,
    username: String,
    email: String,
    password: String,
) -> Result<(), anyhow::Error> {
    let username_taken = user::Entity::find()
        .select_only()
        .filter(user::Column::Username.eq(username.as_str()))
        .exists(&database)
        .await?;

    if username_taken {
        return Err(anyhow::Error::msg("user with this username already exists"));
    }

    let model = user::ActiveModel {
        username: ActiveValue::Set(username),
        first_name: ActiveValue::Set(String::new()),
        last_name: ActiveValue::Set(String::new()),
        email: ActiveValue::Set(email),
        password: ActiveValue::Set(password::hash(&password)?),
        is_staff: ActiveValue::Set(true),
        is_active: ActiveValue::Set(true),
        is_superuser: ActiveValue::Set(true),
        date_joined: ActiveValue::Set(db::now()),
        ..Default::default()
    }
    .insert(&database)
    .await?;

    info!(id = model.id, "superuser created");

    Ok(())
}
