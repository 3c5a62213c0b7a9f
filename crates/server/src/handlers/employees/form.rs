use db::{
    user, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, SelectExt,
};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::validation::{field_error, USERNAME_REGEX};

/// Employee account form, used for both creation and editing.
#[derive(Deserialize, Validate)]
pub(super) struct EmployeeForm {
    #[validate(
        length(min = 1, max = "user::USERNAME_MAX_LENGTH"),
        regex = "USERNAME_REGEX"
    )]
    pub username: String,

    #[validate(length(min = 1, max = "user::NAME_MAX_LENGTH"))]
    pub first_name: String,

    #[validate(length(min = 1, max = "user::NAME_MAX_LENGTH"))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password1: String,

    #[validate(must_match = "password1")]
    pub password2: String,

    #[serde(default)]
    pub is_staff: bool,
}

impl EmployeeForm {
    /// Check that no other account uses the same username.
    pub async fn check_username<C, E>(&self, db: &C, current_id: Option<i64>) -> Result<(), E>
    where
        C: ConnectionTrait + Send,
        E: From<DbErr> + From<ValidationErrors>,
    {
        let mut select = user::Entity::find()
            .select_only()
            .filter(user::Column::Username.eq(self.username.as_str()));

        if let Some(id) = current_id {
            select = select.filter(user::Column::Id.ne(id));
        }

        if select.exists(db).await? {
            Err(field_error(
                "username",
                "unique",
                "user with this username already exists",
            )
            .into())
        } else {
            Ok(())
        }
    }
}
