//! Bearer tokens of helpdesk employees.
//!
//! A token is handed out by the login route and sent back in the
//! `Authorization` header. Logging out deletes it, and deleting an employee
//! removes every token of theirs. A token of a deactivated employee stays
//! in the table but no longer authenticates anyone.

use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use sea_orm::{entity::prelude::*, ActiveValue};

/// Number of alphanumeric characters in a token.
pub const TOKEN_LENGTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "authentication_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Employee the token was issued to.
    pub user_id: i64,

    pub token: String,
    pub created_at: TimeDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Issue a fresh token to an employee.
///
/// Returns the record to insert along with the value handed to the client.
///
/// ```
/// use db::token::{issue, well_formed};
///
/// let (_, value) = issue(1);
/// assert!(well_formed(&value));
/// ```
pub fn issue(user_id: i64) -> (ActiveModel, String) {
    let value = Alphanumeric.sample_string(&mut thread_rng(), TOKEN_LENGTH);

    let model = ActiveModel {
        user_id: ActiveValue::Set(user_id),
        token: ActiveValue::Set(value.clone()),
        created_at: ActiveValue::Set(crate::now()),
        ..Default::default()
    };

    (model, value)
}

/// Whether a presented value could have been issued by [`issue`].
///
/// Malformed values are rejected without a database lookup.
pub fn well_formed(value: &str) -> bool {
    value.len() == TOKEN_LENGTH && value.bytes().all(|byte| byte.is_ascii_alphanumeric())
}
