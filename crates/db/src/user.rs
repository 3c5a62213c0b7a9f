//! Employee account.
//!
//! Accounts are created by superusers only, there is no self-registration.
//! Staff accounts are allowed to edit problems, while superuser accounts
//! manage other employees and have access to the administrative panel.

use sea_orm::entity::prelude::*;

/// Max username length.
pub const USERNAME_MAX_LENGTH: u64 = 150;

/// Max length of both first and last names.
pub const NAME_MAX_LENGTH: u64 = 30;

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Password hash in the PHC string format.
    pub password: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: TimeDateTime,
}

/// User model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::token::Entity")]
    Tokens,

    #[sea_orm(has_many = "super::problem::Entity")]
    Problems,

    #[sea_orm(has_many = "super::solution::Entity")]
    Solutions,
}

impl Related<super::token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl Related<super::problem::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Problems.def()
    }
}

impl Related<super::solution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Solutions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
