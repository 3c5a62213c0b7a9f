//! Submitted support ticket.

use sea_orm::entity::prelude::*;

/// Max problem title length.
pub const TITLE_MAX_LENGTH: u64 = 200;

/// Max problem description length.
pub const DESCRIPTION_MAX_LENGTH: u64 = 300;

/// Problem model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "problems")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub direction_id: i64,
    pub author_id: i64,
    pub created_at: TimeDateTime,
    pub updated_at: TimeDateTime,
}

/// Problem model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::direction::Entity",
        from = "Column::DirectionId",
        to = "super::direction::Column::Id"
    )]
    Direction,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::problem_file::Entity")]
    Files,

    #[sea_orm(has_many = "super::solution::Entity")]
    Solutions,
}

impl Related<super::direction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Direction.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::problem_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::solution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Solutions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
