//! File attached to a problem.
//!
//! File contents are kept on disk, see the `common::storage` module,
//! while the database only stores a path relative to the media root.

use sea_orm::entity::prelude::*;

/// Problem file model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "problem_files")]
pub struct Model {
    /// Unique file identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Related problem identifier.
    pub problem_id: i64,

    /// Path relative to the media root, `problems/<problem id>/<filename>`.
    pub file: String,

    /// File upload timestamp.
    pub uploaded_at: TimeDateTime,
}

/// Problem file model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::problem::Entity",
        from = "Column::ProblemId",
        to = "super::problem::Column::Id"
    )]
    Problem,
}

impl Related<super::problem::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Problem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
