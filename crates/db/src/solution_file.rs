//! File attached to a solution.
//!
//! File contents are kept on disk, see the `common::storage` module,
//! while the database only stores a path relative to the media root.

use sea_orm::entity::prelude::*;

/// Solution file model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "solution_files")]
pub struct Model {
    /// Unique file identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Related solution identifier.
    pub solution_id: i64,

    /// Path relative to the media root, `solutions/<solution id>/<filename>`.
    pub file: String,

    /// File upload timestamp.
    pub uploaded_at: TimeDateTime,
}

/// Solution file model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::solution::Entity",
        from = "Column::SolutionId",
        to = "super::solution::Column::Id"
    )]
    Solution,
}

impl Related<super::solution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Solution.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
