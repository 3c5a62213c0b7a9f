//! Proposed resolution of a problem.
//!
//! Only a single solution of a problem is expected to be accepted at a time.
//! This is not enforced by a database constraint, instead every code path that
//! accepts a solution clears the flag on the rest of problem's solutions
//! inside of the same transaction.

use sea_orm::{entity::prelude::*, sea_query::Expr, QueryOrder, Select};

/// Max solution description length.
pub const DESCRIPTION_MAX_LENGTH: u64 = 800;

/// Solution model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "solutions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub problem_id: i64,
    pub description: String,
    pub author_id: i64,
    pub created_at: TimeDateTime,
    pub is_accepted: bool,
}

/// Solution model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::problem::Entity",
        from = "Column::ProblemId",
        to = "super::problem::Column::Id"
    )]
    Problem,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::solution_file::Entity")]
    Files,
}

impl Related<super::problem::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Problem.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::solution_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Order solutions the way they are displayed: accepted first, then newest first.
pub fn display_order(select: Select<Entity>) -> Select<Entity> {
    select
        .order_by_desc(Column::IsAccepted)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// Accept a solution of a problem.
///
/// Clears the accepted flag on every other solution of the problem.
/// Callers are expected to run this inside of a transaction.
pub async fn accept<C: ConnectionTrait>(
    db: &C,
    problem_id: i64,
    solution_id: i64,
) -> Result<(), DbErr> {
    Entity::update_many()
        .col_expr(Column::IsAccepted, Expr::value(false))
        .filter(Column::ProblemId.eq(problem_id))
        .filter(Column::Id.ne(solution_id))
        .exec(db)
        .await?;

    Entity::update_many()
        .col_expr(Column::IsAccepted, Expr::value(true))
        .filter(Column::ProblemId.eq(problem_id))
        .filter(Column::Id.eq(solution_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Clear the accepted flag on every solution of the provided problems.
pub async fn unaccept_all<C: ConnectionTrait>(db: &C, problem_ids: Vec<i64>) -> Result<u64, DbErr> {
    let result = Entity::update_many()
        .col_expr(Column::IsAccepted, Expr::value(false))
        .filter(Column::ProblemId.is_in(problem_ids))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
