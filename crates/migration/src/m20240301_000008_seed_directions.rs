use db::direction::Code;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(crate::Directions::Table)
            .columns([crate::Directions::Code, crate::Directions::DisplayName])
            .to_owned();

        for code in Code::ALL {
            insert.values_panic([code.as_str().into(), code.label().into()]);
        }

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&insert)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(crate::Directions::Table)
            .and_where(
                Expr::col(crate::Directions::Code).is_in(Code::ALL.map(|code| code.as_str())),
            )
            .to_owned();

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&delete)).await?;

        Ok(())
    }
}
