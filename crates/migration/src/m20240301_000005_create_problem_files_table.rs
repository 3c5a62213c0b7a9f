use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProblemFiles::Table)
                    .col(
                        ColumnDef::new(ProblemFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProblemFiles::ProblemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProblemFiles::File).string().not_null())
                    .col(
                        ColumnDef::new(ProblemFiles::UploadedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProblemFiles::Table, ProblemFiles::ProblemId)
                            .to(crate::Problems::Table, crate::Problems::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProblemFiles::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
enum ProblemFiles {
    Table,
    Id,
    ProblemId,
    File,
    UploadedAt,
}
