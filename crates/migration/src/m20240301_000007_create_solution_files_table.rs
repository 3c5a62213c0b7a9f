use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SolutionFiles::Table)
                    .col(
                        ColumnDef::new(SolutionFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SolutionFiles::SolutionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SolutionFiles::File).string().not_null())
                    .col(
                        ColumnDef::new(SolutionFiles::UploadedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SolutionFiles::Table, SolutionFiles::SolutionId)
                            .to(crate::Solutions::Table, crate::Solutions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SolutionFiles::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
enum SolutionFiles {
    Table,
    Id,
    SolutionId,
    File,
    UploadedAt,
}
