use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(LocalEntities::Table)
          .if_not_exists()
          .col(ColumnDef::new(LocalEntities::Id).string().not_null())
          .col(ColumnDef::new(LocalEntities::Kind).string().not_null())
          .col(ColumnDef::new(LocalEntities::Payload).text().not_null())
          .col(ColumnDef::new(LocalEntities::UpdatedAt).date_time().not_null())
          .primary_key(
            Index::create().col(LocalEntities::Kind).col(LocalEntities::Id),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(LocalEntities::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum LocalEntities {
  Table,
  Id,
  Kind,
  Payload,
  UpdatedAt,
}
