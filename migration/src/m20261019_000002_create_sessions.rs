use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Sessions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Sessions::SessionId).string().not_null().primary_key(),
          )
          .col(ColumnDef::new(Sessions::DiscordId).string().not_null())
          .col(ColumnDef::new(Sessions::Name).string().not_null())
          .col(ColumnDef::new(Sessions::AvatarUrl).string().not_null())
          .col(ColumnDef::new(Sessions::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_sessions_discord_id")
          .table(Sessions::Table)
          .col(Sessions::DiscordId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Sessions::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Sessions {
  Table,
  SessionId,
  DiscordId,
  Name,
  AvatarUrl,
  CreatedAt,
}
