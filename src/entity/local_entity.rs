use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  EnumIter,
  DeriveActiveEnum,
  Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EntityKind {
  #[sea_orm(string_value = "item")]
  Item,
  #[sea_orm(string_value = "drop_map")]
  DropMap,
}

/// Entity saved locally while the hosted backend was not configured.
/// `payload` holds the entity exactly as it would be sent to the backend.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "local_entities")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub kind: EntityKind,
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(column_type = "Text")]
  pub payload: String,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
