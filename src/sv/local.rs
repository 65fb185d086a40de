use serde::{Serialize, de::DeserializeOwned};

use crate::{
  entity::{EntityKind, local_entity},
  model::{DropMap, Item},
  prelude::*,
};

/// Entities saved locally while the hosted backend is not configured.
pub struct Local<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Local<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  async fn put<T: Serialize>(
    &self,
    kind: EntityKind,
    id: &str,
    entity: &T,
  ) -> Result<()> {
    let row = local_entity::ActiveModel {
      kind: Set(kind),
      id: Set(id.to_string()),
      payload: Set(json::to_string(entity)?),
      updated_at: Set(Utc::now().naive_utc()),
    };

    local_entity::Entity::insert(row)
      .on_conflict(
        sea_orm::sea_query::OnConflict::columns([
          local_entity::Column::Kind,
          local_entity::Column::Id,
        ])
        .update_columns([
          local_entity::Column::Payload,
          local_entity::Column::UpdatedAt,
        ])
        .to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;

    Ok(())
  }

  async fn list<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<T>> {
    let rows = local_entity::Entity::find()
      .filter(local_entity::Column::Kind.eq(kind))
      .order_by_asc(local_entity::Column::UpdatedAt)
      .all(self.db)
      .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
      match json::from_str(&row.payload) {
        Ok(entity) => out.push(entity),
        Err(err) => warn!("Skipping corrupt local {:?} `{}`: {err}", kind, row.id),
      }
    }
    Ok(out)
  }

  async fn remove(&self, kind: EntityKind, id: &str) -> Result<bool> {
    let res = local_entity::Entity::delete_by_id((kind, id.to_string()))
      .exec(self.db)
      .await?;
    Ok(res.rows_affected > 0)
  }

  pub async fn put_item(&self, item: &Item) -> Result<()> {
    self.put(EntityKind::Item, &item.id, item).await
  }

  pub async fn items(&self) -> Result<Vec<Item>> {
    self.list(EntityKind::Item).await
  }

  pub async fn remove_item(&self, id: &str) -> Result<bool> {
    self.remove(EntityKind::Item, id).await
  }

  pub async fn put_drop_map(&self, map: &DropMap) -> Result<()> {
    self.put(EntityKind::DropMap, &map.id, map).await
  }

  pub async fn drop_maps(&self) -> Result<Vec<DropMap>> {
    self.list(EntityKind::DropMap).await
  }

  pub async fn remove_drop_map(&self, id: &str) -> Result<bool> {
    self.remove(EntityKind::DropMap, id).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{model::Category, sv::memory_db};

  #[tokio::test]
  async fn test_put_replaces_by_id() {
    let db = memory_db().await;
    let sv = Local::new(&db);

    let mut item = Item::new("Lobo", Category::Mount, "/lobo.png");
    item.id = "local-1".into();
    sv.put_item(&item).await.unwrap();

    item.name = "Lobo blanco".into();
    sv.put_item(&item).await.unwrap();

    let items = sv.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Lobo blanco");
  }

  #[tokio::test]
  async fn test_kinds_are_separate() {
    let db = memory_db().await;
    let sv = Local::new(&db);

    let mut item = Item::new("Lobo", Category::Mount, "/lobo.png");
    item.id = "same".into();
    sv.put_item(&item).await.unwrap();

    let map = DropMap { id: "same".into(), ..Default::default() };
    sv.put_drop_map(&map).await.unwrap();

    assert!(sv.remove_drop_map("same").await.unwrap());
    assert_eq!(sv.items().await.unwrap().len(), 1);
    assert!(sv.drop_maps().await.unwrap().is_empty());
  }
}
