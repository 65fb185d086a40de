use crate::{entity::setting, prelude::*};

/// Local settings cache.
pub struct Settings<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Settings<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn get(&self, key: &str) -> Result<Option<String>> {
    let row = setting::Entity::find_by_id(key).one(self.db).await?;
    Ok(row.map(|row| row.value))
  }

  pub async fn set(&self, key: &str, value: &str) -> Result<()> {
    let now = Utc::now().naive_utc();
    let row = setting::ActiveModel {
      key: Set(key.to_string()),
      value: Set(value.to_string()),
      updated_at: Set(now),
    };

    setting::Entity::insert(row)
      .on_conflict(
        sea_orm::sea_query::OnConflict::column(setting::Column::Key)
          .update_columns([setting::Column::Value, setting::Column::UpdatedAt])
          .to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;

    Ok(())
  }

  pub async fn remove(&self, key: &str) -> Result<bool> {
    let res = setting::Entity::delete_by_id(key).exec(self.db).await?;
    Ok(res.rows_affected > 0)
  }

  pub async fn all(&self) -> Result<Vec<setting::Model>> {
    Ok(
      setting::Entity::find()
        .order_by_asc(setting::Column::Key)
        .all(self.db)
        .await?,
    )
  }
}
