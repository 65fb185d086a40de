//! Remote data gateway.
//!
//! Every read and write of portal entities goes through [`Gateway`]. When the
//! hosted backend is not configured reads come back empty and writes fail
//! with [`Error::CloudNotConfigured`]. Backend failures on reads are logged
//! and degrade to empty results.

pub mod backend;
pub mod rest;

use serde::{Serialize, de::DeserializeOwned};

pub use self::backend::{Backend, Table};
use crate::{
  model::{self, ApplicationStatus, DropMap, Item, StaffApplication},
  prelude::*,
  sv,
};

#[derive(Debug, Clone, Default)]
pub struct CloudConfig {
  pub url: Option<String>,
  pub key: Option<String>,
  pub bucket: String,
}

#[derive(Clone)]
pub struct Gateway {
  backend: Option<Arc<dyn Backend>>,
  db: DatabaseConnection,
}

impl Gateway {
  pub fn new(config: &CloudConfig, db: DatabaseConnection) -> Self {
    let backend = match (config.url.as_deref(), config.key.as_deref()) {
      (Some(url), Some(key)) if !key.trim().is_empty() => {
        match rest::validate_url(url) {
          Some(url) => {
            info!("Cloud backend configured at {url}");
            Some(Arc::new(rest::RestBackend::new(url, key.trim(), &config.bucket))
              as Arc<dyn Backend>)
          }
          None => {
            warn!("Rejecting cloud URL `{url}`, running without cloud");
            None
          }
        }
      }
      _ => {
        warn!("Cloud not configured, running with local storage only");
        None
      }
    };

    Self { backend, db }
  }

  #[cfg(test)]
  pub fn with_backend(
    backend: Option<Arc<dyn Backend>>,
    db: DatabaseConnection,
  ) -> Self {
    Self { backend, db }
  }

  pub fn is_configured(&self) -> bool {
    self.backend.is_some()
  }

  fn backend(&self) -> Result<&dyn Backend> {
    self.backend.as_deref().ok_or(Error::CloudNotConfigured)
  }

  async fn read<T: DeserializeOwned>(&self, table: Table) -> Vec<T> {
    let Some(backend) = self.backend.as_deref() else {
      return Vec::new();
    };

    let rows = match backend.list(table).await {
      Ok(rows) => rows,
      Err(err) => {
        warn!("Failed to read `{}`: {err}", table.name());
        return Vec::new();
      }
    };

    rows
      .into_iter()
      .filter_map(|row| match json::from_value(row) {
        Ok(entity) => Some(entity),
        Err(err) => {
          warn!("Skipping malformed `{}` row: {err}", table.name());
          None
        }
      })
      .collect()
  }

  async fn insert<T: Serialize>(&self, table: Table, entity: &T) -> Result<()> {
    self.backend()?.insert(table, json::to_value(entity)?).await
  }

  async fn update<T: Serialize>(
    &self,
    table: Table,
    id: &str,
    entity: &T,
  ) -> Result<()> {
    self.backend()?.update(table, id, json::to_value(entity)?).await
  }

  pub async fn items(&self) -> Vec<Item> {
    self.read(Table::Items).await
  }

  pub async fn add_item(&self, mut item: Item) -> Result<Item> {
    if item.id.is_empty() {
      item.id = model::new_id();
    }
    self.insert(Table::Items, &item).await?;
    Ok(item)
  }

  pub async fn update_item(&self, item: &Item) -> Result<()> {
    self.update(Table::Items, &item.id, item).await
  }

  pub async fn delete_item(&self, id: &str) -> Result<()> {
    self.backend()?.delete(Table::Items, id).await
  }

  pub async fn drop_maps(&self) -> Vec<DropMap> {
    self.read(Table::DropMaps).await
  }

  pub async fn add_drop_map(&self, mut map: DropMap) -> Result<DropMap> {
    if map.id.is_empty() {
      map.id = model::new_id();
    }
    self.insert(Table::DropMaps, &map).await?;
    Ok(map)
  }

  /// Replace the stored map with the same id.
  pub async fn update_drop_map(&self, map: &DropMap) -> Result<()> {
    self.update(Table::DropMaps, &map.id, map).await
  }

  pub async fn delete_drop_map(&self, id: &str) -> Result<()> {
    self.backend()?.delete(Table::DropMaps, id).await
  }

  pub async fn staff_applications(&self) -> Vec<StaffApplication> {
    self.read(Table::StaffApplications).await
  }

  pub async fn add_staff_application(
    &self,
    application: &StaffApplication,
  ) -> Result<()> {
    self.insert(Table::StaffApplications, application).await
  }

  pub async fn set_application_status(
    &self,
    id: &str,
    status: ApplicationStatus,
  ) -> Result<()> {
    let patch = json::json!({ "status": status });
    self.backend()?.update(Table::StaffApplications, id, patch).await
  }

  pub async fn delete_staff_application(&self, id: &str) -> Result<()> {
    self.backend()?.delete(Table::StaffApplications, id).await
  }

  pub async fn upload_image(
    &self,
    name: &str,
    content_type: &str,
    bytes: Vec<u8>,
  ) -> Result<String> {
    let path = format!("{}-{}", Utc::now().timestamp_millis(), name);
    self.backend()?.upload(&path, content_type, bytes).await
  }

  /// Read a setting: local cache first, then the backend.
  ///
  /// A backend hit is not written back to the local cache.
  pub async fn setting(&self, key: &str) -> Option<String> {
    match sv::Settings::new(&self.db).get(key).await {
      Ok(Some(value)) => return Some(value),
      Ok(None) => {}
      Err(err) => warn!("Local setting `{key}` unreadable: {err}"),
    }

    let backend = self.backend.as_deref()?;
    match backend.setting(key).await {
      Ok(value) => value,
      Err(err) => {
        warn!("Failed to read setting `{key}`: {err}");
        None
      }
    }
  }

  /// Write a setting locally and, when configured, to the backend.
  ///
  /// Only the local write can fail the call.
  pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
    sv::Settings::new(&self.db).set(key, value).await?;

    if let Some(backend) = self.backend.as_deref()
      && let Err(err) = backend.upsert_setting(key, value).await
    {
      warn!("Setting `{key}` saved locally only: {err}");
    }

    Ok(())
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::{
    model::{Category, MobEntry},
    sv::memory_db,
  };

  /// In-memory backend standing in for the hosted one.
  #[derive(Default)]
  pub struct MemoryBackend {
    pub rows: Mutex<HashMap<Table, Vec<json::Value>>>,
    pub settings: Mutex<HashMap<String, String>>,
    pub failing: bool,
  }

  impl MemoryBackend {
    pub fn failing() -> Self {
      Self { failing: true, ..Default::default() }
    }

    fn check(&self) -> Result<()> {
      if self.failing {
        return Err(Error::Backend { status: 503, body: "down".into() });
      }
      Ok(())
    }
  }

  #[async_trait]
  impl Backend for MemoryBackend {
    async fn list(&self, table: Table) -> Result<Vec<json::Value>> {
      self.check()?;
      Ok(self.rows.lock().unwrap().get(&table).cloned().unwrap_or_default())
    }

    async fn insert(&self, table: Table, row: json::Value) -> Result<()> {
      self.check()?;
      self.rows.lock().unwrap().entry(table).or_default().push(row);
      Ok(())
    }

    async fn update(
      &self,
      table: Table,
      id: &str,
      patch: json::Value,
    ) -> Result<()> {
      self.check()?;
      let mut rows = self.rows.lock().unwrap();
      let row = rows
        .entry(table)
        .or_default()
        .iter_mut()
        .find(|row| row["id"] == id)
        .ok_or(Error::NotFound("Row"))?;

      if let (Some(row), Some(patch)) = (row.as_object_mut(), patch.as_object())
      {
        for (key, value) in patch {
          row.insert(key.clone(), value.clone());
        }
      }
      Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
      self.check()?;
      self.rows.lock().unwrap().entry(table).or_default().retain(|r| r["id"] != id);
      Ok(())
    }

    async fn setting(&self, key: &str) -> Result<Option<String>> {
      self.check()?;
      Ok(self.settings.lock().unwrap().get(key).cloned())
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<()> {
      self.check()?;
      self.settings.lock().unwrap().insert(key.into(), value.into());
      Ok(())
    }

    async fn upload(
      &self,
      path: &str,
      _content_type: &str,
      _bytes: Vec<u8>,
    ) -> Result<String> {
      self.check()?;
      Ok(format!("memory://{path}"))
    }
  }

  pub async fn memory_gateway() -> (Gateway, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::default());
    let gateway = Gateway::with_backend(
      Some(backend.clone() as Arc<dyn Backend>),
      memory_db().await,
    );
    (gateway, backend)
  }

  #[tokio::test]
  async fn test_unconfigured_reads_empty_writes_fail() {
    let gateway = Gateway::new(&CloudConfig::default(), memory_db().await);
    assert!(!gateway.is_configured());

    assert!(gateway.items().await.is_empty());
    assert!(gateway.drop_maps().await.is_empty());
    assert!(gateway.staff_applications().await.is_empty());

    let item = Item::new("Lobo", Category::Mount, "/lobo.png");
    let err = gateway.add_item(item).await.unwrap_err();
    assert!(matches!(err, Error::CloudNotConfigured));
    assert!(err.to_string().contains("Cloud not configured"));

    assert!(matches!(
      gateway.delete_drop_map("x").await,
      Err(Error::CloudNotConfigured)
    ));
  }

  #[tokio::test]
  async fn test_invalid_url_is_unconfigured() {
    let config = CloudConfig {
      url: Some("https://abcd.supabase.co.evil.com".into()),
      key: Some("key".into()),
      bucket: "images".into(),
    };
    let gateway = Gateway::new(&config, memory_db().await);
    assert!(!gateway.is_configured());
  }

  #[tokio::test]
  async fn test_failing_backend_degrades_reads() {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::failing());
    let gateway = Gateway::with_backend(Some(backend), memory_db().await);

    assert!(gateway.items().await.is_empty());
    assert_eq!(gateway.setting("site_logo").await, None);

    let item = Item::new("Lobo", Category::Mount, "/lobo.png");
    assert!(matches!(
      gateway.add_item(item).await,
      Err(Error::Backend { status: 503, .. })
    ));
  }

  #[tokio::test]
  async fn test_item_crud() {
    let (gateway, _) = memory_gateway().await;

    let item = gateway
      .add_item(Item::new("Lobo", Category::Mount, "/lobo.png"))
      .await
      .unwrap();
    assert!(!item.id.is_empty());

    let mut renamed = item.clone();
    renamed.name = "Lobo blanco".into();
    gateway.update_item(&renamed).await.unwrap();
    assert_eq!(gateway.items().await, vec![renamed]);

    gateway.delete_item(&item.id).await.unwrap();
    assert!(gateway.items().await.is_empty());
  }

  #[tokio::test]
  async fn test_drop_map_replaced_by_id() {
    let (gateway, _) = memory_gateway().await;

    let map = DropMap {
      name: "Cantabria".into(),
      image: "/c.png".into(),
      ..Default::default()
    };
    let mut map = gateway.add_drop_map(map).await.unwrap();
    map.mobs.push(MobEntry::new("Orco", "#ff0000"));
    gateway.update_drop_map(&map).await.unwrap();

    assert_eq!(gateway.drop_maps().await, vec![map]);
  }

  #[tokio::test]
  async fn test_local_setting_wins_over_remote() {
    let (gateway, backend) = memory_gateway().await;

    backend.settings.lock().unwrap().insert("site_logo".into(), "/remote.png".into());
    sv::Settings::new(&gateway.db).set("site_logo", "/local.png").await.unwrap();

    assert_eq!(gateway.setting("site_logo").await.as_deref(), Some("/local.png"));
  }

  #[tokio::test]
  async fn test_remote_hit_does_not_populate_cache() {
    let (gateway, backend) = memory_gateway().await;
    backend.settings.lock().unwrap().insert("motd".into(), "hola".into());

    assert_eq!(gateway.setting("motd").await.as_deref(), Some("hola"));
    assert_eq!(sv::Settings::new(&gateway.db).get("motd").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_set_setting_survives_remote_failure() {
    let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::failing());
    let gateway = Gateway::with_backend(Some(backend), memory_db().await);

    gateway.set_setting("site_logo", "/logo.png").await.unwrap();
    assert_eq!(gateway.setting("site_logo").await.as_deref(), Some("/logo.png"));
  }

  #[tokio::test]
  async fn test_set_setting_writes_both() {
    let (gateway, backend) = memory_gateway().await;

    gateway.set_setting("site_logo", "/logo.png").await.unwrap();
    assert_eq!(
      backend.settings.lock().unwrap().get("site_logo").map(String::as_str),
      Some("/logo.png")
    );
  }
}
