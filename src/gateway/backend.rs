use crate::prelude::*;

/// Tables of the hosted backend holding portal entities.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Table {
  Items,
  DropMaps,
  StaffApplications,
}

impl Table {
  pub fn name(self) -> &'static str {
    match self {
      Table::Items => "items",
      Table::DropMaps => "drop_maps",
      Table::StaffApplications => "staff_applications",
    }
  }

  /// Listing order as a PostgREST `order` value.
  pub fn order(self) -> Option<&'static str> {
    match self {
      Table::Items => None,
      Table::DropMaps | Table::StaffApplications => Some("created_at.desc"),
    }
  }
}

/// Hosted database-and-storage backend.
///
/// Rows travel as JSON so the trait stays object safe; typing happens in
/// [`super::Gateway`].
#[async_trait]
pub trait Backend: Send + Sync {
  async fn list(&self, table: Table) -> Result<Vec<json::Value>>;

  async fn insert(&self, table: Table, row: json::Value) -> Result<()>;

  async fn update(&self, table: Table, id: &str, row: json::Value)
  -> Result<()>;

  async fn delete(&self, table: Table, id: &str) -> Result<()>;

  async fn setting(&self, key: &str) -> Result<Option<String>>;

  async fn upsert_setting(&self, key: &str, value: &str) -> Result<()>;

  /// Upload an object and return its public URL.
  async fn upload(
    &self,
    path: &str,
    content_type: &str,
    bytes: Vec<u8>,
  ) -> Result<String>;
}
