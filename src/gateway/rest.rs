//! PostgREST + storage client for the hosted backend.

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;

use super::backend::{Backend, Table};
use crate::prelude::*;

/// Only hosts under this suffix are accepted as backend URLs.
pub const HOST_SUFFIX: &str = ".supabase.co";

/// Validate a backend URL: https, and a host strictly below [`HOST_SUFFIX`].
pub fn validate_url(url: &str) -> Option<Url> {
  let url = Url::parse(url.trim()).ok()?;
  if url.scheme() != "https" {
    return None;
  }

  let host = url.host_str()?;
  let project = host.strip_suffix(HOST_SUFFIX)?;
  if project.is_empty() || project.contains('.') {
    return None;
  }

  Some(url)
}

pub struct RestBackend {
  client: Client,
  base: Url,
  key: String,
  bucket: String,
}

#[derive(Debug, Deserialize)]
struct SettingRow {
  value: String,
}

impl RestBackend {
  pub fn new(base: Url, key: impl Into<String>, bucket: impl Into<String>) -> Self {
    Self {
      client: Client::new(),
      base,
      key: key.into(),
      bucket: bucket.into(),
    }
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|err| Error::Internal(format!("bad backend path `{path}`: {err}")))
  }

  fn table(&self, table: Table) -> Result<Url> {
    self.endpoint(&format!("rest/v1/{}", table.name()))
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    request.header("apikey", self.key.as_str()).bearer_auth(&self.key)
  }

  async fn send(&self, request: RequestBuilder) -> Result<Response> {
    let response = self.authorize(request).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Backend { status: status.as_u16(), body });
    }
    Ok(response)
  }
}

#[async_trait]
impl Backend for RestBackend {
  async fn list(&self, table: Table) -> Result<Vec<json::Value>> {
    let mut query = vec![("select", "*")];
    if let Some(order) = table.order() {
      query.push(("order", order));
    }

    let request = self.client.get(self.table(table)?).query(&query);
    Ok(self.send(request).await?.json().await?)
  }

  async fn insert(&self, table: Table, row: json::Value) -> Result<()> {
    let request = self
      .client
      .post(self.table(table)?)
      .header("Prefer", "return=minimal")
      .json(&row);
    self.send(request).await?;
    Ok(())
  }

  async fn update(
    &self,
    table: Table,
    id: &str,
    row: json::Value,
  ) -> Result<()> {
    let request = self
      .client
      .patch(self.table(table)?)
      .query(&[("id", format!("eq.{id}"))])
      .header("Prefer", "return=minimal")
      .json(&row);
    self.send(request).await?;
    Ok(())
  }

  async fn delete(&self, table: Table, id: &str) -> Result<()> {
    let request =
      self.client.delete(self.table(table)?).query(&[("id", format!("eq.{id}"))]);
    self.send(request).await?;
    Ok(())
  }

  async fn setting(&self, key: &str) -> Result<Option<String>> {
    let request = self
      .client
      .get(self.endpoint("rest/v1/settings")?)
      .query(&[("select", "value".to_string()), ("key", format!("eq.{key}"))]);

    let rows: Vec<SettingRow> = self.send(request).await?.json().await?;
    Ok(rows.into_iter().next().map(|row| row.value))
  }

  async fn upsert_setting(&self, key: &str, value: &str) -> Result<()> {
    let request = self
      .client
      .post(self.endpoint("rest/v1/settings")?)
      .header("Prefer", "resolution=merge-duplicates,return=minimal")
      .json(&json::json!({ "key": key, "value": value }));
    self.send(request).await?;
    Ok(())
  }

  async fn upload(
    &self,
    path: &str,
    content_type: &str,
    bytes: Vec<u8>,
  ) -> Result<String> {
    let object = format!("{}/{}", self.bucket, path.trim_start_matches('/'));
    let request = self
      .client
      .post(self.endpoint(&format!("storage/v1/object/{object}"))?)
      .header(reqwest::header::CONTENT_TYPE, content_type)
      .header("x-upsert", "true")
      .body(bytes);
    self.send(request).await?;

    Ok(self.endpoint(&format!("storage/v1/object/public/{object}"))?.to_string())
  }
}
