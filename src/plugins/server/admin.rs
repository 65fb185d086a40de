use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

use super::handlers::Ack;
use crate::{
  admin::{EditorView, Setting, Stored, SyncApplied, SyncExport},
  editor::{Action, Editor},
  model::{ApplicationStatus, DropMap, Identity, Item, StaffApplication},
  prelude::*,
  state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MeRes {
  #[serde(flatten)]
  pub identity: Identity,
  /// False when saves only reach the local store.
  pub cloud: bool,
}

pub async fn me(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<MeRes>> {
  let identity = app.admin(&headers).await?.identity().clone();
  Ok(Json(MeRes { identity, cloud: app.gateway.is_configured() }))
}

pub async fn items(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<Item>>> {
  Ok(Json(app.admin(&headers).await?.items().await?))
}

pub async fn create_item(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(mut item): Json<Item>,
) -> Result<Json<Stored<Item>>> {
  let admin = app.admin(&headers).await?;
  item.id.clear();
  Ok(Json(admin.save_item(item).await?))
}

pub async fn update_item(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<String>,
  Json(mut item): Json<Item>,
) -> Result<Json<Stored<Item>>> {
  let admin = app.admin(&headers).await?;
  item.id = id;
  Ok(Json(admin.save_item(item).await?))
}

pub async fn delete_item(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<String>,
) -> Result<Json<Ack>> {
  app.admin(&headers).await?.delete_item(&id).await?;
  Ok(Ack::ok())
}

pub async fn drop_maps(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<DropMap>>> {
  Ok(Json(app.admin(&headers).await?.drop_maps().await?))
}

pub async fn delete_drop_map(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<String>,
) -> Result<Json<Ack>> {
  app.admin(&headers).await?.delete_drop_map(&id).await?;
  Ok(Ack::ok())
}

pub async fn edit_drop_map(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<String>,
) -> Result<Json<Editor>> {
  Ok(Json(app.admin(&headers).await?.edit(&id)?))
}

pub async fn editor(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Editor>> {
  Ok(Json(app.admin(&headers).await?.editor()))
}

pub async fn editor_action(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(action): Json<Action>,
) -> Result<Json<EditorView>> {
  Ok(Json(app.admin(&headers).await?.apply(action)?))
}

pub async fn editor_save(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Stored<DropMap>>> {
  Ok(Json(app.admin(&headers).await?.save_drop_map().await?))
}

pub async fn applications(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<StaffApplication>>> {
  Ok(Json(app.admin(&headers).await?.applications().await))
}

#[derive(Debug, Deserialize)]
pub struct StatusReq {
  pub status: ApplicationStatus,
}

pub async fn set_status(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<String>,
  Json(req): Json<StatusReq>,
) -> Result<Json<Ack>> {
  app.admin(&headers).await?.set_status(&id, req.status).await?;
  Ok(Ack::ok())
}

pub async fn delete_application(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<String>,
) -> Result<Json<Ack>> {
  app.admin(&headers).await?.delete_application(&id).await?;
  Ok(Ack::ok())
}

pub async fn settings(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<Setting>>> {
  Ok(Json(app.admin(&headers).await?.settings().await?))
}

pub async fn setting(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(key): Path<String>,
) -> Result<Json<Setting>> {
  Ok(Json(app.admin(&headers).await?.setting(&key).await?))
}

#[derive(Debug, Deserialize)]
pub struct SettingReq {
  pub value: String,
}

pub async fn set_setting(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(key): Path<String>,
  Json(req): Json<SettingReq>,
) -> Result<Json<Ack>> {
  app.admin(&headers).await?.set_setting(&key, &req.value).await?;
  Ok(Ack::ok())
}

pub async fn delete_setting(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(key): Path<String>,
) -> Result<Json<Ack>> {
  app.admin(&headers).await?.delete_setting(&key).await?;
  Ok(Ack::ok())
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UploadRes {
  pub url: String,
}

/// Raw image body; the file name comes from the query string.
pub async fn upload(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<UploadQuery>,
  body: Bytes,
) -> Result<Json<UploadRes>> {
  let admin = app.admin(&headers).await?;
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .unwrap_or_default();

  let url = admin.upload(&query.name, content_type, body.to_vec()).await?;
  Ok(Json(UploadRes { url }))
}

pub async fn export(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<SyncExport>> {
  Ok(Json(app.admin(&headers).await?.export().await?))
}

#[derive(Debug, Deserialize)]
pub struct SyncApplyReq {
  /// Page URL carrying the `sync` parameter.
  pub url: String,
}

pub async fn sync_apply(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(req): Json<SyncApplyReq>,
) -> Result<Json<SyncApplied>> {
  Ok(Json(app.admin(&headers).await?.apply_sync(&req.url).await?))
}
