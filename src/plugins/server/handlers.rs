use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
  catalogue::{Filter, ItemCard, RarityStyle, rarity_style},
  editor::Rect,
  identity::{self, Capability, Completed},
  model::{
    Category, DropMap, Faction, Identity, Rarity, StaffApplication, classes_of,
  },
  portal::{ApplicationForm, SupportForm},
  prelude::*,
  state::{AppState, session_id},
  viewer::{Marker, MobCard},
};

#[derive(Debug, Serialize)]
pub struct Ack {
  pub success: bool,
}

impl Ack {
  pub fn ok() -> Json<Self> {
    Json(Self { success: true })
  }
}

pub async fn health() -> &'static str {
  "OK"
}

pub async fn catalogue(
  State(app): State<Arc<AppState>>,
  Query(filter): Query<Filter>,
) -> Json<Vec<ItemCard>> {
  Json(app.portal().catalogue(&filter))
}

pub async fn classes(
  Path(faction): Path<Faction>,
) -> Json<&'static [&'static str]> {
  Json(classes_of(faction))
}

pub async fn rarities() -> Json<Vec<RarityStyle>> {
  Json(
    Rarity::ALL.into_iter().map(|rarity| rarity_style(Some(rarity))).collect(),
  )
}

pub async fn drop_maps(
  State(app): State<Arc<AppState>>,
) -> Json<Vec<DropMap>> {
  Json(app.portal().drop_maps())
}

#[derive(Debug, Serialize)]
pub struct DropMapView {
  #[serde(flatten)]
  pub map: DropMap,
  pub cards: Vec<MobCard>,
}

pub async fn drop_map(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<DropMapView>> {
  let portal = app.portal();
  let map = portal.drop_map(&id)?;
  let cards = portal.mob_cards(&id)?;
  Ok(Json(DropMapView { map, cards }))
}

pub async fn overlay(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(rect): Query<Rect>,
) -> Result<Json<Vec<Marker>>> {
  Ok(Json(app.portal().overlay(&id, rect)?))
}

#[derive(Debug, Serialize)]
pub struct LogoRes {
  pub logo: Option<String>,
}

pub async fn logo(State(app): State<Arc<AppState>>) -> Json<LogoRes> {
  Json(LogoRes { logo: (*app.logo.get()).clone() })
}

#[derive(Debug, Deserialize)]
pub struct LoreQuery {
  pub name: String,
  pub category: Category,
}

#[derive(Debug, Serialize)]
pub struct LoreRes {
  pub description: String,
}

pub async fn lore(
  State(app): State<Arc<AppState>>,
  Query(query): Query<LoreQuery>,
) -> Result<Json<LoreRes>> {
  let description = app.portal().lore(&query.name, query.category).await?;
  Ok(Json(LoreRes { description }))
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
  #[serde(default)]
  pub next: Capability,
  /// Page the provider should return to. Defaults to `PUBLIC_URL`.
  pub current: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeRes {
  pub url: String,
}

pub async fn authorize(
  State(app): State<Arc<AppState>>,
  Query(query): Query<AuthorizeQuery>,
) -> Result<Json<AuthorizeRes>> {
  let client_id = app
    .bridge
    .client_id()
    .ok_or_else(|| Error::Identity("identity provider not configured".into()))?;

  let current = query
    .current
    .or_else(|| app.config.public_url.clone())
    .ok_or_else(|| Error::validation("No page to return to"))?;
  let current = Url::parse(&current)
    .map_err(|err| Error::validation(format!("bad return url: {err}")))?;

  let url = identity::authorize_url(
    client_id,
    &identity::redirect_uri(&current),
    query.next,
  );
  Ok(Json(AuthorizeRes { url: url.to_string() }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackReq {
  /// Full URL the provider redirected to, fragment included.
  pub url: String,
  pub next: Option<Capability>,
}

pub async fn callback(
  State(app): State<Arc<AppState>>,
  Json(req): Json<CallbackReq>,
) -> Result<Json<Completed>> {
  Ok(Json(app.bridge.complete(&app.db, &req.url, req.next).await?))
}

#[derive(Debug, Serialize)]
pub struct MeRes {
  #[serde(flatten)]
  pub identity: Identity,
  pub admin: bool,
}

pub async fn me(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<MeRes>> {
  let identity = app.identity(&headers).await?;
  let admin = app.is_admin(&identity);
  Ok(Json(MeRes { identity, admin }))
}

pub async fn logout(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Ack>> {
  let session = session_id(&headers).ok_or(Error::Unauthenticated)?;
  app.sv().session.remove(session).await?;
  Ok(Ack::ok())
}

pub async fn support(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(form): Json<SupportForm>,
) -> Result<Json<Ack>> {
  let identity = app.identity(&headers).await?;
  app.portal().submit_support(&identity, form).await?;
  Ok(Ack::ok())
}

pub async fn apply(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(form): Json<ApplicationForm>,
) -> Result<Json<StaffApplication>> {
  let identity = app.identity(&headers).await?;
  Ok(Json(app.portal().submit_application(&identity, form).await?))
}
