//! Portal sync token.
//!
//! Carries the admin's cached settings and the locally saved entities to
//! another session in a single `sync` URL parameter. The token is the JSON
//! payload, deflated and base64 (URL-safe, unpadded) encoded.

use std::{
  collections::BTreeMap,
  io::{Read, Write},
};

use base64::{
  Engine,
  engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
  model::{DropMap, Item},
  prelude::*,
  sv,
};

pub const PARAM: &str = "sync";

/// Upper bound of an inflated payload.
const MAX_PAYLOAD: u64 = 8 * 1024 * 1024;

const RESERVED: [&str; 2] = ["items", "drop_maps"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
  #[serde(default)]
  pub items: Vec<Item>,
  #[serde(default)]
  pub drop_maps: Vec<DropMap>,
  #[serde(flatten)]
  pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Applied {
  pub settings: usize,
  pub items: usize,
  pub drop_maps: usize,
}

fn bad_token(err: impl std::fmt::Display) -> Error {
  Error::SyncToken(err.to_string())
}

pub fn encode(payload: &Payload) -> Result<String> {
  let raw = json::to_vec(payload)?;

  let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
  encoder.write_all(&raw).map_err(|err| Error::Internal(err.to_string()))?;
  let deflated = encoder.finish().map_err(|err| Error::Internal(err.to_string()))?;

  Ok(URL_SAFE_NO_PAD.encode(deflated))
}

pub fn decode(token: &str) -> Result<Payload> {
  let token = token.trim();
  if token.is_empty() {
    return Err(bad_token("empty token"));
  }

  // `+` may have been turned into a space by a lax URL decoder
  let bytes = URL_SAFE_NO_PAD
    .decode(token)
    .or_else(|_| STANDARD.decode(token.replace(' ', "+")))
    .map_err(bad_token)?;

  let mut raw = Vec::new();
  DeflateDecoder::new(bytes.as_slice())
    .take(MAX_PAYLOAD)
    .read_to_end(&mut raw)
    .map_err(bad_token)?;

  json::from_slice(&raw).map_err(bad_token)
}

/// `url` with its `sync` parameter set to `token`.
pub fn embed(url: &Url, token: &str) -> Url {
  let mut url = strip(url);
  url.query_pairs_mut().append_pair(PARAM, token);
  url
}

/// `url` without the `sync` parameter.
pub fn strip(url: &Url) -> Url {
  let kept: Vec<(String, String)> = url
    .query_pairs()
    .filter(|(key, _)| key != PARAM)
    .map(|(key, value)| (key.into_owned(), value.into_owned()))
    .collect();

  let mut url = url.clone();
  if kept.is_empty() {
    url.set_query(None);
  } else {
    url.query_pairs_mut().clear().extend_pairs(kept);
  }
  url
}

/// Token carried by `url`, if any.
pub fn token_of(url: &Url) -> Option<String> {
  url
    .query_pairs()
    .find(|(key, _)| key == PARAM)
    .map(|(_, value)| value.into_owned())
}

/// Everything cached locally: settings plus the locally saved entities.
pub async fn export(db: &DatabaseConnection) -> Result<Payload> {
  let settings = sv::Settings::new(db)
    .all()
    .await?
    .into_iter()
    .filter(|row| !RESERVED.contains(&row.key.as_str()))
    .map(|row| (row.key, row.value))
    .collect();

  let local = sv::Local::new(db);
  Ok(Payload {
    items: local.items().await?,
    drop_maps: local.drop_maps().await?,
    settings,
  })
}

/// Write a decoded payload into the local cache.
pub async fn apply(db: &DatabaseConnection, payload: &Payload) -> Result<Applied> {
  let settings = sv::Settings::new(db);
  for (key, value) in &payload.settings {
    settings.set(key, value).await?;
  }

  let local = sv::Local::new(db);
  for item in &payload.items {
    local.put_item(item).await?;
  }
  for map in &payload.drop_maps {
    local.put_drop_map(map).await?;
  }

  Ok(Applied {
    settings: payload.settings.len(),
    items: payload.items.len(),
    drop_maps: payload.drop_maps.len(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    model::{Category, MapPoint, MarkerKind, MobEntry},
    sv::memory_db,
  };

  fn payload() -> Payload {
    let mut item = Item::new("Lobo", Category::Mount, "/lobo.png");
    item.id = "local-1".into();

    let mut mob = MobEntry::new("Orco", "#ff0000");
    mob.points.push(MapPoint {
      x: 1.0 / 3.0,
      y: 2.0 / 3.0,
      color: "#ff0000".into(),
      label: "Orco".into(),
      kind: MarkerKind::Area,
      radius: 0.1,
    });
    let map = DropMap {
      id: "map-1".into(),
      name: "Cantabria".into(),
      image: "/c.png".into(),
      mobs: vec![mob],
      ..Default::default()
    };

    Payload {
      items: vec![item],
      drop_maps: vec![map],
      settings: BTreeMap::from([
        ("site_logo".to_string(), "/logo.png".to_string()),
        ("discord_invite".to_string(), "https://discord.gg/x".to_string()),
      ]),
    }
  }

  #[test]
  fn token_is_url_safe_and_reversible() {
    let payload = payload();
    let token = encode(&payload).unwrap();

    assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    assert_eq!(decode(&token).unwrap(), payload);
  }

  #[test]
  fn payload_is_flat() {
    let value = json::to_value(payload()).unwrap();
    assert_eq!(value["site_logo"], "/logo.png");
    assert!(value["items"].is_array());
    assert!(value["drop_maps"].is_array());
  }

  #[test]
  fn malformed_tokens_are_errors() {
    let garbage = URL_SAFE_NO_PAD.encode(b"not deflate");
    for token in ["", "!!!", "aGVsbG8", garbage.as_str()] {
      assert!(matches!(decode(token), Err(Error::SyncToken(_))), "{token}");
    }
  }

  #[test]
  fn embed_and_strip() {
    let base = Url::parse("https://portal.example/admin?tab=items").unwrap();
    let url = embed(&base, "abc");

    assert_eq!(token_of(&url).as_deref(), Some("abc"));
    assert_eq!(strip(&url), base);

    let bare = Url::parse("https://portal.example/?sync=abc").unwrap();
    assert_eq!(strip(&bare).as_str(), "https://portal.example/");
  }

  #[tokio::test]
  async fn export_then_apply_elsewhere() {
    let source = memory_db().await;
    let payload = payload();
    apply(&source, &payload).await.unwrap();

    let exported = export(&source).await.unwrap();
    assert_eq!(exported, payload);

    let target = memory_db().await;
    let token = encode(&exported).unwrap();
    let applied = apply(&target, &decode(&token).unwrap()).await.unwrap();

    assert_eq!(applied, Applied { settings: 2, items: 1, drop_maps: 1 });
    assert_eq!(
      sv::Settings::new(&target).get("site_logo").await.unwrap().as_deref(),
      Some("/logo.png")
    );
    assert_eq!(sv::Local::new(&target).drop_maps().await.unwrap(), payload.drop_maps);
  }
}
