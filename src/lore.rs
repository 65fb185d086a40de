//! Flavor text for catalogue cards from the generative-text service.

use reqwest::Client;
use serde::Deserialize;

use crate::{model::Category, prelude::*};

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Used when no API key is configured.
pub const FALLBACK_UNCONFIGURED: &str =
  "Un objeto envuelto en misterio; su historia aún está por escribirse.";
/// Used when the service fails or answers with nothing usable.
pub const FALLBACK_FAILED: &str =
  "Las crónicas de este objeto se perdieron en las arenas del tiempo.";

/// Memo entries kept before new descriptions stop being remembered.
const MAX_CACHED: usize = 1024;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}

pub struct Lore {
  client: Client,
  key: Option<String>,
  cache: DashMap<(String, Category), String>,
}

fn prompt(name: &str, category: Category) -> String {
  format!(
    "Escribe una descripción breve (máximo dos frases), épica y con estilo \
     de fantasía medieval para el objeto \"{name}\" de tipo {}. Responde solo \
     con la descripción.",
    category.label()
  )
}

impl Lore {
  pub fn new(key: Option<String>) -> Self {
    Self { client: Client::new(), key, cache: DashMap::new() }
  }

  /// Description for an item, or one of the fixed fallbacks.
  pub async fn describe(&self, name: &str, category: Category) -> String {
    let Some(key) = self.key.as_deref() else {
      return FALLBACK_UNCONFIGURED.to_string();
    };

    let cache_key = (name.to_string(), category);
    if let Some(text) = self.cache.get(&cache_key) {
      return text.clone();
    }

    match self.generate(key, name, category).await {
      Ok(text) => {
        self.remember(cache_key, text.clone());
        text
      }
      Err(err) => {
        warn!("Lore generation for `{name}` failed: {err:#}");
        FALLBACK_FAILED.to_string()
      }
    }
  }

  pub fn cached(&self) -> usize {
    self.cache.len()
  }

  fn remember(&self, key: (String, Category), text: String) {
    if self.cache.len() >= MAX_CACHED && !self.cache.contains_key(&key) {
      debug!("Lore memo full, `{}` not remembered", key.0);
      return;
    }
    self.cache.insert(key, text);
  }

  async fn generate(
    &self,
    key: &str,
    name: &str,
    category: Category,
  ) -> anyhow::Result<String> {
    let body = json::json!({
      "contents": [{ "parts": [{ "text": prompt(name, category) }] }]
    });

    let response: GenerateResponse = self
      .client
      .post(ENDPOINT)
      .query(&[("key", key)])
      .json(&body)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    first_text(response).context("empty generation")
  }
}

fn first_text(response: GenerateResponse) -> Option<String> {
  response
    .candidates
    .into_iter()
    .flat_map(|candidate| candidate.content.parts)
    .map(|part| part.text.trim().to_string())
    .find(|text| !text.is_empty())
}
