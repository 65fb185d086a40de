use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Faction, Rarity};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropMapCategory {
  Map,
  Boss,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
  #[default]
  Point,
  Area,
}

/// Marker in percentage coordinates of the map image.
///
/// `x` and `y` are in `[0, 100]` of the image width and height. `radius` is
/// a percentage of the image width and only meaningful for
/// [`MarkerKind::Area`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
  pub x: f64,
  pub y: f64,
  pub color: String,
  #[serde(default)]
  pub label: String,
  #[serde(rename = "type", default)]
  pub kind: MarkerKind,
  #[serde(default)]
  pub radius: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEntry {
  pub item_name: String,
  #[serde(default)]
  pub item_image: String,
  /// Free text such as `"0.5%"` or `"rare"`, never validated.
  #[serde(default)]
  pub rate: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rarity: Option<Rarity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobEntry {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub level: String,
  #[serde(default)]
  pub image: String,
  /// Tint given to new markers of this mob.
  pub map_color: String,
  #[serde(default)]
  pub drops: Vec<DropEntry>,
  #[serde(default)]
  pub points: Vec<MapPoint>,
}

impl MobEntry {
  pub fn new(name: impl Into<String>, map_color: impl Into<String>) -> Self {
    Self {
      id: super::new_id(),
      name: name.into(),
      level: String::new(),
      image: String::new(),
      map_color: map_color.into(),
      drops: Vec::new(),
      points: Vec::new(),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropMap {
  #[serde(default)]
  pub id: String,
  pub name: String,
  pub category: DropMapCategory,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub faction: Option<Faction>,
  pub image: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub mobs: Vec<MobEntry>,
  #[serde(default = "Utc::now")]
  pub created_at: DateTime<Utc>,
}

impl Default for DropMap {
  fn default() -> Self {
    Self {
      id: String::new(),
      name: String::new(),
      category: DropMapCategory::Map,
      faction: None,
      image: String::new(),
      description: String::new(),
      mobs: Vec::new(),
      created_at: Utc::now(),
    }
  }
}

impl DropMap {
  pub fn mob(&self, id: &str) -> Option<&MobEntry> {
    self.mobs.iter().find(|mob| mob.id == id)
  }

  pub fn mob_mut(&mut self, id: &str) -> Option<&mut MobEntry> {
    self.mobs.iter_mut().find(|mob| mob.id == id)
  }
}
