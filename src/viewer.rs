//! Read-only rendering of a drop map.

use serde::Serialize;

use crate::{
  catalogue::{RarityStyle, rarity_style},
  editor::Rect,
  model::{DropMap, MarkerKind},
};

/// Diameter of point markers, in pixels.
pub const POINT_DIAMETER: f64 = 12.0;
/// Fill opacity of area markers.
pub const AREA_OPACITY: f64 = 0.3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
  pub mob_id: String,
  pub label: String,
  pub color: String,
  pub kind: MarkerKind,
  /// Center of the marker in client pixels.
  pub left: f64,
  pub top: f64,
  pub diameter: f64,
  pub opacity: f64,
}

/// Place every marker of `map` over the image rendered at `rect`.
pub fn overlay(map: &DropMap, rect: Rect) -> Vec<Marker> {
  map
    .mobs
    .iter()
    .flat_map(|mob| mob.points.iter().map(move |point| (mob, point)))
    .map(|(mob, point)| {
      let (left, top) = rect.to_pixels(point.x, point.y);
      let (diameter, opacity) = match point.kind {
        MarkerKind::Point => (POINT_DIAMETER, 1.0),
        MarkerKind::Area => {
          (2.0 * point.radius * rect.width / 100.0, AREA_OPACITY)
        }
      };

      Marker {
        mob_id: mob.id.clone(),
        label: point.label.clone(),
        color: point.color.clone(),
        kind: point.kind,
        left,
        top,
        diameter,
        opacity,
      }
    })
    .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct DropRow {
  pub item_name: String,
  pub item_image: String,
  pub rate: String,
  pub style: RarityStyle,
}

#[derive(Clone, Debug, Serialize)]
pub struct MobCard {
  pub id: String,
  pub name: String,
  pub level: String,
  pub image: String,
  pub color: String,
  pub markers: usize,
  pub drops: Vec<DropRow>,
}

/// Mobs of `map` with their loot tables, in map order.
pub fn mob_cards(map: &DropMap) -> Vec<MobCard> {
  map
    .mobs
    .iter()
    .map(|mob| MobCard {
      id: mob.id.clone(),
      name: mob.name.clone(),
      level: mob.level.clone(),
      image: mob.image.clone(),
      color: mob.map_color.clone(),
      markers: mob.points.len(),
      drops: mob
        .drops
        .iter()
        .map(|drop| DropRow {
          item_name: drop.item_name.clone(),
          item_image: drop.item_image.clone(),
          rate: drop.rate.clone(),
          style: rarity_style(drop.rarity),
        })
        .collect(),
    })
    .collect()
}
