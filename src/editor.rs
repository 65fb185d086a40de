//! Drop-map marker editor.
//!
//! [`Editor`] is a reducer over one in-progress [`DropMap`]. Markers are
//! placed on the active mob in percentage coordinates of the displayed map
//! image, either as points (single click) or as areas (press, drag, release).

use serde::{Deserialize, Serialize};

use crate::{
  model::{
    self, DropEntry, DropMap, DropMapCategory, Faction, MapPoint, MarkerKind,
    MobEntry,
  },
  prelude::*,
};

/// Rendered bounding box of the map image, in client pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
  pub left: f64,
  pub top: f64,
  pub width: f64,
  pub height: f64,
}

impl Rect {
  /// Client pixel position to image percentages, clamped to `[0, 100]`.
  pub fn to_percent(&self, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
    if self.width <= 0.0 || self.height <= 0.0 {
      return None;
    }
    let x = (client_x - self.left) / self.width * 100.0;
    let y = (client_y - self.top) / self.height * 100.0;
    Some((clamp_percent(x), clamp_percent(y)))
  }

  /// Image percentages to client pixels.
  pub fn to_pixels(&self, x: f64, y: f64) -> (f64, f64) {
    (self.left + x / 100.0 * self.width, self.top + y / 100.0 * self.height)
  }
}

fn clamp_percent(value: f64) -> f64 {
  if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
  #[default]
  Point,
  Area,
}

/// Area being dragged out: press point and live preview radius.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
  pub x: f64,
  pub y: f64,
  pub radius: f64,
}

/// Pointer position. With `rect`, `x`/`y` are client pixels; without, they
/// are already image percentages.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
  pub x: f64,
  pub y: f64,
  #[serde(default)]
  pub rect: Option<Rect>,
}

impl Pointer {
  pub fn percent(x: f64, y: f64) -> Self {
    Self { x, y, rect: None }
  }

  fn resolve(self) -> Option<(f64, f64)> {
    match self.rect {
      Some(rect) => rect.to_percent(self.x, self.y),
      None => Some((clamp_percent(self.x), clamp_percent(self.y))),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Details {
  pub name: String,
  pub category: DropMapCategory,
  #[serde(default)]
  pub faction: Option<Faction>,
  pub image: String,
  #[serde(default)]
  pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobPatch {
  pub name: Option<String>,
  pub level: Option<String>,
  pub image: Option<String>,
  pub map_color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
  SetDetails(Details),
  AddMob { name: String, color: String },
  UpdateMob { id: String, patch: MobPatch },
  SelectMob { id: Option<String> },
  SetMode { mode: DrawMode },
  Click(Pointer),
  PointerDown(Pointer),
  PointerMove(Pointer),
  PointerUp,
  RemovePoint { mob: String, index: usize },
  AddDrop { mob: String, drop: DropEntry },
  RemoveDrop { mob: String, index: usize },
  DuplicateMob { id: String },
  ClearPoints { id: String },
  RemoveMob {
    id: String,
    #[serde(default)]
    confirmed: bool,
  },
  Load { map: DropMap },
  Reset,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  Changed,
  Unchanged,
  /// Removing a mob must be confirmed by repeating the action with
  /// `confirmed: true`.
  NeedsConfirmation { id: String },
}

/// What the caller must do with a finished draft.
#[derive(Clone, Debug, PartialEq)]
pub enum Save {
  Insert(DropMap),
  Replace(DropMap),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Editor {
  pub draft: DropMap,
  pub active: Option<String>,
  pub mode: DrawMode,
  pub gesture: Option<Gesture>,
  /// Id of the stored map being edited, if any.
  pub editing: Option<String>,
}

impl Editor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start editing a stored map.
  pub fn load(map: DropMap) -> Self {
    Self { editing: Some(map.id.clone()), draft: map, ..Self::default() }
  }

  fn mob_mut(&mut self, id: &str) -> Result<&mut MobEntry> {
    self.draft.mob_mut(id).ok_or(Error::NotFound("Mob"))
  }

  fn active_mob(&mut self) -> Option<&mut MobEntry> {
    let id = self.active.clone()?;
    self.draft.mob_mut(&id)
  }

  fn place(&mut self, x: f64, y: f64, kind: MarkerKind, radius: f64) -> Outcome {
    let Some(mob) = self.active_mob() else {
      return Outcome::Unchanged;
    };

    mob.points.push(MapPoint {
      x,
      y,
      color: mob.map_color.clone(),
      label: mob.name.clone(),
      kind,
      radius,
    });
    Outcome::Changed
  }

  pub fn apply(&mut self, action: Action) -> Result<Outcome> {
    let outcome = match action {
      Action::SetDetails(details) => {
        self.draft.name = details.name;
        self.draft.category = details.category;
        self.draft.faction = details.faction;
        self.draft.image = details.image;
        self.draft.description = details.description;
        Outcome::Changed
      }
      Action::AddMob { name, color } => {
        let mob = MobEntry::new(name, color);
        self.active = Some(mob.id.clone());
        self.draft.mobs.push(mob);
        Outcome::Changed
      }
      Action::UpdateMob { id, patch } => {
        let mob = self.mob_mut(&id)?;
        if let Some(name) = patch.name {
          mob.name = name;
        }
        if let Some(level) = patch.level {
          mob.level = level;
        }
        if let Some(image) = patch.image {
          mob.image = image;
        }
        if let Some(color) = patch.map_color {
          mob.map_color = color;
        }
        Outcome::Changed
      }
      Action::SelectMob { id } => {
        if let Some(id) = &id
          && self.draft.mob(id).is_none()
        {
          return Err(Error::NotFound("Mob"));
        }
        self.active = id;
        self.gesture = None;
        Outcome::Changed
      }
      Action::SetMode { mode } => {
        self.mode = mode;
        self.gesture = None;
        Outcome::Changed
      }
      Action::Click(pointer) => match (self.mode, pointer.resolve()) {
        (DrawMode::Point, Some((x, y))) => {
          self.place(x, y, MarkerKind::Point, 0.0)
        }
        _ => Outcome::Unchanged,
      },
      Action::PointerDown(pointer) => {
        match (self.mode, pointer.resolve(), self.active.is_some()) {
          (DrawMode::Area, Some((x, y)), true) => {
            self.gesture = Some(Gesture { x, y, radius: 0.0 });
            Outcome::Changed
          }
          _ => Outcome::Unchanged,
        }
      }
      Action::PointerMove(pointer) => {
        match (self.gesture.as_mut(), pointer.resolve()) {
          (Some(gesture), Some((x, y))) => {
            gesture.radius = (x - gesture.x).hypot(y - gesture.y);
            Outcome::Changed
          }
          _ => Outcome::Unchanged,
        }
      }
      Action::PointerUp => match self.gesture.take() {
        Some(gesture) => {
          self.place(gesture.x, gesture.y, MarkerKind::Area, gesture.radius)
        }
        None => Outcome::Unchanged,
      },
      Action::RemovePoint { mob, index } => {
        let mob = self.mob_mut(&mob)?;
        if index >= mob.points.len() {
          return Err(Error::NotFound("Point"));
        }
        mob.points.remove(index);
        Outcome::Changed
      }
      Action::AddDrop { mob, drop } => {
        if drop.item_name.trim().is_empty() {
          return Err(Error::validation("Drop item name is required"));
        }
        self.mob_mut(&mob)?.drops.push(drop);
        Outcome::Changed
      }
      Action::RemoveDrop { mob, index } => {
        let mob = self.mob_mut(&mob)?;
        if index >= mob.drops.len() {
          return Err(Error::NotFound("Drop"));
        }
        mob.drops.remove(index);
        Outcome::Changed
      }
      Action::DuplicateMob { id } => {
        let index = self
          .draft
          .mobs
          .iter()
          .position(|mob| mob.id == id)
          .ok_or(Error::NotFound("Mob"))?;

        let mut copy = self.draft.mobs[index].clone();
        copy.id = model::new_id();
        self.draft.mobs.insert(index + 1, copy);
        Outcome::Changed
      }
      Action::ClearPoints { id } => {
        self.mob_mut(&id)?.points.clear();
        Outcome::Changed
      }
      Action::RemoveMob { id, confirmed } => {
        if self.draft.mob(&id).is_none() {
          return Err(Error::NotFound("Mob"));
        }
        if !confirmed {
          return Ok(Outcome::NeedsConfirmation { id });
        }

        self.draft.mobs.retain(|mob| mob.id != id);
        if self.active.as_deref() == Some(id.as_str()) {
          self.active = None;
          self.gesture = None;
        }
        Outcome::Changed
      }
      Action::Load { map } => {
        *self = Self::load(map);
        Outcome::Changed
      }
      Action::Reset => {
        *self = Self::new();
        Outcome::Changed
      }
    };

    Ok(outcome)
  }

  /// Finish the draft. Requires a name and an image; the editor is reset
  /// once the draft is handed out.
  pub fn save(&mut self) -> Result<Save> {
    if self.draft.name.trim().is_empty() {
      return Err(Error::validation("Drop map name is required"));
    }
    if self.draft.image.trim().is_empty() {
      return Err(Error::validation("Drop map image is required"));
    }

    let editor = std::mem::take(self);
    Ok(match editor.editing {
      Some(id) => Save::Replace(DropMap { id, ..editor.draft }),
      None => Save::Insert(editor.draft),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Rarity;

  fn with_mob() -> (Editor, String) {
    let mut editor = Editor::new();
    editor
      .apply(Action::AddMob { name: "Orco".into(), color: "#ff0000".into() })
      .unwrap();
    let id = editor.active.clone().unwrap();
    (editor, id)
  }

  fn loot(name: &str) -> DropEntry {
    DropEntry {
      item_name: name.into(),
      item_image: String::new(),
      rate: "1%".into(),
      rarity: Some(Rarity::Rare),
    }
  }

  #[test]
  fn rect_conversion_clamps() {
    let rect = Rect { left: 10.0, top: 20.0, width: 200.0, height: 100.0 };

    assert_eq!(rect.to_percent(110.0, 70.0), Some((50.0, 50.0)));
    assert_eq!(rect.to_percent(0.0, 500.0), Some((0.0, 100.0)));
    assert_eq!(rect.to_pixels(50.0, 50.0), (110.0, 70.0));

    let empty = Rect { width: 0.0, ..rect };
    assert_eq!(empty.to_percent(10.0, 10.0), None);
  }

  #[test]
  fn click_without_active_mob_is_ignored() {
    let mut editor = Editor::new();
    let outcome = editor.apply(Action::Click(Pointer::percent(5.0, 5.0))).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
  }

  #[test]
  fn point_inherits_mob_color_and_name() {
    let (mut editor, id) = with_mob();
    let rect = Rect { left: 0.0, top: 0.0, width: 400.0, height: 200.0 };

    editor
      .apply(Action::Click(Pointer { x: 100.0, y: 50.0, rect: Some(rect) }))
      .unwrap();

    let point = &editor.draft.mob(&id).unwrap().points[0];
    assert_eq!((point.x, point.y), (25.0, 25.0));
    assert_eq!(point.color, "#ff0000");
    assert_eq!(point.label, "Orco");
    assert_eq!(point.kind, MarkerKind::Point);
    assert_eq!(point.radius, 0.0);
  }

  #[test]
  fn area_radius_follows_drag() {
    let (mut editor, id) = with_mob();
    editor.apply(Action::SetMode { mode: DrawMode::Area }).unwrap();

    editor.apply(Action::PointerDown(Pointer::percent(10.0, 10.0))).unwrap();
    editor.apply(Action::PointerMove(Pointer::percent(13.0, 14.0))).unwrap();
    assert_eq!(editor.gesture.unwrap().radius, 5.0);

    // clicks in area mode never place points
    editor.apply(Action::Click(Pointer::percent(50.0, 50.0))).unwrap();
    editor.apply(Action::PointerUp).unwrap();

    let points = &editor.draft.mob(&id).unwrap().points;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].kind, MarkerKind::Area);
    assert_eq!((points[0].x, points[0].y, points[0].radius), (10.0, 10.0, 5.0));
    assert_eq!(editor.gesture, None);
  }

  #[test]
  fn zero_drag_area_has_zero_radius() {
    let (mut editor, id) = with_mob();
    editor.apply(Action::SetMode { mode: DrawMode::Area }).unwrap();
    editor.apply(Action::PointerDown(Pointer::percent(40.0, 60.0))).unwrap();
    editor.apply(Action::PointerUp).unwrap();

    let point = &editor.draft.mob(&id).unwrap().points[0];
    assert_eq!(point.kind, MarkerKind::Area);
    assert_eq!(point.radius, 0.0);
  }

  #[test]
  fn color_change_keeps_existing_markers() {
    let (mut editor, id) = with_mob();
    editor.apply(Action::Click(Pointer::percent(1.0, 1.0))).unwrap();
    editor
      .apply(Action::UpdateMob {
        id: id.clone(),
        patch: MobPatch { map_color: Some("#00ff00".into()), ..Default::default() },
      })
      .unwrap();
    editor.apply(Action::Click(Pointer::percent(2.0, 2.0))).unwrap();

    let points = &editor.draft.mob(&id).unwrap().points;
    assert_eq!(points[0].color, "#ff0000");
    assert_eq!(points[1].color, "#00ff00");
  }

  #[test]
  fn duplicate_is_independent() {
    let (mut editor, id) = with_mob();
    editor.apply(Action::AddDrop { mob: id.clone(), drop: loot("Lapis") }).unwrap();
    editor.apply(Action::AddDrop { mob: id.clone(), drop: loot("Oro") }).unwrap();
    editor.apply(Action::Click(Pointer::percent(1.0, 1.0))).unwrap();

    editor.apply(Action::DuplicateMob { id: id.clone() }).unwrap();
    let copy_id = editor.draft.mobs[1].id.clone();
    assert_ne!(copy_id, id);
    assert_eq!(editor.draft.mobs[1].name, "Orco");
    assert_eq!(editor.draft.mobs[1].drops.len(), 2);
    assert_eq!(editor.draft.mobs[1].points.len(), 1);

    editor
      .apply(Action::RemoveDrop { mob: copy_id.clone(), index: 0 })
      .unwrap();
    editor.apply(Action::ClearPoints { id: copy_id }).unwrap();

    let source = editor.draft.mob(&id).unwrap();
    assert_eq!(source.drops.len(), 2);
    assert_eq!(source.points.len(), 1);
  }

  #[test]
  fn clear_points_keeps_drops() {
    let (mut editor, id) = with_mob();
    editor.apply(Action::AddDrop { mob: id.clone(), drop: loot("Lapis") }).unwrap();
    editor.apply(Action::Click(Pointer::percent(1.0, 1.0))).unwrap();

    editor.apply(Action::ClearPoints { id: id.clone() }).unwrap();
    let mob = editor.draft.mob(&id).unwrap();
    assert!(mob.points.is_empty());
    assert_eq!(mob.drops.len(), 1);
  }

  #[test]
  fn remove_requires_confirmation() {
    let (mut editor, id) = with_mob();

    let outcome =
      editor.apply(Action::RemoveMob { id: id.clone(), confirmed: false }).unwrap();
    assert_eq!(outcome, Outcome::NeedsConfirmation { id: id.clone() });
    assert_eq!(editor.draft.mobs.len(), 1);

    editor.apply(Action::RemoveMob { id, confirmed: true }).unwrap();
    assert!(editor.draft.mobs.is_empty());
    assert_eq!(editor.active, None);
  }

  #[test]
  fn save_validates_and_resets() {
    let (mut editor, _) = with_mob();
    assert!(matches!(editor.save(), Err(Error::Validation(_))));

    editor
      .apply(Action::SetDetails(Details {
        name: "Cantabria".into(),
        category: DropMapCategory::Map,
        faction: None,
        image: String::new(),
        description: String::new(),
      }))
      .unwrap();
    assert!(matches!(editor.save(), Err(Error::Validation(_))));

    editor.draft.image = "/c.png".into();
    let Save::Insert(map) = editor.save().unwrap() else {
      panic!("new draft must be inserted");
    };
    assert_eq!(map.name, "Cantabria");
    assert_eq!(map.mobs.len(), 1);
    assert!(editor.draft.name.is_empty());
    assert!(editor.draft.mobs.is_empty());
    assert_eq!(editor.active, None);
  }

  #[test]
  fn editing_existing_map_replaces_it() {
    let map = DropMap {
      id: "map-9".into(),
      name: "Jefe".into(),
      category: DropMapCategory::Boss,
      image: "/b.png".into(),
      ..Default::default()
    };

    let mut editor = Editor::new();
    editor.apply(Action::Load { map }).unwrap();
    assert_eq!(editor.editing.as_deref(), Some("map-9"));

    let Save::Replace(saved) = editor.save().unwrap() else {
      panic!("loaded map must be replaced");
    };
    assert_eq!(saved.id, "map-9");
    assert!(editor.draft.name.is_empty());
    assert_eq!(editor.editing, None);
  }

  #[test]
  fn actions_deserialize_from_tagged_json() {
    let action: Action =
      json::from_str(r#"{"action":"click","x":12.5,"y":40}"#).unwrap();
    assert_eq!(action, Action::Click(Pointer::percent(12.5, 40.0)));

    let action: Action =
      json::from_str(r#"{"action":"remove_mob","id":"m"}"#).unwrap();
    assert_eq!(action, Action::RemoveMob { id: "m".into(), confirmed: false });
  }
}
