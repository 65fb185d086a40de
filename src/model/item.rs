use serde::{Deserialize, Serialize};

/// Item class value that matches every class.
pub const CLASS_ALL: &str = "All";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
  Mount,
  Costume,
  Transformation,
  Promotion,
}

impl Category {
  pub fn label(self) -> &'static str {
    match self {
      Category::Mount => "Mount",
      Category::Costume => "Costume",
      Category::Transformation => "Transformation",
      Category::Promotion => "Promotion",
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
  Luz,
  Furia,
  Neutral,
}

const LUZ_CLASSES: &[&str] =
  &["Luchador", "Defensor", "Explorador", "Arquero", "Mago", "Sacerdote"];

const FURIA_CLASSES: &[&str] = &[
  "Guerrero",
  "Guardian",
  "Asesino",
  "Cazador",
  "Pagano",
  "Oraculo",
  "Oraculo/Pagano",
];

/// Classes available to a faction. Neutral has no class facet.
pub fn classes_of(faction: Faction) -> &'static [&'static str] {
  match faction {
    Faction::Luz => LUZ_CLASSES,
    Faction::Furia => FURIA_CLASSES,
    Faction::Neutral => &[],
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
  Both,
}

/// Presentation-only rarity, ordered from most to least common.
#[derive(
  Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rarity {
  Common,
  Uncommon,
  Rare,
  Epic,
  Legendary,
  Mythic,
  Unique,
}

impl Rarity {
  pub const ALL: [Rarity; 7] = [
    Rarity::Common,
    Rarity::Uncommon,
    Rarity::Rare,
    Rarity::Epic,
    Rarity::Legendary,
    Rarity::Mythic,
    Rarity::Unique,
  ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
  #[serde(default)]
  pub id: String,
  pub name: String,
  pub category: Category,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub faction: Option<Faction>,
  pub image: String,
  #[serde(default)]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stats: Option<String>,
  #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
  pub item_class: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender: Option<Gender>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub price: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rarity: Option<Rarity>,
}

impl Item {
  pub fn new(
    name: impl Into<String>,
    category: Category,
    image: impl Into<String>,
  ) -> Self {
    Self {
      id: String::new(),
      name: name.into(),
      category,
      faction: None,
      image: image.into(),
      description: String::new(),
      stats: None,
      item_class: None,
      gender: None,
      price: None,
      rarity: None,
    }
  }

  /// Statically bundled items live in the `default-N` namespace.
  pub fn is_bundled(&self) -> bool {
    self.id.starts_with("default-")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn neutral_has_no_class_facet() {
    assert!(classes_of(Faction::Neutral).is_empty());
    assert!(classes_of(Faction::Furia).contains(&"Oraculo/Pagano"));
  }

  #[test]
  fn item_class_uses_backend_column_name() {
    let mut item = Item::new("Traje", Category::Costume, "/img/traje.png");
    item.item_class = Some("Mago".into());

    let value = json::to_value(&item).unwrap();
    assert_eq!(value["class"], "Mago");
    assert!(value.get("item_class").is_none());
    assert!(value.get("rarity").is_none());
  }

  #[test]
  fn missing_optional_fields_deserialize() {
    let item: Item = json::from_str(
      r#"{"id":"7","name":"Lobo","category":"Mount","image":"/lobo.png"}"#,
    )
    .unwrap();

    assert_eq!(item.category, Category::Mount);
    assert_eq!(item.faction, None);
    assert!(item.description.is_empty());
  }
}
