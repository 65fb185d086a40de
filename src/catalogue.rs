//! Public catalogue: tab/facet filtering and card presentation.

use serde::{Deserialize, Serialize};

use crate::model::{CLASS_ALL, Category, Faction, Gender, Item, Rarity, classes_of};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  #[default]
  Promotions,
  Mounts,
  Costumes,
  Transformations,
}

impl Tab {
  pub fn category(self) -> Category {
    match self {
      Tab::Promotions => Category::Promotion,
      Tab::Mounts => Category::Mount,
      Tab::Costumes => Category::Costume,
      Tab::Transformations => Category::Transformation,
    }
  }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenderFilter {
  #[default]
  All,
  Male,
  Female,
  Both,
}

impl GenderFilter {
  fn matches(self, gender: Gender) -> bool {
    match (self, gender) {
      (GenderFilter::All | GenderFilter::Both, _) | (_, Gender::Both) => true,
      (GenderFilter::Male, Gender::Male) => true,
      (GenderFilter::Female, Gender::Female) => true,
      _ => false,
    }
  }
}

/// Catalogue selection. Faction, class and gender only apply to costumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
  pub tab: Tab,
  pub faction: Faction,
  pub class: String,
  pub gender: GenderFilter,
}

impl Default for Filter {
  fn default() -> Self {
    Self {
      tab: Tab::default(),
      faction: Faction::Luz,
      class: CLASS_ALL.to_string(),
      gender: GenderFilter::All,
    }
  }
}

impl Filter {
  pub fn tab(tab: Tab) -> Self {
    Self { tab, ..Default::default() }
  }

  pub fn matches(&self, item: &Item) -> bool {
    if item.category != self.tab.category() {
      return false;
    }
    if self.tab != Tab::Costumes {
      return true;
    }

    let (Some(faction), Some(class), Some(gender)) =
      (item.faction, item.item_class.as_deref(), item.gender)
    else {
      return false;
    };
    if faction != self.faction || !self.gender.matches(gender) {
      return false;
    }

    // no class facet at all for this faction
    classes_of(self.faction).is_empty() || class_matches(class, &self.class)
  }
}

/// `All` on either side matches. A composite filter such as
/// `Oraculo/Pagano` matches each of its classes and itself; a single-class
/// filter matches only that exact class.
pub fn class_matches(item_class: &str, filter: &str) -> bool {
  if item_class == CLASS_ALL || filter == CLASS_ALL || item_class == filter {
    return true;
  }
  filter.contains('/') && filter.split('/').any(|class| class == item_class)
}

/// Ordered subset of `items` selected by `filter`.
pub fn filter<'a>(items: &'a [Item], filter: &Filter) -> Vec<&'a Item> {
  items.iter().filter(|item| filter.matches(item)).collect()
}

/// Bundled items first, then remote ones. Duplicate names are kept.
pub fn union(bundled: &[Item], remote: &[Item]) -> Vec<Item> {
  bundled.iter().chain(remote).cloned().collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RarityStyle {
  pub label: &'static str,
  pub border: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub glow: Option<&'static str>,
}

/// Border and glow of a card or loot row.
pub fn rarity_style(rarity: Option<Rarity>) -> RarityStyle {
  let (label, border, glow) = match rarity {
    None => ("Unspecified", "#4b5563", None),
    Some(Rarity::Common) => ("Common", "#9ca3af", None),
    Some(Rarity::Uncommon) => ("Uncommon", "#22c55e", None),
    Some(Rarity::Rare) => ("Rare", "#3b82f6", Some("rgba(59,130,246,0.45)")),
    Some(Rarity::Epic) => ("Epic", "#a855f7", Some("rgba(168,85,247,0.5)")),
    Some(Rarity::Legendary) => {
      ("Legendary", "#f59e0b", Some("rgba(245,158,11,0.55)"))
    }
    Some(Rarity::Mythic) => ("Mythic", "#ef4444", Some("rgba(239,68,68,0.6)")),
    Some(Rarity::Unique) => ("Unique", "#ec4899", Some("rgba(236,72,153,0.65)")),
  };
  RarityStyle { label, border, glow }
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemCard {
  #[serde(flatten)]
  pub item: Item,
  pub style: RarityStyle,
}

impl From<&Item> for ItemCard {
  fn from(item: &Item) -> Self {
    Self { item: item.clone(), style: rarity_style(item.rarity) }
  }
}

fn bundled(
  n: u32,
  name: &str,
  category: Category,
  image: &str,
  description: &str,
) -> Item {
  let mut item = Item::new(name, category, image);
  item.id = format!("default-{n}");
  item.description = description.to_string();
  item
}

/// Items shipped with the portal, always shown next to the remote ones.
pub fn defaults() -> Vec<Item> {
  let mut items = vec![
    bundled(
      1,
      "Pack de Bienvenida",
      Category::Promotion,
      "/assets/items/welcome-pack.png",
      "Regalo para todos los jugadores nuevos.",
    ),
    bundled(
      2,
      "Lobo de Guerra",
      Category::Mount,
      "/assets/items/war-wolf.png",
      "Montura rápida de las estepas del norte.",
    ),
    bundled(
      3,
      "Unicornio Celeste",
      Category::Mount,
      "/assets/items/celestial-unicorn.png",
      "Montura de evento de temporada.",
    ),
    bundled(
      4,
      "Traje de Gala",
      Category::Costume,
      "/assets/items/gala.png",
      "Traje elegante para celebraciones.",
    ),
    bundled(
      5,
      "Túnica del Vacío",
      Category::Costume,
      "/assets/items/void-robe.png",
      "Vestimenta de los iniciados en la magia oscura.",
    ),
    bundled(
      6,
      "Forma de Dragón",
      Category::Transformation,
      "/assets/items/dragon-form.png",
      "Transforma al personaje en un dragón menor.",
    ),
  ];

  items[1].rarity = Some(Rarity::Rare);
  items[2].rarity = Some(Rarity::Legendary);

  items[3].faction = Some(Faction::Luz);
  items[3].item_class = Some(CLASS_ALL.to_string());
  items[3].gender = Some(Gender::Both);
  items[3].rarity = Some(Rarity::Epic);

  items[4].faction = Some(Faction::Furia);
  items[4].item_class = Some("Oraculo/Pagano".to_string());
  items[4].gender = Some(Gender::Female);
  items[4].rarity = Some(Rarity::Mythic);

  items[5].rarity = Some(Rarity::Unique);
  items
}

#[cfg(test)]
mod tests {
  use super::*;

  fn costume(
    id: &str,
    faction: Option<Faction>,
    class: Option<&str>,
    gender: Option<Gender>,
  ) -> Item {
    let mut item = Item::new(id, Category::Costume, "/c.png");
    item.id = id.to_string();
    item.faction = faction;
    item.item_class = class.map(str::to_string);
    item.gender = gender;
    item
  }

  fn furia(class: &str, gender: GenderFilter) -> Filter {
    Filter {
      tab: Tab::Costumes,
      faction: Faction::Furia,
      class: class.to_string(),
      gender,
    }
  }

  fn ids(items: Vec<&Item>) -> Vec<&str> {
    items.into_iter().map(|item| item.id.as_str()).collect()
  }

  #[test]
  fn other_tabs_only_check_category() {
    let mut mount = Item::new("m", Category::Mount, "/m.png");
    mount.faction = Some(Faction::Luz);
    let promo = Item::new("p", Category::Promotion, "/p.png");

    let items = [mount, promo];
    let found = filter(&items, &Filter {
      tab: Tab::Mounts,
      faction: Faction::Furia,
      ..Default::default()
    });
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "m");
  }

  #[test]
  fn incomplete_costumes_are_excluded() {
    let items = [
      costume("no-faction", None, Some("Oraculo"), Some(Gender::Male)),
      costume("no-class", Some(Faction::Furia), None, Some(Gender::Male)),
      costume("no-gender", Some(Faction::Furia), Some("Oraculo"), None),
      costume("ok", Some(Faction::Furia), Some("Oraculo"), Some(Gender::Male)),
    ];

    assert_eq!(ids(filter(&items, &furia("All", GenderFilter::All))), ["ok"]);
  }

  #[test]
  fn composite_filter_matches_each_class() {
    let items = [
      costume("o", Some(Faction::Furia), Some("Oraculo"), Some(Gender::Male)),
      costume("p", Some(Faction::Furia), Some("Pagano"), Some(Gender::Male)),
      costume(
        "op",
        Some(Faction::Furia),
        Some("Oraculo/Pagano"),
        Some(Gender::Male),
      ),
      costume("g", Some(Faction::Furia), Some("Guerrero"), Some(Gender::Male)),
    ];

    assert_eq!(
      ids(filter(&items, &furia("Oraculo/Pagano", GenderFilter::All))),
      ["o", "p", "op"]
    );
    assert_eq!(ids(filter(&items, &furia("Oraculo", GenderFilter::All))), ["o"]);
  }

  #[test]
  fn all_class_is_a_wildcard() {
    let items = [costume(
      "any",
      Some(Faction::Furia),
      Some("All"),
      Some(Gender::Female),
    )];
    assert_eq!(
      ids(filter(&items, &furia("Cazador", GenderFilter::Female))),
      ["any"]
    );
  }

  #[test]
  fn gender_wildcards() {
    let items = [
      costume("both", Some(Faction::Furia), Some("Oraculo"), Some(Gender::Both)),
      costume("male", Some(Faction::Furia), Some("Oraculo"), Some(Gender::Male)),
    ];

    assert_eq!(
      ids(filter(&items, &furia("Oraculo", GenderFilter::Female))),
      ["both"]
    );
    assert_eq!(
      ids(filter(&items, &furia("Oraculo", GenderFilter::All))),
      ["both", "male"]
    );
    assert_eq!(
      ids(filter(&items, &furia("Oraculo", GenderFilter::Both))),
      ["both", "male"]
    );
  }

  #[test]
  fn faction_is_exact() {
    let items = [
      costume("luz", Some(Faction::Luz), Some("All"), Some(Gender::Both)),
      costume("neutral", Some(Faction::Neutral), Some("All"), Some(Gender::Both)),
      costume("classless", Some(Faction::Neutral), None, Some(Gender::Both)),
    ];

    assert!(filter(&items, &furia("All", GenderFilter::All)).is_empty());

    let neutral = Filter {
      tab: Tab::Costumes,
      faction: Faction::Neutral,
      class: "Mago".into(),
      gender: GenderFilter::All,
    };
    assert_eq!(ids(filter(&items, &neutral)), ["neutral"]);
  }

  #[test]
  fn union_keeps_duplicates() {
    let bundled = defaults();
    let mut remote = bundled[1].clone();
    remote.id = "remote-1".into();

    let all = union(&bundled, &[remote]);
    assert_eq!(all.len(), bundled.len() + 1);
    assert_eq!(all.iter().filter(|item| item.name == "Lobo de Guerra").count(), 2);
  }

  #[test]
  fn bundled_ids_are_namespaced() {
    assert!(defaults().iter().all(Item::is_bundled));
  }

  #[test]
  fn rarity_style_is_total() {
    let mut borders: Vec<_> =
      Rarity::ALL.iter().map(|r| rarity_style(Some(*r)).border).collect();
    borders.push(rarity_style(None).border);
    borders.sort();
    borders.dedup();
    assert_eq!(borders.len(), 8);
  }
}
