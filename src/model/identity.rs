use serde::{Deserialize, Serialize};

const DEFAULT_AVATARS: u64 = 5;

/// Display identity derived from the identity provider profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub name: String,
  pub id: String,
  pub avatar_url: String,
}

impl Identity {
  /// Build an identity from its raw parts, resolving the avatar hash to a
  /// URL or to one of the default avatars.
  pub fn new(
    name: impl Into<String>,
    id: impl Into<String>,
    avatar: Option<&str>,
  ) -> Self {
    let id = id.into();
    let avatar_url = match avatar {
      Some(hash) if !hash.is_empty() => {
        format!("https://cdn.discordapp.com/avatars/{id}/{hash}.png")
      }
      _ => default_avatar(&id),
    };
    Self { name: name.into(), id, avatar_url }
  }

  /// Numeric id, when the provider id is numeric.
  pub fn numeric_id(&self) -> Option<i64> {
    self.id.parse().ok()
  }
}

/// Default avatar picked by `id mod 5`.
pub fn default_avatar(id: &str) -> String {
  let index = id.parse::<u64>().map(|id| id % DEFAULT_AVATARS).unwrap_or(0);
  format!("https://cdn.discordapp.com/embed/avatars/{index}.png")
}
