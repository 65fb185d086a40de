use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identity;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
  #[serde(rename = "Game Sage")]
  GameSage,
  #[serde(rename = "Lead Game Sage")]
  LeadGameSage,
  #[serde(rename = "GM")]
  Gm,
}

impl Position {
  pub fn label(self) -> &'static str {
    match self {
      Position::GameSage => "Game Sage",
      Position::LeadGameSage => "Lead Game Sage",
      Position::Gm => "GM",
    }
  }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
  pub about: String,
  pub experience: String,
  pub availability: String,
  pub motivation: String,
  pub scenario: String,
}

impl Answers {
  /// Question/answer pairs in form order.
  pub fn pairs(&self) -> [(&'static str, &str); 5] {
    [
      ("Sobre ti", &self.about),
      ("Experiencia", &self.experience),
      ("Disponibilidad", &self.availability),
      ("Motivación", &self.motivation),
      ("Caso práctico", &self.scenario),
    ]
  }

  pub fn is_complete(&self) -> bool {
    self.pairs().iter().all(|(_, answer)| !answer.trim().is_empty())
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffApplication {
  #[serde(default)]
  pub id: String,
  pub username: String,
  pub discord_name: String,
  pub discord_id: String,
  pub position: Position,
  pub answers: Answers,
  #[serde(default)]
  pub status: ApplicationStatus,
  #[serde(default)]
  pub avatar_url: String,
  #[serde(default = "Utc::now")]
  pub created_at: DateTime<Utc>,
}

impl StaffApplication {
  pub fn new(
    identity: &Identity,
    username: impl Into<String>,
    position: Position,
    answers: Answers,
  ) -> Self {
    Self {
      id: super::new_id(),
      username: username.into(),
      discord_name: identity.name.clone(),
      discord_id: identity.id.clone(),
      position,
      answers,
      status: ApplicationStatus::Pending,
      avatar_url: identity.avatar_url.clone(),
      created_at: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn position_wire_names() {
    assert_eq!(
      json::to_value(Position::LeadGameSage).unwrap(),
      "Lead Game Sage"
    );
    assert_eq!(json::to_value(ApplicationStatus::Rejected).unwrap(), "rejected");
  }

  #[test]
  fn new_application_is_pending_and_carries_identity() {
    let identity = Identity::new("Foo", "42", None);
    let answers = Answers {
      about: "a".into(),
      experience: "b".into(),
      availability: "c".into(),
      motivation: "d".into(),
      scenario: " ".into(),
    };
    let app = StaffApplication::new(&identity, "foo_ingame", Position::Gm, answers);

    assert_eq!(app.status, ApplicationStatus::Pending);
    assert_eq!(app.discord_id, "42");
    assert_eq!(app.avatar_url, identity.avatar_url);
    assert!(!app.answers.is_complete());
  }
}
