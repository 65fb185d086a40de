use serde::{Deserialize, Serialize};

use super::Identity;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
  Bug,
  #[serde(rename = "User Report")]
  UserReport,
  Donation,
  Other,
}

impl RequestType {
  pub fn label(self) -> &'static str {
    match self {
      RequestType::Bug => "Bug",
      RequestType::UserReport => "User Report",
      RequestType::Donation => "Donation",
      RequestType::Other => "Other",
    }
  }

  /// Embed color of the ticket message.
  pub fn color(self) -> u32 {
    match self {
      RequestType::Bug => 0xff0000,
      RequestType::UserReport => 0xffa500,
      RequestType::Donation => 0x00ff00,
      RequestType::Other => 0x5865f2,
    }
  }
}

/// Support ticket. Never persisted, forwarded straight to the webhook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportRequest {
  pub username: String,
  #[serde(rename = "type")]
  pub kind: RequestType,
  pub description: String,
  pub discord_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar_url: Option<String>,
}

impl SupportRequest {
  pub fn new(
    identity: &Identity,
    username: impl Into<String>,
    kind: RequestType,
    description: impl Into<String>,
  ) -> Self {
    Self {
      username: username.into(),
      kind,
      description: description.into(),
      discord_id: identity.name.clone(),
      avatar_url: Some(identity.avatar_url.clone()),
    }
  }
}
