//! Messaging webhook: support tickets, staff applications, welcome notices.
//!
//! Delivery is a single POST; success is the transport call succeeding with
//! a 2xx status. Nothing in the response is read and nothing is retried.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::{
  model::{StaffApplication, SupportRequest},
  prelude::*,
  utils,
};

/// Per-field value limit of the webhook embeds.
const FIELD_LIMIT: usize = 1024;

const APPLICATION_COLOR: u32 = 0x5865f2;
const WELCOME_COLOR: u32 = 0x57f287;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
  pub name: String,
  pub value: String,
  pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
  pub title: String,
  pub color: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub thumbnail: Option<Thumbnail>,
  pub fields: Vec<Field>,
  pub timestamp: DateTime<Utc>,
}

impl Message {
  pub fn new(title: impl Into<String>, color: u32) -> Self {
    Self {
      title: title.into(),
      color,
      thumbnail: None,
      fields: Vec::new(),
      timestamp: Utc::now(),
    }
  }

  pub fn thumbnail(mut self, url: Option<&str>) -> Self {
    self.thumbnail = url
      .filter(|url| !url.is_empty())
      .map(|url| Thumbnail { url: url.to_string() });
    self
  }

  pub fn field(mut self, name: &str, value: &str, inline: bool) -> Self {
    self.fields.push(Field {
      name: name.to_string(),
      value: utils::truncate(utils::or_dash(value), FIELD_LIMIT),
      inline,
    });
    self
  }

  pub fn support(request: &SupportRequest) -> Self {
    Message::new(format!("Nuevo ticket: {}", request.kind.label()), request.kind.color())
      .thumbnail(request.avatar_url.as_deref())
      .field("Discord ID", &request.discord_id, true)
      .field("Usuario", &request.username, true)
      .field("Tipo", request.kind.label(), true)
      .field("Descripción", &request.description, false)
  }

  pub fn application(application: &StaffApplication) -> Self {
    let message = Message::new(
      format!("Nueva postulación: {}", application.position.label()),
      APPLICATION_COLOR,
    )
    .thumbnail(Some(application.avatar_url.as_str()))
    .field("Discord ID", &application.discord_name, true)
    .field("ID numérico", &application.discord_id, true)
    .field("Usuario", &application.username, true);

    application
      .answers
      .pairs()
      .into_iter()
      .fold(message, |message, (question, answer)| {
        message.field(question, answer, false)
      })
  }

  pub fn welcome(application: &StaffApplication) -> Self {
    Message::new(
      format!("¡Bienvenido al staff, {}!", application.discord_name),
      WELCOME_COLOR,
    )
    .thumbnail(Some(application.avatar_url.as_str()))
    .field("Posición", application.position.label(), true)
    .field("Usuario", &application.username, true)
  }
}

pub struct Notifier {
  client: Client,
  url: Option<String>,
}

impl Notifier {
  pub fn new(url: Option<String>) -> Self {
    if url.is_none() {
      warn!("Webhook not configured, notifications disabled");
    }
    Self { client: Client::new(), url }
  }

  pub async fn send(&self, message: &Message) -> Result<()> {
    let url = self.url.as_deref().ok_or(Error::WebhookNotConfigured)?;

    let response = self
      .client
      .post(url)
      .json(&json::json!({ "embeds": [message] }))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Backend { status: status.as_u16(), body });
    }

    debug!("Webhook delivered `{}`", message.title);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Answers, Identity, Position, RequestType};

  impl Message {
    fn value(&self, name: &str) -> Option<&str> {
      self
        .fields
        .iter()
        .find(|field| field.name == name)
        .map(|field| field.value.as_str())
    }
  }

  #[test]
  fn bug_ticket_from_identity() {
    let identity = Identity::new("Foo#0", "42", None);
    let request = SupportRequest::new(&identity, "foo", RequestType::Bug, "X");
    let message = Message::support(&request);

    assert_eq!(message.color, 0xff0000);
    assert_eq!(message.value("Discord ID"), Some("Foo#0"));
    assert_eq!(message.value("Descripción"), Some("X"));
    assert_eq!(
      message.thumbnail.as_ref().map(|t| t.url.as_str()),
      Some("https://cdn.discordapp.com/embed/avatars/2.png")
    );
  }

  #[test]
  fn colors_follow_request_type() {
    let identity = Identity::new("Foo", "1", None);
    for (kind, color) in [
      (RequestType::UserReport, 0xffa500),
      (RequestType::Donation, 0x00ff00),
      (RequestType::Other, 0x5865f2),
    ] {
      let request = SupportRequest::new(&identity, "foo", kind, "d");
      assert_eq!(Message::support(&request).color, color);
    }
  }

  #[test]
  fn application_lists_every_answer() {
    let identity = Identity::new("Foo", "42", Some("hash"));
    let answers = Answers {
      about: "a".into(),
      experience: "b".into(),
      availability: "c".into(),
      motivation: "d".into(),
      scenario: "e".repeat(2000),
    };
    let application =
      StaffApplication::new(&identity, "foo", Position::GameSage, answers);
    let message = Message::application(&application);

    assert_eq!(message.fields.len(), 8);
    assert!(message.title.ends_with("Game Sage"));
    assert_eq!(message.value("Caso práctico").unwrap().chars().count(), FIELD_LIMIT);
  }

  #[test]
  fn payload_shape() {
    let message = Message::new("t", 1).field("a", "", true);
    let value = json::to_value(&message).unwrap();

    assert_eq!(value["fields"][0]["value"], "-");
    assert!(value.get("thumbnail").is_none());
    assert!(value["timestamp"].is_string());
  }

  #[tokio::test]
  async fn unconfigured_webhook_fails() {
    let notifier = Notifier::new(None);
    let err = notifier.send(&Message::new("t", 1)).await.unwrap_err();
    assert!(matches!(err, Error::WebhookNotConfigured));
  }
}
