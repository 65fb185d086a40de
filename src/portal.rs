//! Public side of the portal: catalogue, drop list and the two forms that
//! need an identity.

use serde::Deserialize;

use crate::{
  catalogue::{self, Filter, ItemCard},
  editor::Rect,
  model::{
    Answers, Category, DropMap, Identity, Position, RequestType,
    StaffApplication, SupportRequest,
  },
  notify::Message,
  prelude::*,
  state::AppState,
  viewer::{self, Marker, MobCard},
};

#[derive(Debug, Clone, Deserialize)]
pub struct SupportForm {
  pub username: String,
  #[serde(rename = "type")]
  pub kind: RequestType,
  pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationForm {
  pub username: String,
  pub position: Position,
  pub answers: Answers,
}

pub struct Portal<'a> {
  app: &'a AppState,
}

impl<'a> Portal<'a> {
  pub fn new(app: &'a AppState) -> Self {
    Self { app }
  }

  /// Bundled items followed by the last fetched ones, narrowed by `filter`.
  pub fn catalogue(&self, filter: &Filter) -> Vec<ItemCard> {
    let snapshot = self.app.catalogue.get();
    let items = catalogue::union(&catalogue::defaults(), &snapshot.items);
    catalogue::filter(&items, filter).into_iter().map(ItemCard::from).collect()
  }

  /// Flavor text for a catalogue item. Names outside the catalogue are
  /// refused before any generation call.
  pub async fn lore(&self, name: &str, category: Category) -> Result<String> {
    let snapshot = self.app.catalogue.get();
    let known = catalogue::union(&catalogue::defaults(), &snapshot.items)
      .iter()
      .any(|item| item.name == name && item.category == category);
    if !known {
      return Err(Error::NotFound("Item"));
    }
    Ok(self.app.lore.describe(name, category).await)
  }

  pub fn drop_maps(&self) -> Vec<DropMap> {
    self.app.catalogue.get().drop_maps.clone()
  }

  pub fn drop_map(&self, id: &str) -> Result<DropMap> {
    self
      .app
      .catalogue
      .get()
      .drop_maps
      .iter()
      .find(|map| map.id == id)
      .cloned()
      .ok_or(Error::NotFound("Drop map"))
  }

  pub fn mob_cards(&self, id: &str) -> Result<Vec<MobCard>> {
    Ok(viewer::mob_cards(&self.drop_map(id)?))
  }

  pub fn overlay(&self, id: &str, rect: Rect) -> Result<Vec<Marker>> {
    Ok(viewer::overlay(&self.drop_map(id)?, rect))
  }

  pub async fn submit_support(
    &self,
    identity: &Identity,
    form: SupportForm,
  ) -> Result<()> {
    if form.username.trim().is_empty() {
      return Err(Error::validation("Username is required"));
    }
    if form.description.trim().is_empty() {
      return Err(Error::validation("Description is required"));
    }

    let request =
      SupportRequest::new(identity, form.username, form.kind, form.description);
    self.app.notifier.send(&Message::support(&request)).await?;

    info!(
      "Support ticket `{}` from `{}` forwarded",
      request.kind.label(),
      identity.name
    );
    Ok(())
  }

  /// Store an application, then announce it. Only the store can fail.
  pub async fn submit_application(
    &self,
    identity: &Identity,
    form: ApplicationForm,
  ) -> Result<StaffApplication> {
    if form.username.trim().is_empty() {
      return Err(Error::validation("Username is required"));
    }
    if !form.answers.is_complete() {
      return Err(Error::validation("Every question must be answered"));
    }

    let ApplicationForm { username, position, answers } = form;
    let application =
      StaffApplication::new(identity, username, position, answers);
    self.app.gateway.add_staff_application(&application).await?;
    info!(
      "Application `{}` for {} stored",
      application.id,
      application.position.label()
    );

    if let Err(err) =
      self.app.notifier.send(&Message::application(&application)).await
    {
      warn!("Application `{}` not announced: {err}", application.id);
    }

    Ok(application)
  }
}
