//! Admin console.
//!
//! Only reachable through [`AppState::admin`], which checks the caller's
//! identity against the configured admin ids.

use reqwest::Url;
use serde::Serialize;

use crate::{
  editor::{Action, Editor, Outcome, Save},
  model::{
    self, ApplicationStatus, CLASS_ALL, Category, DropMap, Identity, Item,
    StaffApplication, classes_of,
  },
  notify::Message,
  prelude::*,
  state::{AppState, LOGO_KEY},
  sync,
};

/// Where a saved entity ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stored", content = "entity", rename_all = "lowercase")]
pub enum Stored<T> {
  Cloud(T),
  /// The backend is not configured; the entity rides along in the sync token.
  Local(T),
}

#[derive(Debug, Clone, Serialize)]
pub struct Setting {
  pub key: String,
  pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncExport {
  pub token: String,
  /// Public portal URL carrying the token, when `PUBLIC_URL` is set.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncApplied {
  #[serde(flatten)]
  pub applied: sync::Applied,
  /// The same URL with the token removed.
  pub redirect: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
  pub outcome: Outcome,
  pub editor: Editor,
}

fn validate_item(item: &Item) -> Result<()> {
  if item.is_bundled() {
    return Err(Error::validation("Bundled items are read-only"));
  }
  if item.name.trim().is_empty() {
    return Err(Error::validation("Item name is required"));
  }
  if item.image.trim().is_empty() {
    return Err(Error::validation("Item image is required"));
  }

  if item.category == Category::Costume {
    if item.faction.is_none() {
      return Err(Error::validation("Costumes require a faction"));
    }
    if item.gender.is_none() {
      return Err(Error::validation("Costumes require a gender"));
    }
    if item.item_class.as_deref().is_none_or(|class| class.trim().is_empty()) {
      return Err(Error::validation("Costumes require a class"));
    }
  }
  Ok(())
}

/// Factions without a class list only ever carry `All`.
fn default_class(item: &mut Item) {
  if item.category == Category::Costume
    && item.faction.is_some_and(|faction| classes_of(faction).is_empty())
    && item.item_class.as_deref().is_none_or(|class| class.trim().is_empty())
  {
    item.item_class = Some(CLASS_ALL.to_string());
  }
}

pub struct Admin<'a> {
  app: &'a AppState,
  identity: Identity,
}

impl<'a> Admin<'a> {
  pub fn new(app: &'a AppState, identity: Identity) -> Self {
    Self { app, identity }
  }

  pub fn identity(&self) -> &Identity {
    &self.identity
  }

  async fn refresh(&self) {
    if let Err(err) = self.app.refresh_catalogue().await {
      warn!("Catalogue refresh after admin change failed: {err}");
    }
  }

  /// Every stored item, fetched fresh.
  pub async fn items(&self) -> Result<Vec<Item>> {
    self.app.refresh_catalogue().await?;
    Ok(self.app.catalogue.get().items.clone())
  }

  /// Insert or update `item`, falling back to local storage when the
  /// backend is not configured.
  pub async fn save_item(&self, mut item: Item) -> Result<Stored<Item>> {
    default_class(&mut item);
    validate_item(&item)?;

    let saved = if item.id.is_empty() {
      self.app.gateway.add_item(item.clone()).await
    } else {
      self.app.gateway.update_item(&item).await.map(|_| item.clone())
    };

    let stored = match saved {
      Ok(item) => Stored::Cloud(item),
      Err(Error::CloudNotConfigured) => {
        if item.id.is_empty() {
          item.id = model::new_id();
        }
        self.app.sv().local.put_item(&item).await?;
        Stored::Local(item)
      }
      Err(err) => return Err(err),
    };

    info!("Item saved by `{}`: {stored:?}", self.identity.name);
    self.refresh().await;
    Ok(stored)
  }

  pub async fn delete_item(&self, id: &str) -> Result<()> {
    if id.starts_with("default-") {
      return Err(Error::validation("Bundled items are read-only"));
    }

    let local = self.app.sv().local.remove_item(id).await?;
    match self.app.gateway.delete_item(id).await {
      Ok(()) => {}
      Err(Error::CloudNotConfigured) if local => {}
      Err(Error::CloudNotConfigured) => return Err(Error::NotFound("Item")),
      Err(err) => return Err(err),
    }

    info!("Item `{id}` deleted by `{}`", self.identity.name);
    self.refresh().await;
    Ok(())
  }

  pub async fn drop_maps(&self) -> Result<Vec<DropMap>> {
    self.app.refresh_catalogue().await?;
    Ok(self.app.catalogue.get().drop_maps.clone())
  }

  pub async fn delete_drop_map(&self, id: &str) -> Result<()> {
    let local = self.app.sv().local.remove_drop_map(id).await?;
    match self.app.gateway.delete_drop_map(id).await {
      Ok(()) => {}
      Err(Error::CloudNotConfigured) if local => {}
      Err(Error::CloudNotConfigured) => return Err(Error::NotFound("Drop map")),
      Err(err) => return Err(err),
    }

    info!("Drop map `{id}` deleted by `{}`", self.identity.name);
    self.refresh().await;
    Ok(())
  }

  /// Current draft of this admin.
  pub fn editor(&self) -> Editor {
    self
      .app
      .editors
      .get(&self.identity.id)
      .map(|editor| editor.value().clone())
      .unwrap_or_default()
  }

  pub fn apply(&self, action: Action) -> Result<EditorView> {
    let mut editor =
      self.app.editors.entry(self.identity.id.clone()).or_default();
    let outcome = editor.apply(action)?;
    Ok(EditorView { outcome, editor: editor.value().clone() })
  }

  /// Load a stored map into this admin's draft.
  pub fn edit(&self, id: &str) -> Result<Editor> {
    let map = self
      .app
      .catalogue
      .get()
      .drop_maps
      .iter()
      .find(|map| map.id == id)
      .cloned()
      .ok_or(Error::NotFound("Drop map"))?;

    let editor = Editor::load(map);
    self.app.editors.insert(self.identity.id.clone(), editor.clone());
    Ok(editor)
  }

  /// Persist the draft. The draft is only reset once the write succeeded.
  pub async fn save_drop_map(&self) -> Result<Stored<DropMap>> {
    let save = self.editor().save()?;

    let saved = match &save {
      Save::Insert(map) => self.app.gateway.add_drop_map(map.clone()).await,
      Save::Replace(map) => {
        self.app.gateway.update_drop_map(map).await.map(|_| map.clone())
      }
    };

    let stored = match saved {
      Ok(map) => Stored::Cloud(map),
      Err(Error::CloudNotConfigured) => {
        let (Save::Insert(mut map) | Save::Replace(mut map)) = save;
        if map.id.is_empty() {
          map.id = model::new_id();
        }
        self.app.sv().local.put_drop_map(&map).await?;
        Stored::Local(map)
      }
      Err(err) => return Err(err),
    };

    self.app.editors.remove(&self.identity.id);
    info!("Drop map saved by `{}`", self.identity.name);
    self.refresh().await;
    Ok(stored)
  }

  pub async fn applications(&self) -> Vec<StaffApplication> {
    self.app.gateway.staff_applications().await
  }

  /// Accepting an application also sends the welcome notice.
  pub async fn set_status(
    &self,
    id: &str,
    status: ApplicationStatus,
  ) -> Result<()> {
    self.app.gateway.set_application_status(id, status).await?;
    info!("Application `{id}` marked {status:?} by `{}`", self.identity.name);

    if status != ApplicationStatus::Accepted {
      return Ok(());
    }

    let accepted = self
      .applications()
      .await
      .into_iter()
      .find(|application| application.id == id);

    match accepted {
      Some(application) => {
        if let Err(err) =
          self.app.notifier.send(&Message::welcome(&application)).await
        {
          warn!("Welcome notice for `{id}` not sent: {err}");
        }
      }
      None => warn!("Accepted application `{id}` not found for welcome notice"),
    }
    Ok(())
  }

  pub async fn delete_application(&self, id: &str) -> Result<()> {
    self.app.gateway.delete_staff_application(id).await?;
    info!("Application `{id}` deleted by `{}`", self.identity.name);
    Ok(())
  }

  /// Locally cached settings.
  pub async fn settings(&self) -> Result<Vec<Setting>> {
    Ok(
      self
        .app
        .sv()
        .settings
        .all()
        .await?
        .into_iter()
        .map(|row| Setting { key: row.key, value: row.value })
        .collect(),
    )
  }

  pub async fn setting(&self, key: &str) -> Result<Setting> {
    let value =
      self.app.gateway.setting(key).await.ok_or(Error::NotFound("Setting"))?;
    Ok(Setting { key: key.to_string(), value })
  }

  pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
    if key.trim().is_empty() {
      return Err(Error::validation("Setting key is required"));
    }

    self.app.gateway.set_setting(key, value).await?;
    debug!("Setting `{key}` updated by `{}`", self.identity.name);

    if key == LOGO_KEY {
      self.app.refresh_logo().await;
    }
    Ok(())
  }

  pub async fn delete_setting(&self, key: &str) -> Result<()> {
    if !self.app.sv().settings.remove(key).await? {
      return Err(Error::NotFound("Setting"));
    }
    if key == LOGO_KEY {
      self.app.refresh_logo().await;
    }
    Ok(())
  }

  pub async fn upload(
    &self,
    name: &str,
    content_type: &str,
    bytes: Vec<u8>,
  ) -> Result<String> {
    if !content_type.starts_with("image/") {
      return Err(Error::validation(format!("Not an image: `{content_type}`")));
    }
    if bytes.is_empty() {
      return Err(Error::validation("Empty upload"));
    }

    let url = self.app.gateway.upload_image(name, content_type, bytes).await?;
    info!("Image `{name}` uploaded by `{}`", self.identity.name);
    Ok(url)
  }

  /// Token carrying the local cache to another session.
  pub async fn export(&self) -> Result<SyncExport> {
    let token = sync::encode(&sync::export(&self.app.db).await?)?;

    let url = match self.app.config.public_url.as_deref() {
      Some(base) => match Url::parse(base) {
        Ok(base) => Some(sync::embed(&base, &token).to_string()),
        Err(err) => {
          warn!("Invalid PUBLIC_URL `{base}`: {err}");
          None
        }
      },
      None => None,
    };

    Ok(SyncExport { token, url })
  }

  /// Merge the token carried by `url` into the server-wide settings and
  /// local store, then reload what the public pages show.
  pub async fn apply_sync(&self, url: &str) -> Result<SyncApplied> {
    let url = Url::parse(url)
      .map_err(|err| Error::validation(format!("bad url: {err}")))?;
    let token = sync::token_of(&url)
      .ok_or_else(|| Error::validation("No sync token in url"))?;

    let payload = sync::decode(&token).inspect_err(|err| {
      warn!("Rejecting sync token from `{}`: {err}", self.identity.name);
    })?;
    let applied = sync::apply(&self.app.db, &payload).await?;
    info!("Sync token applied by `{}`: {applied:?}", self.identity.name);

    self.app.reload().await?;
    Ok(SyncApplied { applied, redirect: sync::strip(&url).to_string() })
  }
}
