use std::{collections::HashSet, env};

use axum::http::{HeaderMap, header};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use crate::{
  admin::Admin,
  editor::Editor,
  gateway::{CloudConfig, Gateway},
  identity::Bridge,
  lore::Lore,
  model::{DropMap, Identity, Item},
  notify::Notifier,
  portal::Portal,
  prelude::*,
  snapshot::Snapshot,
  sv,
};

/// Setting holding the site logo URL.
pub const LOGO_KEY: &str = "site_logo";

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub public_url: Option<String>,
  pub cloud: CloudConfig,
  pub webhook_url: Option<String>,
  pub discord_client_id: Option<String>,
  pub gemini_key: Option<String>,
  pub admins: HashSet<i64>,
  pub catalogue_poll: Duration,
  pub logo_poll: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite:portal.db?mode=rwc"),
      port: 3000,
      public_url: None,
      cloud: CloudConfig {
        url: None,
        key: None,
        bucket: String::from("images"),
      },
      webhook_url: None,
      discord_client_id: None,
      gemini_key: None,
      admins: HashSet::new(),
      catalogue_poll: Duration::from_secs(60),
      logo_poll: Duration::from_secs(10),
    }
  }
}

fn optional(name: &str) -> Option<String> {
  env::var(name)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn interval(name: &str, default: Duration) -> anyhow::Result<Duration> {
  match optional(name) {
    Some(value) => {
      let period = humantime::parse_duration(&value)
        .with_context(|| format!("Invalid {name} `{value}`"))?;
      anyhow::ensure!(!period.is_zero(), "{name} must be positive");
      Ok(period)
    }
    None => Ok(default),
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let defaults = Self::default();

    let admins = optional("ADMIN_IDS")
      .unwrap_or_default()
      .split(',')
      .filter(|id| !id.trim().is_empty())
      .map(|id| {
        id.trim().parse().with_context(|| format!("Invalid admin id `{id}`"))
      })
      .collect::<anyhow::Result<HashSet<i64>>>()?;

    let port = match optional("PORT") {
      Some(port) => port.parse().context("Invalid PORT")?,
      None => defaults.port,
    };

    Ok(Self {
      database_url: optional("DATABASE_URL").unwrap_or(defaults.database_url),
      port,
      public_url: optional("PUBLIC_URL"),
      cloud: CloudConfig {
        url: optional("SUPABASE_URL"),
        key: optional("SUPABASE_KEY"),
        bucket: optional("SUPABASE_BUCKET").unwrap_or(defaults.cloud.bucket),
      },
      webhook_url: optional("DISCORD_WEBHOOK_URL"),
      discord_client_id: optional("DISCORD_CLIENT_ID"),
      gemini_key: optional("GEMINI_API_KEY"),
      admins,
      catalogue_poll: interval("CATALOGUE_POLL", defaults.catalogue_poll)?,
      logo_poll: interval("LOGO_POLL", defaults.logo_poll)?,
    })
  }
}

/// Session id carried as `Authorization: Bearer <session>`.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|session| !session.is_empty())
}

/// Remote entities as last fetched, plus the locally saved ones.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
  pub items: Vec<Item>,
  pub drop_maps: Vec<DropMap>,
}

pub struct Services<'a> {
  pub settings: sv::Settings<'a>,
  pub session: sv::Session<'a>,
  pub local: sv::Local<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub gateway: Gateway,
  pub notifier: Notifier,
  pub bridge: Bridge,
  pub lore: Lore,
  pub config: Config,
  pub catalogue: Snapshot<Catalogue>,
  pub logo: Snapshot<Option<String>>,
  /// Drop-map drafts, one per admin identity id.
  pub editors: DashMap<String, Editor>,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    if config.admins.is_empty() {
      warn!("No admins configured, admin console disabled");
    }

    Self {
      gateway: Gateway::new(&config.cloud, db.clone()),
      notifier: Notifier::new(config.webhook_url.clone()),
      bridge: Bridge::new(config.discord_client_id.clone()),
      lore: Lore::new(config.gemini_key.clone()),
      catalogue: Snapshot::new(Catalogue::default()),
      logo: Snapshot::new(None),
      editors: DashMap::new(),
      db,
      config,
    }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      settings: sv::Settings::new(&self.db),
      session: sv::Session::new(&self.db),
      local: sv::Local::new(&self.db),
    }
  }

  pub fn portal(&self) -> Portal<'_> {
    Portal::new(self)
  }

  /// Refetch remote entities wholesale.
  pub async fn refresh_catalogue(&self) -> Result<bool> {
    let ticket = self.catalogue.ticket();

    let (mut items, mut drop_maps) =
      futures::join!(self.gateway.items(), self.gateway.drop_maps());

    let local = self.sv().local;
    items.extend(local.items().await?);
    drop_maps.extend(local.drop_maps().await?);

    debug!("Fetched {} items and {} drop maps", items.len(), drop_maps.len());
    Ok(self.catalogue.commit(ticket, Catalogue { items, drop_maps }))
  }

  pub async fn refresh_logo(&self) -> bool {
    let ticket = self.logo.ticket();
    let logo = self.gateway.setting(LOGO_KEY).await;
    self.logo.commit(ticket, logo)
  }

  /// Reload everything the public pages show.
  pub async fn reload(&self) -> Result<()> {
    let (catalogue, _) =
      futures::join!(self.refresh_catalogue(), self.refresh_logo());
    catalogue.map(|_| ())
  }

  /// Identity of the session in the `Authorization: Bearer` header.
  pub async fn identity(&self, headers: &HeaderMap) -> Result<Identity> {
    let session = session_id(headers).ok_or(Error::Unauthenticated)?;
    self.sv().session.identity(session).await?.ok_or(Error::Unauthenticated)
  }

  pub fn is_admin(&self, identity: &Identity) -> bool {
    identity.numeric_id().is_some_and(|id| self.config.admins.contains(&id))
  }

  /// Admin console for the caller, if their identity holds the admin role.
  pub async fn admin(&self, headers: &HeaderMap) -> Result<Admin<'_>> {
    let identity = self.identity(headers).await?;
    if !self.is_admin(&identity) {
      warn!("`{}` ({}) denied admin access", identity.name, identity.id);
      return Err(Error::Forbidden);
    }
    Ok(Admin::new(self, identity))
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use axum::http::HeaderValue;

  use super::*;
  use crate::{
    gateway::{Backend, tests::MemoryBackend},
    model::Category,
    sv::memory_db,
  };

  pub async fn test_app(backend: Option<Arc<MemoryBackend>>) -> AppState {
    let mut config = Config::default();
    config.admins.insert(42);

    let mut app = AppState::with_db(memory_db().await, config);
    app.gateway = Gateway::with_backend(
      backend.map(|backend| backend as Arc<dyn Backend>),
      app.db.clone(),
    );
    app
  }

  pub async fn bearer(app: &AppState, identity: &Identity) -> HeaderMap {
    let session = app.sv().session.create(identity).await.unwrap();
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Bearer {session}")).unwrap(),
    );
    headers
  }

  #[tokio::test]
  async fn test_missing_session_is_unauthenticated() {
    let app = test_app(None).await;
    let err = app.identity(&HeaderMap::new()).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));
  }

  #[tokio::test]
  async fn test_admin_role_check() {
    let app = test_app(None).await;

    let admin = bearer(&app, &Identity::new("Boss", "42", None)).await;
    assert!(app.admin(&admin).await.is_ok());

    let user = bearer(&app, &Identity::new("Foo", "7", None)).await;
    assert!(matches!(app.admin(&user).await, Err(Error::Forbidden)));
  }

  #[tokio::test]
  async fn test_refresh_includes_local_entities() {
    let backend = Arc::new(MemoryBackend::default());
    let app = test_app(Some(backend.clone())).await;

    let lobo = Item::new("Lobo", Category::Mount, "/l.png");
    app.gateway.add_item(lobo).await.unwrap();
    let mut local = Item::new("Oso", Category::Mount, "/o.png");
    local.id = "local-1".into();
    app.sv().local.put_item(&local).await.unwrap();

    assert!(app.refresh_catalogue().await.unwrap());
    let names: Vec<_> =
      app.catalogue.get().items.iter().map(|item| item.name.clone()).collect();
    assert_eq!(names, ["Lobo", "Oso"]);
  }

  #[tokio::test]
  async fn test_logo_follows_setting() {
    let app = test_app(None).await;
    app.refresh_logo().await;
    assert_eq!(*app.logo.get(), None);

    app.gateway.set_setting(LOGO_KEY, "/logo.png").await.unwrap();
    app.refresh_logo().await;
    assert_eq!(app.logo.get().as_deref(), Some("/logo.png"));
  }
}
