//! Drop-list portal - fan-site backend for a game community
//!
//! Architecture:
//! - SeaORM for the local store (SQLite)
//! - Axum for the HTTP API with rate limiting
//! - Reqwest for the hosted backend, webhook, identity and lore services
//! - Tokio for async runtime, with supervised plugins for the pollers

mod admin;
mod catalogue;
mod editor;
mod entity;
mod error;
mod gateway;
mod identity;
mod lore;
mod model;
mod notify;
mod plugins;
mod portal;
mod prelude;
mod snapshot;
mod state;
mod sv;
mod sync;
mod utils;
mod viewer;

use std::sync::Arc;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{App, poll, server},
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "portal=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  info!("Starting portal v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config).await?);
  app.reload().await.context("Initial load failed")?;

  App::new()
    .register(server::Plugin)
    .register(poll::Catalogue)
    .register(poll::Logo)
    .run(app)
    .await;

  tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
  info!("Shutting down");
  Ok(())
}
