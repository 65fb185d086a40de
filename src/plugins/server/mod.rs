mod admin;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

fn public() -> Router<Arc<AppState>> {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/catalogue", get(handlers::catalogue))
    .route("/api/classes/{faction}", get(handlers::classes))
    .route("/api/rarities", get(handlers::rarities))
    .route("/api/drop-maps", get(handlers::drop_maps))
    .route("/api/drop-maps/{id}", get(handlers::drop_map))
    .route("/api/drop-maps/{id}/overlay", get(handlers::overlay))
    .route("/api/logo", get(handlers::logo))
    .route("/api/lore", get(handlers::lore))
    .route("/api/auth/authorize", get(handlers::authorize))
    .route("/api/auth/callback", post(handlers::callback))
    .route("/api/auth/me", get(handlers::me))
    .route("/api/auth/logout", post(handlers::logout))
    .route("/api/support", post(handlers::support))
    .route("/api/applications", post(handlers::apply))
}

fn admin() -> Router<Arc<AppState>> {
  Router::new()
    .route("/me", get(admin::me))
    .route("/items", get(admin::items).post(admin::create_item))
    .route("/items/{id}", put(admin::update_item).delete(admin::delete_item))
    .route("/drop-maps", get(admin::drop_maps))
    .route("/drop-maps/{id}", delete(admin::delete_drop_map))
    .route("/drop-maps/{id}/edit", post(admin::edit_drop_map))
    .route("/editor", get(admin::editor))
    .route("/editor/action", post(admin::editor_action))
    .route("/editor/save", post(admin::editor_save))
    .route("/applications", get(admin::applications))
    .route("/applications/{id}", delete(admin::delete_application))
    .route("/applications/{id}/status", put(admin::set_status))
    .route("/settings", get(admin::settings))
    .route(
      "/settings/{key}",
      get(admin::setting).put(admin::set_setting).delete(admin::delete_setting),
    )
    .route("/upload", post(admin::upload))
    .route("/sync/export", get(admin::export))
    .route("/sync/apply", post(admin::sync_apply))
}

pub fn router(app: Arc<AppState>) -> Router {
  public().nest("/api/admin", admin()).with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = router(app)
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Portal listening on {addr}");

    let limiter = async {
      loop {
        time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}
