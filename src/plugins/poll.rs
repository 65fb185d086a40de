use std::sync::Arc;

use crate::{plugins::Plugin, prelude::*, state::AppState};

/// Refetches items and drop maps for the public pages.
pub struct Catalogue;

#[async_trait]
impl Plugin for Catalogue {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut interval = time::interval(app.config.catalogue_poll);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
      interval.tick().await;

      match app.refresh_catalogue().await {
        Ok(true) => {
          let catalogue = app.catalogue.get();
          debug!(
            "Catalogue refreshed: {} items, {} drop maps",
            catalogue.items.len(),
            catalogue.drop_maps.len()
          );
        }
        Ok(false) => debug!("Discarding stale catalogue fetch"),
        Err(err) => error!("Catalogue refresh failed: {err}"),
      }
    }
  }
}

/// Keeps the site logo in step with the `site_logo` setting.
pub struct Logo;

#[async_trait]
impl Plugin for Logo {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut interval = time::interval(app.config.logo_poll);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
      interval.tick().await;

      let before = app.logo.get();
      if app.refresh_logo().await && app.logo.get() != before {
        info!("Site logo changed to {:?}", app.logo.get());
      }
    }
  }
}
