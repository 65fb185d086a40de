pub mod poll;
pub mod server;

use std::{sync::Arc, time::Duration};

use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// A background task of the portal: the HTTP server or one of the pollers.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  /// Runs for the lifetime of the portal; returning counts as a stop.
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

const MIN_RESTART_DELAY: Duration = Duration::from_secs(1);
const MAX_RESTART_DELAY: Duration = Duration::from_secs(60);

/// Delay before the next restart. Doubles while runs keep dying quickly and
/// starts over once a run stayed up longer than the cap.
fn backoff(previous: Duration, ran_for: Duration) -> Duration {
  if ran_for >= MAX_RESTART_DELAY {
    MIN_RESTART_DELAY
  } else {
    (previous * 2).clamp(MIN_RESTART_DELAY, MAX_RESTART_DELAY)
  }
}

/// Keeps the server and pollers alive, restarting any that stop.
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  pub async fn run(self, app: Arc<AppState>) {
    for plugin in self.plugins {
      let app = app.clone();

      tokio::spawn(async move {
        let name = plugin.name();
        let mut delay = Duration::ZERO;
        info!("Plugin `{name}` started");

        loop {
          let started = Instant::now();
          let task = {
            let (app, plugin) = (app.clone(), plugin.clone());
            tokio::spawn(async move { plugin.start(app).await })
          };

          match task.await {
            Ok(Ok(())) => warn!("Plugin `{name}` stopped"),
            Ok(Err(err)) => error!("Plugin `{name}` failed: {err:#}"),
            Err(err) if err.is_cancelled() => {
              info!("Plugin `{name}` cancelled");
              break;
            }
            Err(_) => error!("Plugin `{name}` panicked"),
          }

          delay = backoff(delay, started.elapsed());
          debug!("Restarting plugin `{name}` in {delay:?}");
          sleep(delay).await;
        }
      });
    }
  }
}
