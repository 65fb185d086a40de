pub mod local;
pub mod session;
pub mod settings;

pub use local::Local;
pub use session::Session;
pub use settings::Settings;

#[cfg(test)]
pub(crate) async fn memory_db() -> sea_orm::DatabaseConnection {
  use migration::{Migrator, MigratorTrait};

  let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
  Migrator::up(&db, None).await.unwrap();
  db
}
