//! Local store migrations for the portal

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_settings;
mod m20261019_000002_create_sessions;
mod m20261019_000003_create_local_entities;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261019_000001_create_settings::Migration),
      Box::new(m20261019_000002_create_sessions::Migration),
      Box::new(m20261019_000003_create_local_entities::Migration),
    ]
  }
}
