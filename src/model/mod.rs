//! Portal entity model.
//!
//! These are the shapes exchanged with the hosted backend, the webhook and
//! the HTTP clients. Field names on the wire follow the backend tables.

pub mod drop_map;
pub mod identity;
pub mod item;
pub mod staff;
pub mod support;

pub use drop_map::{DropEntry, DropMap, DropMapCategory, MapPoint, MarkerKind, MobEntry};
pub use identity::Identity;
pub use item::{CLASS_ALL, Category, Faction, Gender, Item, Rarity, classes_of};
pub use staff::{Answers, ApplicationStatus, Position, StaffApplication};
pub use support::{RequestType, SupportRequest};

/// Fresh opaque identifier for entities created by the portal.
pub fn new_id() -> String {
  uuid::Uuid::new_v4().to_string()
}
