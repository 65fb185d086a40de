//! SeaORM entities of the local store.
//!
//! The local store plays the part of the browser storage of a front-end:
//! cached settings, identity sessions and entities saved while the hosted
//! backend is unreachable.

pub mod local_entity;
pub mod session;
pub mod setting;

pub use local_entity::EntityKind;
