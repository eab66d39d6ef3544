//! Domain model for notes and tags read from the host app's store.
//!
//! # Responsibility
//! - Define the entities returned to callers.
//! - Convert store-native timestamps into calendar time.
//!
//! # Invariants
//! - Values are ephemeral projections; nothing here is written back.

pub mod note;
pub mod time;
