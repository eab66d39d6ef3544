//! Core data access for bearlink.
//!
//! Reads go straight to the host app's SQLite store, opened read-only.
//! Writes are callback-URL actions the host app applies on its own schedule.

pub mod action;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use action::{Action, ActionChannel, ActionError, ActionRequest, SystemActionChannel};
pub use config::{BridgeConfig, LogLevel};
pub use db::{NoteStore, StoreError, StoreLocator, StoreState};
pub use logging::{error_chain, init_logging};
pub use model::note::{Note, NoteId, Tag};
pub use repo::note_repo::{NoteReader, NoteSearch, SqliteNoteReader};
pub use repo::{RepoError, RepoResult};
pub use service::note_service::{NoteService, NoteServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
