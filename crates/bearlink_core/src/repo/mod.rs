//! Read path over the host app's store.
//!
//! # Responsibility
//! - Define the read contract used by the service layer.
//! - Keep SQL and store schema details out of service/API layers.
//!
//! # Invariants
//! - Repository reads never mutate the store.
//! - A single-note miss is `Ok(None)`, never an error.

use crate::db::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Read path failure.
#[derive(Debug)]
pub enum RepoError {
    /// No usable store connection.
    Store(StoreError),
    /// A query failed while executing or stepping rows.
    QueryFailed(rusqlite::Error),
    /// A row holds values that cannot be mapped into the domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::QueryFailed(_) => write!(f, "database operation failed"),
            Self::InvalidData(message) => write!(f, "invalid note data in store: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::QueryFailed(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::QueryFailed(value)
    }
}
