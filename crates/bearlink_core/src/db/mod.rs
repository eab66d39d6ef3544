//! Read-only access to the host app's SQLite store.
//!
//! # Responsibility
//! - Locate the store file from an ordered list of candidate paths.
//! - Open it read-only, verify the schema shape and discover the note/tag
//!   join relation.
//! - Own the single connection for the process lifetime.
//!
//! # Invariants
//! - Nothing in this crate writes to the store; connections are opened with
//!   `SQLITE_OPEN_READ_ONLY` and `query_only=ON`.
//! - A missing store file is never created.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod locate;
mod open;
pub mod schema;
mod store;

pub use locate::{default_candidates, StoreLocator};
pub use open::open_read_only;
pub use schema::{discover_schema, SchemaError, StoreSchema};
pub use store::{NoteStore, OpenStore, StoreState};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to obtain a usable store connection.
#[derive(Debug)]
pub enum StoreError {
    /// None of the candidate paths exists.
    NotFound { candidates: Vec<PathBuf> },
    /// A candidate exists but could not be opened or is not a note store.
    OpenFailed {
        path: PathBuf,
        reason: &'static str,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
    /// The store was released by shutdown.
    Closed,
}

impl StoreError {
    pub(crate) fn open_failed(
        path: impl Into<PathBuf>,
        reason: &'static str,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::OpenFailed {
            path: path.into(),
            reason,
            source: Some(Box::new(source)),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { candidates } => {
                write!(f, "note store not found (checked ")?;
                for (idx, path) in candidates.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "`{}`", path.display())?;
                }
                if candidates.is_empty() {
                    write!(f, "no candidate paths")?;
                }
                write!(f, ")")
            }
            Self::OpenFailed { path, reason, .. } => {
                write!(f, "failed to open note store at `{}`: {reason}", path.display())
            }
            Self::Closed => write!(f, "note store connection is closed"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OpenFailed {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}
