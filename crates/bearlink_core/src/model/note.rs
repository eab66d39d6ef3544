//! Note and tag domain model.
//!
//! # Responsibility
//! - Define the read models rebuilt from the host app's store on every call.
//! - Keep internal row ids out of the externally visible shape.
//!
//! # Invariants
//! - `NoteId` is the store-assigned unique identifier and never changes.
//! - `content` is `Some` only for single-note fetches.
//! - `tags` is sorted by name and free of duplicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable external note identifier (the store's unique identifier string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Wraps a raw identifier string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the identifier is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Read model for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Stable store-assigned identifier.
    pub id: NoteId,
    /// Note title as the host app derived it (may be empty).
    pub title: String,
    /// Markdown body; omitted from list and search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tag names with the casing the host app stored.
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub is_trashed: bool,
    pub is_archived: bool,
}

/// Tag with the count of visible (non-trashed, non-archived) notes bearing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub note_count: u32,
}
