//! Note use-case facade over the read and write paths.
//!
//! # Responsibility
//! - Expose one operation per agent-facing action.
//! - Validate inputs before touching either path.
//! - Route reads to a [`NoteReader`] and writes to an [`ActionChannel`].
//!
//! # Invariants
//! - Writes return as soon as dispatch succeeds; they never poll the store
//!   and never read back what they wrote.
//! - A write accepted here may not be visible to reads for a while; callers
//!   must not assume read-after-write consistency.
//! - An unknown note id on `get_note` is `Ok(None)`.

use crate::action::{compose, ActionChannel, ActionError, ActionRequest, TextMode};
use crate::model::note::{Note, NoteId, Tag};
use crate::repo::note_repo::{normalize_tag_filter, NoteReader, NoteSearch};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Caller input rejected before dispatch or query.
    InvalidInput(String),
    /// Read path failure.
    Read(RepoError),
    /// Write path failure.
    Write(ActionError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Read(err) => write!(f, "{err}"),
            Self::Write(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(_) => None,
            Self::Read(err) => Some(err),
            Self::Write(err) => Some(err),
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Read(value)
    }
}

impl From<ActionError> for NoteServiceError {
    fn from(value: ActionError) -> Self {
        Self::Write(value)
    }
}

/// Note service composing a readable store and a write-action channel.
pub struct NoteService<R: NoteReader, W: ActionChannel> {
    reader: R,
    writer: W,
}

impl<R: NoteReader, W: ActionChannel> NoteService<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Requests a new note. Tags are prepended to `text` as hashtags.
    pub fn create_note(&self, title: &str, text: &str, tags: &[String]) -> ServiceResult<()> {
        self.dispatch(compose::create_note(title, text, tags))
    }

    /// Searches by tag, else by term, else returns recent notes.
    pub fn search(&self, term: Option<&str>, tag: Option<&str>) -> ServiceResult<Vec<Note>> {
        let query = NoteSearch {
            term: term.map(str::to_string),
            tag: tag.map(str::to_string),
        };
        Ok(self.reader.search_notes(&query)?)
    }

    /// Fetches one note with body; `None` when the id is unknown.
    pub fn get_note(&self, id: &NoteId) -> ServiceResult<Option<Note>> {
        require_id(id)?;
        Ok(self.reader.get_note(id)?)
    }

    pub fn append_text(&self, id: &NoteId, text: &str) -> ServiceResult<()> {
        require_id(id)?;
        self.dispatch(compose::add_text(id, text, TextMode::Append))
    }

    pub fn prepend_text(&self, id: &NoteId, text: &str) -> ServiceResult<()> {
        require_id(id)?;
        self.dispatch(compose::add_text(id, text, TextMode::Prepend))
    }

    /// Replaces the whole note as `# title`, tag line, blank line, body.
    pub fn replace_content(
        &self,
        id: &NoteId,
        title: &str,
        text: &str,
        tags: &[String],
    ) -> ServiceResult<()> {
        require_id(id)?;
        self.dispatch(compose::replace_content(id, title, text, tags))
    }

    pub fn list_tags(&self) -> ServiceResult<Vec<Tag>> {
        Ok(self.reader.list_tags()?)
    }

    /// Lists visible notes carrying `tag` (exact match, any casing).
    pub fn list_by_tag(&self, tag: &str) -> ServiceResult<Vec<Note>> {
        let tag = require_tag(tag, "tag")?;
        Ok(self.reader.list_notes_by_tag(&tag)?)
    }

    pub fn rename_tag(&self, name: &str, new_name: &str) -> ServiceResult<()> {
        let name = require_tag(name, "name")?;
        let new_name = require_tag(new_name, "new_name")?;
        if name == new_name {
            return Err(NoteServiceError::InvalidInput(
                "new_name must differ from name".to_string(),
            ));
        }
        self.dispatch(compose::rename_tag(&name, &new_name))
    }

    pub fn delete_tag(&self, name: &str) -> ServiceResult<()> {
        let name = require_tag(name, "name")?;
        self.dispatch(compose::delete_tag(&name))
    }

    pub fn trash_note(&self, id: &NoteId) -> ServiceResult<()> {
        require_id(id)?;
        self.dispatch(compose::trash(id))
    }

    pub fn archive_note(&self, id: &NoteId) -> ServiceResult<()> {
        require_id(id)?;
        self.dispatch(compose::archive(id))
    }

    pub fn unarchive_note(&self, id: &NoteId) -> ServiceResult<()> {
        require_id(id)?;
        self.dispatch(compose::unarchive(id))
    }

    pub fn list_archived(&self) -> ServiceResult<Vec<Note>> {
        Ok(self.reader.list_archived_notes()?)
    }

    /// Releases the read path. Idempotent.
    pub fn shutdown(&mut self) {
        self.reader.close();
    }

    fn dispatch(&self, request: ActionRequest) -> ServiceResult<()> {
        Ok(self.writer.dispatch(&request)?)
    }
}

fn require_id(id: &NoteId) -> ServiceResult<()> {
    if id.is_blank() {
        return Err(NoteServiceError::InvalidInput(
            "id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn require_tag(raw: &str, field: &str) -> ServiceResult<String> {
    normalize_tag_filter(raw)
        .ok_or_else(|| NoteServiceError::InvalidInput(format!("{field} must not be empty")))
}
