//! Agent-facing operation surface.
//!
//! # Responsibility
//! - Expose one function per note operation with a uniform response envelope.
//! - Convert every failure into an error-flagged text payload.
//!
//! # Invariants
//! - Exported functions never panic and never return `Err`; faults become
//!   `ToolResponse { is_error: true, .. }`.
//! - Error text is the human-readable message only; causes go to the log.
//! - Write operations report dispatch, not completion. The notes app applies
//!   changes asynchronously and reads may lag behind.

use crate::request::ToolRequest;
use bearlink_core::{
    error_chain, ActionChannel, BridgeConfig, NoteId, NoteReader, NoteService, NoteServiceError,
    NoteStore, SqliteNoteReader, SystemActionChannel,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

const ASYNC_WRITE_NOTE: &str =
    "The notes app applies changes asynchronously; they may take a moment to appear in reads.";

/// Response envelope returned for every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Whether the operation failed.
    pub is_error: bool,
    /// JSON payload for reads, human-readable message otherwise.
    pub text: String,
}

impl ToolResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::success(text),
            Err(err) => {
                error!("event=tool_encode module=api status=error error={err}");
                Self::failure("failed to encode response")
            }
        }
    }
}

/// Operation surface over the default read path and URL write path.
pub type SystemApi = BearApi<SqliteNoteReader, SystemActionChannel>;

/// Agent-facing API wrapping a [`NoteService`].
pub struct BearApi<R: NoteReader, W: ActionChannel> {
    service: NoteService<R, W>,
}

impl SystemApi {
    /// Builds the production API: lazily opened store, system URL opener.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let reader = SqliteNoteReader::new(NoteStore::new(config.store_locator()));
        let writer = SystemActionChannel::new(config.callback_scheme.clone());
        Self::new(NoteService::new(reader, writer))
    }
}

impl<R: NoteReader, W: ActionChannel> BearApi<R, W> {
    pub fn new(service: NoteService<R, W>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &NoteService<R, W> {
        &self.service
    }

    /// Decodes and runs one JSON request line.
    pub fn handle_json(&self, input: &str) -> ToolResponse {
        match ToolRequest::from_json(input) {
            Ok(request) => self.handle(request),
            Err(message) => {
                warn!("event=tool_call module=api status=error error_code=bad_request");
                ToolResponse::failure(message)
            }
        }
    }

    /// Runs one request; panics are caught and reported as errors.
    pub fn handle(&self, request: ToolRequest) -> ToolResponse {
        let tool = request.name();
        let started_at = Instant::now();
        let response = catch_unwind(AssertUnwindSafe(|| self.route(request)))
            .unwrap_or_else(|_| ToolResponse::failure(format!("{tool} failed: internal error")));

        info!(
            "event=tool_call module=api status={} tool={} duration_ms={}",
            if response.is_error { "error" } else { "ok" },
            tool,
            started_at.elapsed().as_millis()
        );
        response
    }

    /// Releases the store connection. Idempotent.
    pub fn shutdown(&mut self) {
        self.service.shutdown();
    }

    fn route(&self, request: ToolRequest) -> ToolResponse {
        match request {
            ToolRequest::CreateNote { title, text, tags } => {
                self.create_note(&title, &text, tags.as_deref())
            }
            ToolRequest::Search { term, tag } => self.search(term.as_deref(), tag.as_deref()),
            ToolRequest::GetNote { id } => self.get_note(&id),
            ToolRequest::AppendText { id, text } => self.append_text(&id, &text),
            ToolRequest::PrependText { id, text } => self.prepend_text(&id, &text),
            ToolRequest::ReplaceContent {
                id,
                title,
                text,
                tags,
            } => self.replace_content(&id, &title, &text, tags.as_deref()),
            ToolRequest::ListTags {} => self.list_tags(),
            ToolRequest::ListByTag { tag } => self.list_by_tag(&tag),
            ToolRequest::RenameTag { name, new_name } => self.rename_tag(&name, &new_name),
            ToolRequest::DeleteTag { name } => self.delete_tag(&name),
            ToolRequest::TrashNote { id } => self.trash_note(&id),
            ToolRequest::ArchiveNote { id } => self.archive_note(&id),
            ToolRequest::UnarchiveNote { id } => self.unarchive_note(&id),
            ToolRequest::ListArchived {} => self.list_archived(),
        }
    }

    pub fn create_note(&self, title: &str, text: &str, tags: Option<&[String]>) -> ToolResponse {
        write_response(
            "create_note",
            self.service.create_note(title, text, tags.unwrap_or_default()),
            "Note creation requested.",
        )
    }

    pub fn search(&self, term: Option<&str>, tag: Option<&str>) -> ToolResponse {
        read_response("search", self.service.search(term, tag))
    }

    /// Returns the note as JSON, or a non-error "not found" message.
    pub fn get_note(&self, id: &str) -> ToolResponse {
        let id = NoteId::new(id.trim());
        match self.service.get_note(&id) {
            Ok(Some(note)) => ToolResponse::json(&note),
            Ok(None) => ToolResponse::success(format!("Note not found: {id}")),
            Err(err) => failure("get_note", &err),
        }
    }

    pub fn append_text(&self, id: &str, text: &str) -> ToolResponse {
        write_response(
            "append_text",
            self.service.append_text(&NoteId::new(id.trim()), text),
            "Text append requested.",
        )
    }

    pub fn prepend_text(&self, id: &str, text: &str) -> ToolResponse {
        write_response(
            "prepend_text",
            self.service.prepend_text(&NoteId::new(id.trim()), text),
            "Text prepend requested.",
        )
    }

    pub fn replace_content(
        &self,
        id: &str,
        title: &str,
        text: &str,
        tags: Option<&[String]>,
    ) -> ToolResponse {
        write_response(
            "replace_content",
            self.service.replace_content(
                &NoteId::new(id.trim()),
                title,
                text,
                tags.unwrap_or_default(),
            ),
            "Content replacement requested.",
        )
    }

    pub fn list_tags(&self) -> ToolResponse {
        read_response("list_tags", self.service.list_tags())
    }

    pub fn list_by_tag(&self, tag: &str) -> ToolResponse {
        read_response("list_by_tag", self.service.list_by_tag(tag))
    }

    pub fn rename_tag(&self, name: &str, new_name: &str) -> ToolResponse {
        write_response(
            "rename_tag",
            self.service.rename_tag(name, new_name),
            "Tag rename requested.",
        )
    }

    pub fn delete_tag(&self, name: &str) -> ToolResponse {
        write_response(
            "delete_tag",
            self.service.delete_tag(name),
            "Tag deletion requested.",
        )
    }

    pub fn trash_note(&self, id: &str) -> ToolResponse {
        write_response(
            "trash_note",
            self.service.trash_note(&NoteId::new(id.trim())),
            "Move to trash requested.",
        )
    }

    pub fn archive_note(&self, id: &str) -> ToolResponse {
        write_response(
            "archive_note",
            self.service.archive_note(&NoteId::new(id.trim())),
            "Archive requested.",
        )
    }

    pub fn unarchive_note(&self, id: &str) -> ToolResponse {
        write_response(
            "unarchive_note",
            self.service.unarchive_note(&NoteId::new(id.trim())),
            "Unarchive requested.",
        )
    }

    pub fn list_archived(&self) -> ToolResponse {
        read_response("list_archived", self.service.list_archived())
    }
}

fn read_response<T: Serialize>(
    tool: &'static str,
    result: Result<T, NoteServiceError>,
) -> ToolResponse {
    match result {
        Ok(value) => ToolResponse::json(&value),
        Err(err) => failure(tool, &err),
    }
}

fn write_response(
    tool: &'static str,
    result: Result<(), NoteServiceError>,
    message: &str,
) -> ToolResponse {
    match result {
        Ok(()) => ToolResponse::success(format!("{message} {ASYNC_WRITE_NOTE}")),
        Err(err) => failure(tool, &err),
    }
}

fn failure(tool: &'static str, err: &NoteServiceError) -> ToolResponse {
    match err {
        NoteServiceError::InvalidInput(_) => {
            warn!("event=tool_failed module=api status=error tool={tool} error={err}");
        }
        _ => {
            error!(
                "event=tool_failed module=api status=error tool={tool} error={}",
                error_chain(err)
            );
        }
    }
    ToolResponse::failure(format!("{tool} failed: {err}"))
}
