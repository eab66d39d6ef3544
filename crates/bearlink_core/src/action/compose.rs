//! Builders turning note operations into [`ActionRequest`]s.
//!
//! Tags are never written to the store's tag relation. They travel as
//! hashtag syntax inside the note text and the host app's parser turns them
//! into tag links.

use super::{Action, ActionRequest, TextMode};
use crate::model::note::NoteId;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const NO: &str = "no";
const YES: &str = "yes";

/// Normalizes tag input: trims, strips `#` markers, collapses inner
/// whitespace, drops blanks and repeats (first occurrence wins).
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        let stripped = tag.trim().trim_matches('#').trim();
        if stripped.is_empty() {
            continue;
        }
        let collapsed = WHITESPACE_RE.replace_all(stripped, " ").into_owned();
        if !unique.contains(&collapsed) {
            unique.push(collapsed);
        }
    }
    unique
}

/// Formats one tag as hashtag syntax; multi-word tags use the closed
/// `#multi word#` form.
pub fn hashtag(tag: &str) -> String {
    if WHITESPACE_RE.is_match(tag) {
        format!("#{tag}#")
    } else {
        format!("#{tag}")
    }
}

/// Space-joined hashtags, or `None` when no usable tag remains.
pub fn tag_line(tags: &[String]) -> Option<String> {
    let normalized = normalize_tags(tags);
    if normalized.is_empty() {
        return None;
    }
    Some(
        normalized
            .iter()
            .map(|tag| hashtag(tag))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Body for a new note: tag line, blank line, text.
pub fn compose_create_text(text: &str, tags: &[String]) -> String {
    match tag_line(tags) {
        Some(line) => format!("{line}\n\n{text}"),
        None => text.to_string(),
    }
}

/// Full note source: title line, tag line (if any), blank line, body.
pub fn compose_full_content(title: &str, text: &str, tags: &[String]) -> String {
    let mut content = format!("# {}", title.trim());
    if let Some(line) = tag_line(tags) {
        content.push('\n');
        content.push_str(&line);
    }
    content.push_str("\n\n");
    content.push_str(text);
    content
}

pub fn create_note(title: &str, text: &str, tags: &[String]) -> ActionRequest {
    ActionRequest::new(Action::Create)
        .param("title", title.trim())
        .param("text", compose_create_text(text, tags))
        .param("open_note", NO)
        .param("show_window", NO)
}

pub fn add_text(id: &NoteId, text: &str, mode: TextMode) -> ActionRequest {
    let request = ActionRequest::new(Action::AddText)
        .param("id", id.as_str())
        .param("mode", mode.as_str())
        .param("text", text);
    let request = if mode == TextMode::Append {
        request.param("new_line", YES)
    } else {
        request
    };
    request.param("open_note", NO).param("show_window", NO)
}

pub fn replace_content(id: &NoteId, title: &str, text: &str, tags: &[String]) -> ActionRequest {
    add_text(id, &compose_full_content(title, text, tags), TextMode::ReplaceAll)
}

pub fn trash(id: &NoteId) -> ActionRequest {
    note_lifecycle(Action::Trash, id)
}

pub fn archive(id: &NoteId) -> ActionRequest {
    note_lifecycle(Action::Archive, id)
}

pub fn unarchive(id: &NoteId) -> ActionRequest {
    note_lifecycle(Action::Unarchive, id)
}

pub fn rename_tag(name: &str, new_name: &str) -> ActionRequest {
    ActionRequest::new(Action::RenameTag)
        .param("name", name)
        .param("new_name", new_name)
        .param("show_window", NO)
}

pub fn delete_tag(name: &str) -> ActionRequest {
    ActionRequest::new(Action::DeleteTag)
        .param("name", name)
        .param("show_window", NO)
}

fn note_lifecycle(action: Action, id: &NoteId) -> ActionRequest {
    ActionRequest::new(action)
        .param("id", id.as_str())
        .param("show_window", NO)
}
