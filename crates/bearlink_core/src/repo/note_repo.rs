//! Note/tag read contract and its SQLite implementation.
//!
//! # Responsibility
//! - Run parameterized read-only queries against the store.
//! - Resolve tag sets for a result batch in one lookup.
//! - Map rows into [`Note`] / [`Tag`] values.
//!
//! # Invariants
//! - Listings exclude trashed and archived notes (except
//!   [`NoteReader::list_archived_notes`], which excludes only trashed ones).
//! - Listings are ordered by modification time, newest first, and capped.
//! - Only single-note fetches carry body text.
//! - Tag filters compare case-insensitively; stored casing is returned as is.

use crate::db::schema::{NOTE_TABLE, TAG_TABLE};
use crate::db::{NoteStore, OpenStore, StoreSchema};
use crate::logging::error_chain;
use crate::model::note::{Note, NoteId, Tag};
use crate::model::time::from_store_seconds;
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::time::Instant;

/// Cap for term and tag searches and for tag/archive listings.
pub const NOTES_LIMIT: u32 = 100;
/// Cap for the browse-recent search (no term, no tag).
pub const RECENT_NOTES_LIMIT: u32 = 50;

const VISIBLE_NOTE_SQL: &str = "COALESCE(n.ZTRASHED, 0) = 0 AND COALESCE(n.ZARCHIVED, 0) = 0";
const ARCHIVED_NOTE_SQL: &str = "COALESCE(n.ZTRASHED, 0) = 0 AND COALESCE(n.ZARCHIVED, 0) = 1";

/// Search request for [`NoteReader::search_notes`].
///
/// A tag filter takes precedence over a term; blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSearch {
    /// Substring matched against title and body, surrounding spaces included.
    pub term: Option<String>,
    /// Substring matched against tag names. A leading `#` is ignored.
    pub tag: Option<String>,
}

impl NoteSearch {
    /// Browse-recent search.
    pub fn recent() -> Self {
        Self::default()
    }

    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            tag: None,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            term: None,
            tag: Some(tag.into()),
        }
    }

    fn filter(&self) -> SearchFilter {
        if let Some(tag) = self.tag.as_deref().and_then(normalize_tag_filter) {
            return SearchFilter::Tag(tag);
        }
        if let Some(term) = self.term.as_deref().filter(|v| !v.trim().is_empty()) {
            return SearchFilter::Term(term.to_string());
        }
        SearchFilter::Recent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchFilter {
    Tag(String),
    Term(String),
    Recent,
}

/// Strips whitespace and leading `#` markers from a tag name or filter.
///
/// Returns `None` when nothing is left.
pub fn normalize_tag_filter(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read-only access to notes and tags.
pub trait NoteReader {
    /// Searches by tag substring, else term substring, else recent notes.
    fn search_notes(&self, query: &NoteSearch) -> RepoResult<Vec<Note>>;
    /// Fetches one note with body and tags; `None` when the id is unknown.
    fn get_note(&self, id: &NoteId) -> RepoResult<Option<Note>>;
    /// Lists visible notes bearing `tag` (exact, case-insensitive).
    fn list_notes_by_tag(&self, tag: &str) -> RepoResult<Vec<Note>>;
    /// Lists archived, non-trashed notes.
    fn list_archived_notes(&self) -> RepoResult<Vec<Note>>;
    /// Lists tags with at least one visible note, ordered by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    /// Releases underlying resources. Idempotent.
    fn close(&mut self);
}

/// SQLite-backed reader over a lazily connected [`NoteStore`].
#[derive(Debug)]
pub struct SqliteNoteReader {
    store: NoteStore,
}

impl SqliteNoteReader {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    fn run<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&OpenStore) -> RepoResult<T>,
        count: impl Fn(&T) -> usize,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let result = self
            .store
            .open()
            .map_err(RepoError::from)
            .and_then(|store| f(store));

        match &result {
            Ok(value) => debug!(
                "event=query module=repo status=ok op={} rows={} duration_ms={}",
                operation,
                count(value),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=query module=repo status=error op={} duration_ms={} error={}",
                operation,
                started_at.elapsed().as_millis(),
                error_chain(err)
            ),
        }
        result
    }
}

impl NoteReader for SqliteNoteReader {
    fn search_notes(&self, query: &NoteSearch) -> RepoResult<Vec<Note>> {
        let filter = query.filter();
        self.run(
            "search_notes",
            |store| {
                let schema = store.schema();
                let (condition, binds, limit) = match &filter {
                    SearchFilter::Tag(tag) => (
                        format!(
                            "{VISIBLE_NOTE_SQL} AND EXISTS (
                                SELECT 1
                                FROM {join} j
                                INNER JOIN {TAG_TABLE} t ON t.Z_PK = j.{tag_col}
                                WHERE j.{note_col} = n.Z_PK
                                  AND t.ZTITLE LIKE ?1 ESCAPE '\\'
                            )",
                            join = schema.join_table(),
                            tag_col = schema.join_tag_column(),
                            note_col = schema.join_note_column(),
                        ),
                        vec![Value::Text(like_contains(tag))],
                        NOTES_LIMIT,
                    ),
                    SearchFilter::Term(term) => (
                        format!(
                            "{VISIBLE_NOTE_SQL} AND (
                                n.ZTITLE LIKE ?1 ESCAPE '\\'
                                OR n.ZTEXT LIKE ?1 ESCAPE '\\'
                            )"
                        ),
                        vec![Value::Text(like_contains(term))],
                        NOTES_LIMIT,
                    ),
                    SearchFilter::Recent => {
                        (VISIBLE_NOTE_SQL.to_string(), Vec::new(), RECENT_NOTES_LIMIT)
                    }
                };
                query_note_list(store, &condition, binds, limit)
            },
            Vec::len,
        )
    }

    fn get_note(&self, id: &NoteId) -> RepoResult<Option<Note>> {
        self.run(
            "get_note",
            |store| {
                let sql = format!(
                    "{} WHERE n.ZUNIQUEIDENTIFIER = ?1 LIMIT 1;",
                    select_notes_sql(true)
                );
                let mut stmt = store.conn().prepare(&sql)?;
                let mut rows = stmt.query([id.as_str()])?;
                let Some(row) = rows.next()? else {
                    return Ok(None);
                };
                let (pk, mut note) = note_from_row(row, true)?;
                let mut tags = load_tags_for_notes(store.conn(), store.schema(), &[pk])?;
                note.tags = tags.remove(&pk).unwrap_or_default();
                Ok(Some(note))
            },
            |found| usize::from(found.is_some()),
        )
    }

    fn list_notes_by_tag(&self, tag: &str) -> RepoResult<Vec<Note>> {
        let Some(tag) = normalize_tag_filter(tag) else {
            return Ok(Vec::new());
        };
        self.run(
            "list_notes_by_tag",
            |store| {
                let schema = store.schema();
                let condition = format!(
                    "{VISIBLE_NOTE_SQL} AND EXISTS (
                        SELECT 1
                        FROM {join} j
                        INNER JOIN {TAG_TABLE} t ON t.Z_PK = j.{tag_col}
                        WHERE j.{note_col} = n.Z_PK
                          AND t.ZTITLE = ?1 COLLATE NOCASE
                    )",
                    join = schema.join_table(),
                    tag_col = schema.join_tag_column(),
                    note_col = schema.join_note_column(),
                );
                query_note_list(store, &condition, vec![Value::Text(tag)], NOTES_LIMIT)
            },
            Vec::len,
        )
    }

    fn list_archived_notes(&self) -> RepoResult<Vec<Note>> {
        self.run(
            "list_archived_notes",
            |store| query_note_list(store, ARCHIVED_NOTE_SQL, Vec::new(), NOTES_LIMIT),
            Vec::len,
        )
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.run(
            "list_tags",
            |store| {
                let schema = store.schema();
                let sql = format!(
                    "SELECT t.ZTITLE AS name, COUNT(DISTINCT n.Z_PK) AS note_count
                     FROM {TAG_TABLE} t
                     INNER JOIN {join} j ON j.{tag_col} = t.Z_PK
                     INNER JOIN {NOTE_TABLE} n ON n.Z_PK = j.{note_col}
                     WHERE t.ZTITLE IS NOT NULL
                       AND {VISIBLE_NOTE_SQL}
                     GROUP BY t.Z_PK
                     HAVING note_count > 0
                     ORDER BY t.ZTITLE COLLATE NOCASE ASC, t.ZTITLE ASC;",
                    join = schema.join_table(),
                    tag_col = schema.join_tag_column(),
                    note_col = schema.join_note_column(),
                );
                let mut stmt = store.conn().prepare(&sql)?;
                let mut rows = stmt.query([])?;
                let mut tags = Vec::new();
                while let Some(row) = rows.next()? {
                    let note_count: i64 = row.get("note_count")?;
                    tags.push(Tag {
                        name: row.get("name")?,
                        note_count: u32::try_from(note_count).map_err(|_| {
                            RepoError::InvalidData(format!("tag count {note_count} out of range"))
                        })?,
                    });
                }
                Ok(tags)
            },
            Vec::len,
        )
    }

    fn close(&mut self) {
        self.store.close();
    }
}

fn select_notes_sql(with_body: bool) -> String {
    let body = if with_body { "n.ZTEXT" } else { "NULL" };
    format!(
        "SELECT
            n.Z_PK AS pk,
            n.ZUNIQUEIDENTIFIER AS unique_id,
            n.ZTITLE AS title,
            {body} AS body,
            n.ZCREATIONDATE AS created,
            n.ZMODIFICATIONDATE AS modified,
            COALESCE(n.ZTRASHED, 0) AS trashed,
            COALESCE(n.ZARCHIVED, 0) AS archived
         FROM {NOTE_TABLE} n"
    )
}

fn query_note_list(
    store: &OpenStore,
    condition: &str,
    mut binds: Vec<Value>,
    limit: u32,
) -> RepoResult<Vec<Note>> {
    let sql = format!(
        "{} WHERE {condition} ORDER BY n.ZMODIFICATIONDATE DESC, n.Z_PK DESC LIMIT ?{};",
        select_notes_sql(false),
        binds.len() + 1
    );
    binds.push(Value::Integer(i64::from(limit)));

    let mut stmt = store.conn().prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut keyed = Vec::new();
    while let Some(row) = rows.next()? {
        keyed.push(note_from_row(row, false)?);
    }

    let pks = keyed.iter().map(|(pk, _)| *pk).collect::<Vec<_>>();
    let mut tags = load_tags_for_notes(store.conn(), store.schema(), &pks)?;
    Ok(keyed
        .into_iter()
        .map(|(pk, mut note)| {
            note.tags = tags.remove(&pk).unwrap_or_default();
            note
        })
        .collect())
}

fn note_from_row(row: &Row<'_>, with_body: bool) -> RepoResult<(i64, Note)> {
    let pk: i64 = row.get("pk")?;
    let unique_id: Option<String> = row.get("unique_id")?;
    let Some(unique_id) = unique_id.filter(|value| !value.is_empty()) else {
        return Err(RepoError::InvalidData(format!(
            "note row {pk} has no unique identifier"
        )));
    };

    let created_at = timestamp_from_row(row, "created", &unique_id)?;
    let modified_at = timestamp_from_row(row, "modified", &unique_id)?;
    let trashed: i64 = row.get("trashed")?;
    let archived: i64 = row.get("archived")?;

    let note = Note {
        id: NoteId::new(unique_id),
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        content: if with_body {
            Some(row.get::<_, Option<String>>("body")?.unwrap_or_default())
        } else {
            None
        },
        tags: Vec::new(),
        created_at,
        modified_at,
        is_trashed: trashed != 0,
        is_archived: archived != 0,
    };
    Ok((pk, note))
}

fn timestamp_from_row(row: &Row<'_>, column: &str, note_id: &str) -> RepoResult<DateTime<Utc>> {
    let stored: Option<f64> = row.get(column)?;
    stored.and_then(from_store_seconds).ok_or_else(|| {
        RepoError::InvalidData(format!("note `{note_id}` has an unreadable {column} date"))
    })
}

/// Loads tag names for all `note_pks` with one query.
fn load_tags_for_notes(
    conn: &Connection,
    schema: &StoreSchema,
    note_pks: &[i64],
) -> RepoResult<HashMap<i64, Vec<String>>> {
    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    if note_pks.is_empty() {
        return Ok(tags);
    }

    let placeholders = vec!["?"; note_pks.len()].join(", ");
    let sql = format!(
        "SELECT j.{note_col} AS note_pk, t.ZTITLE AS name
         FROM {join} j
         INNER JOIN {TAG_TABLE} t ON t.Z_PK = j.{tag_col}
         WHERE j.{note_col} IN ({placeholders})
           AND t.ZTITLE IS NOT NULL
         ORDER BY t.ZTITLE COLLATE NOCASE ASC, t.ZTITLE ASC;",
        join = schema.join_table(),
        tag_col = schema.join_tag_column(),
        note_col = schema.join_note_column(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(note_pks.iter()))?;
    while let Some(row) = rows.next()? {
        let note_pk: i64 = row.get("note_pk")?;
        let name: String = row.get("name")?;
        let entry = tags.entry(note_pk).or_default();
        if !entry.contains(&name) {
            entry.push(name);
        }
    }
    Ok(tags)
}

/// Builds a `LIKE` pattern matching `value` anywhere, with `%`, `_` and `\`
/// taken literally (paired with `ESCAPE '\'`).
fn like_contains(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
