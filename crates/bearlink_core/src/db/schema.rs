//! Store schema verification and join-relation discovery.
//!
//! # Responsibility
//! - Check that the note and tag entity tables expose the columns the read
//!   path selects.
//! - Discover the note/tag join table, whose numbered name and columns
//!   (`Z_<n>TAGS`, `Z_<n>NOTES`) change between host app releases.
//!
//! # Invariants
//! - Identifiers returned in [`StoreSchema`] match `^Z_\d+(NOTES|TAGS)$` and
//!   are therefore safe to splice into SQL text.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const NOTE_TABLE: &str = "ZSFNOTE";
pub(crate) const TAG_TABLE: &str = "ZSFNOTETAG";

const NOTE_COLUMNS: &[&str] = &[
    "Z_PK",
    "ZUNIQUEIDENTIFIER",
    "ZTITLE",
    "ZTEXT",
    "ZCREATIONDATE",
    "ZMODIFICATIONDATE",
    "ZTRASHED",
    "ZARCHIVED",
];
const TAG_COLUMNS: &[&str] = &["Z_PK", "ZTITLE"];

static JOIN_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Z_\d+TAGS$").expect("valid join table regex"));
static JOIN_NOTE_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Z_\d+NOTES$").expect("valid note column regex"));
static JOIN_TAG_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Z_\d+TAGS$").expect("valid tag column regex"));

/// Schema shape problems found while opening a store.
#[derive(Debug)]
pub enum SchemaError {
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    /// No `Z_<n>TAGS` table links notes to tags.
    MissingJoinTable,
    Sqlite(rusqlite::Error),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::MissingJoinTable => write!(f, "no note/tag join table found"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Discovered names of the note/tag join relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSchema {
    join_table: String,
    join_note_column: String,
    join_tag_column: String,
}

impl StoreSchema {
    pub fn join_table(&self) -> &str {
        &self.join_table
    }

    /// Join column referencing `ZSFNOTE.Z_PK`.
    pub fn join_note_column(&self) -> &str {
        &self.join_note_column
    }

    /// Join column referencing `ZSFNOTETAG.Z_PK`.
    pub fn join_tag_column(&self) -> &str {
        &self.join_tag_column
    }
}

/// Verifies entity tables and discovers the join relation.
pub fn discover_schema(conn: &Connection) -> Result<StoreSchema, SchemaError> {
    ensure_table(conn, NOTE_TABLE, NOTE_COLUMNS)?;
    ensure_table(conn, TAG_TABLE, TAG_COLUMNS)?;

    for table in join_table_candidates(conn)? {
        let columns = table_columns(conn, &table)?;
        let note_column = columns
            .iter()
            .find(|column| JOIN_NOTE_COLUMN_RE.is_match(column));
        let tag_column = columns
            .iter()
            .find(|column| JOIN_TAG_COLUMN_RE.is_match(column));

        if let (Some(note_column), Some(tag_column)) = (note_column, tag_column) {
            return Ok(StoreSchema {
                join_note_column: note_column.clone(),
                join_tag_column: tag_column.clone(),
                join_table: table,
            });
        }
    }

    Err(SchemaError::MissingJoinTable)
}

fn ensure_table(
    conn: &Connection,
    table: &'static str,
    required: &[&'static str],
) -> Result<(), SchemaError> {
    let columns = table_columns(conn, table)?;
    if columns.is_empty() {
        return Err(SchemaError::MissingTable(table));
    }
    for column in required {
        if !columns.iter().any(|current| current == column) {
            return Err(SchemaError::MissingColumn { table, column });
        }
    }
    Ok(())
}

fn join_table_candidates(conn: &Connection) -> Result<Vec<String>, SchemaError> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM sqlite_master
         WHERE type = 'table'
         ORDER BY name ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        if JOIN_TABLE_RE.is_match(&name) {
            tables.push(name);
        }
    }
    Ok(tables)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, SchemaError> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(0)?);
    }
    Ok(columns)
}
