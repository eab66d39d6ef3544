#![allow(dead_code)]

use bearlink_core::{
    ActionChannel, ActionError, ActionRequest, NoteStore, SqliteNoteReader, StoreLocator,
};
use rusqlite::{params, Connection};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Store-epoch seconds for 2024-01-01T00:00:00Z.
pub const JAN_2024: f64 = 725_760_000.0;

const SCHEMA_SQL: &str = "
    CREATE TABLE ZSFNOTE (
        Z_PK INTEGER PRIMARY KEY,
        Z_ENT INTEGER,
        ZUNIQUEIDENTIFIER VARCHAR,
        ZTITLE VARCHAR,
        ZTEXT VARCHAR,
        ZCREATIONDATE TIMESTAMP,
        ZMODIFICATIONDATE TIMESTAMP,
        ZTRASHED INTEGER,
        ZARCHIVED INTEGER,
        ZPINNED INTEGER
    );
    CREATE TABLE ZSFNOTETAG (
        Z_PK INTEGER PRIMARY KEY,
        Z_ENT INTEGER,
        ZTITLE VARCHAR,
        ZMODIFICATIONDATE TIMESTAMP
    );
    CREATE TABLE Z_5TAGS (
        Z_5NOTES INTEGER,
        Z_13TAGS INTEGER,
        PRIMARY KEY (Z_5NOTES, Z_13TAGS)
    );";

/// Note row to insert into a [`StoreFixture`].
pub struct NewNote<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub modified: f64,
    pub trashed: bool,
    pub archived: bool,
    pub tags: &'a [&'a str],
}

impl<'a> NewNote<'a> {
    pub fn new(id: &'a str, title: &'a str) -> Self {
        Self {
            id,
            title,
            body: "",
            modified: JAN_2024,
            trashed: false,
            archived: false,
            tags: &[],
        }
    }

    pub fn body(mut self, body: &'a str) -> Self {
        self.body = body;
        self
    }

    /// Modification time as hours after [`JAN_2024`].
    pub fn modified_hours(mut self, hours: u32) -> Self {
        self.modified = JAN_2024 + f64::from(hours) * 3600.0;
        self
    }

    pub fn trashed(mut self) -> Self {
        self.trashed = true;
        self
    }

    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    pub fn tags(mut self, tags: &'a [&'a str]) -> Self {
        self.tags = tags;
        self
    }
}

/// Store-shaped SQLite file in a temporary directory.
pub struct StoreFixture {
    _dir: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl StoreFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("database.sqlite");
        let conn = Connection::open(&path).expect("create fixture store");
        conn.execute_batch(SCHEMA_SQL).expect("create fixture schema");
        Self {
            _dir: dir,
            path,
            conn,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Inserts a note and links its tags, creating tag rows on demand.
    pub fn insert(&self, note: NewNote<'_>) -> i64 {
        self.conn
            .execute(
                "INSERT INTO ZSFNOTE (
                    Z_ENT, ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT,
                    ZCREATIONDATE, ZMODIFICATIONDATE, ZTRASHED, ZARCHIVED, ZPINNED
                 ) VALUES (5, ?1, ?2, ?3, ?4, ?5, ?6, ?7, 0);",
                params![
                    note.id,
                    note.title,
                    note.body,
                    JAN_2024,
                    note.modified,
                    i64::from(note.trashed),
                    i64::from(note.archived),
                ],
            )
            .expect("insert note");
        let note_pk = self.conn.last_insert_rowid();
        for tag in note.tags {
            let tag_pk = self.tag(tag);
            self.conn
                .execute(
                    "INSERT INTO Z_5TAGS (Z_5NOTES, Z_13TAGS) VALUES (?1, ?2);",
                    params![note_pk, tag_pk],
                )
                .expect("link tag");
        }
        note_pk
    }

    /// Returns the tag row id for `name` (exact casing), inserting it if new.
    pub fn tag(&self, name: &str) -> i64 {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT Z_PK FROM ZSFNOTETAG WHERE ZTITLE = ?1;",
                [name],
                |row| row.get(0),
            )
            .ok();
        if let Some(pk) = existing {
            return pk;
        }
        self.conn
            .execute(
                "INSERT INTO ZSFNOTETAG (Z_ENT, ZTITLE) VALUES (13, ?1);",
                [name],
            )
            .expect("insert tag");
        self.conn.last_insert_rowid()
    }

    pub fn locator(&self) -> StoreLocator {
        StoreLocator::new(vec![self.path.clone()])
    }

    pub fn reader(&self) -> SqliteNoteReader {
        SqliteNoteReader::new(NoteStore::new(self.locator()))
    }
}

/// Channel that records requests instead of opening URLs.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: RefCell<Vec<ActionRequest>>,
    pub fail: bool,
}

impl RecordingChannel {
    pub fn failing() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn last(&self) -> ActionRequest {
        self.sent
            .borrow()
            .last()
            .cloned()
            .expect("a request should have been dispatched")
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl ActionChannel for RecordingChannel {
    fn dispatch(&self, request: &ActionRequest) -> Result<(), ActionError> {
        if self.fail {
            return Err(ActionError::DispatchFailed {
                action: request.action,
                params: request.params.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no url opener"),
            });
        }
        self.sent.borrow_mut().push(request.clone());
        Ok(())
    }
}
