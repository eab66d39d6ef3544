//! Process-lifetime owner of the read-only store connection.
//!
//! # Invariants
//! - The connection is opened lazily, at most once, on the first read.
//! - `close()` is idempotent; once closed the store never reopens.

use super::open::open_read_only;
use super::schema::StoreSchema;
use super::{StoreError, StoreLocator, StoreResult};
use log::{info, warn};
use once_cell::unsync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// An opened store: connection plus the discovered join relation.
#[derive(Debug)]
pub struct OpenStore {
    path: PathBuf,
    conn: Connection,
    schema: StoreSchema,
}

impl OpenStore {
    pub(crate) fn new(path: PathBuf, conn: Connection, schema: StoreSchema) -> Self {
        Self { path, conn, schema }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    fn close(self) {
        let path = self.path;
        match self.conn.close() {
            Ok(()) => info!(
                "event=store_close module=db status=ok path={}",
                path.display()
            ),
            Err((_conn, err)) => warn!(
                "event=store_close module=db status=error path={} error={}",
                path.display(),
                err
            ),
        }
    }
}

/// Lifecycle state of a [`NoteStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Connected,
    Closed,
}

/// Lazily connected, explicitly closed handle to the note store.
#[derive(Debug)]
pub struct NoteStore {
    locator: StoreLocator,
    handle: OnceCell<OpenStore>,
    closed: bool,
}

impl NoteStore {
    /// Creates an unconnected store; no file system access happens here.
    pub fn new(locator: StoreLocator) -> Self {
        Self {
            locator,
            handle: OnceCell::new(),
            closed: false,
        }
    }

    pub fn state(&self) -> StoreState {
        if self.closed {
            StoreState::Closed
        } else if self.handle.get().is_some() {
            StoreState::Connected
        } else {
            StoreState::Uninitialized
        }
    }

    pub fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    /// Returns the open store, connecting on first use.
    ///
    /// A failed attempt leaves the store uninitialized, so a later call
    /// probes the candidates again.
    ///
    /// # Errors
    /// - [`StoreError::Closed`] after [`NoteStore::close`].
    /// - [`StoreError::NotFound`] / [`StoreError::OpenFailed`] from connecting.
    pub fn open(&self) -> StoreResult<&OpenStore> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        self.handle.get_or_try_init(|| {
            let path = self.locator.locate()?;
            open_read_only(path)
        })
    }

    /// Releases the connection. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(store) = self.handle.take() {
            store.close();
        }
    }
}

impl Drop for NoteStore {
    fn drop(&mut self) {
        self.close();
    }
}
