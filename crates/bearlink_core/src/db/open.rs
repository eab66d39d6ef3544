//! Read-only connection bootstrap.
//!
//! # Responsibility
//! - Open the store file without write access.
//! - Configure pragmas that keep this process from contending with the host
//!   app's writer.
//! - Discover the schema before returning a usable handle.
//!
//! # Invariants
//! - Returned handles have `query_only=ON` and a 5 s busy timeout.

use super::schema::discover_schema;
use super::store::OpenStore;
use super::{StoreError, StoreResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the store at `path` read-only and discovers its schema.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
///
/// # Errors
/// - [`StoreError::OpenFailed`] when SQLite refuses the file or the schema
///   does not look like a note store.
pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<OpenStore> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=store_open module=db status=start path={}",
        path.display()
    );

    let conn = match Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .and_then(|conn| configure_connection(&conn).map(|()| conn))
    {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=db status=error duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(StoreError::open_failed(
                path,
                "database could not be opened read-only",
                err,
            ));
        }
    };

    match discover_schema(&conn) {
        Ok(schema) => {
            info!(
                "event=store_open module=db status=ok duration_ms={} join_table={}",
                started_at.elapsed().as_millis(),
                schema.join_table()
            );
            Ok(OpenStore::new(path.to_path_buf(), conn, schema))
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error duration_ms={} error_code=store_schema_unsupported error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(StoreError::open_failed(
                path,
                "file is not a supported note store",
                err,
            ))
        }
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "query_only", "ON")?;
    Ok(())
}
