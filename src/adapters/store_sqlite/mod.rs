//! SQLite-backed store of processed tracks
//!
//! One `music` table keyed by ISRC. Rows are only ever inserted; the
//! primary key turns a second insert for the same ISRC into
//! [`StoreError::Duplicate`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info};

use crate::domain::errors::StoreError;
use crate::domain::model::{Isrc, ProcessedTrackRow};
use crate::ports::TrackStorePort;

const CREATE_MUSIC_TABLE: &str = "CREATE TABLE IF NOT EXISTS music (
    isrc TEXT PRIMARY KEY,
    recording_title TEXT NOT NULL,
    isrc_failure_code TEXT NOT NULL,
    recording_artist_name TEXT NOT NULL,
    recording_year TEXT NOT NULL,
    is_valid_isrc TEXT NOT NULL,
    recording_version TEXT NOT NULL,
    duration TEXT NOT NULL,
    is_explicit TEXT NOT NULL,
    explicit_exists TEXT NOT NULL,
    file_path TEXT NOT NULL,
    catalog_id TEXT,
    processed_at TEXT
)";

/// Row filter comparing `?1` with the stored ISRC in [`Isrc`] normal form
///
/// Rows written by older tools keep the raw tag value, hyphens and case
/// included.
const ISRC_MATCHES: &str = "upper(replace(replace(isrc, '-', ''), ' ', '')) = ?1";

/// Columns added after the first schema; older databases gain them on open
const LATE_COLUMNS: [(&str, &str); 2] = [("catalog_id", "TEXT"), ("processed_at", "TEXT")];

/// Text form of a boolean column, matching the catalog's own flags
fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[derive(Debug)]
pub struct SqliteTrackStore {
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
}

impl SqliteTrackStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn, path.to_path_buf())
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, path: PathBuf) -> Result<Self, StoreError> {
        conn.execute(CREATE_MUSIC_TABLE, [])?;
        migrate(&conn)?;
        debug!(path = %path.display(), "Track store ready");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        // A poisoned lock still guards a usable connection
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored rows
    pub fn row_count(&self) -> Result<usize, StoreError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM music", [], |r| r.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// The stored `explicit_exists` flag for `isrc`, if a row exists
    pub fn explicit_exists(&self, isrc: &Isrc) -> Result<Option<bool>, StoreError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let flag: Option<String> = conn
            .query_row(
                &format!("SELECT explicit_exists FROM music WHERE {}", ISRC_MATCHES),
                params![isrc.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(flag.map(|f| f == "True"))
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare("PRAGMA table_info(music)")?;
    let existing = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    for (column, kind) in LATE_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            info!(column, "Adding missing column to music table");
            conn.execute(&format!("ALTER TABLE music ADD COLUMN {} {}", column, kind), [])?;
        }
    }
    Ok(())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl TrackStorePort for SqliteTrackStore {
    async fn contains(&self, isrc: &Isrc) -> Result<bool, StoreError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let found = conn
            .query_row(
                &format!("SELECT isrc FROM music WHERE {}", ISRC_MATCHES),
                params![isrc.as_str()],
                |r| r.get::<_, String>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    async fn insert(&self, row: &ProcessedTrackRow) -> Result<(), StoreError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let catalog = &row.catalog;
        conn.execute(
            "INSERT INTO music (
                isrc, recording_title, isrc_failure_code, recording_artist_name,
                recording_year, is_valid_isrc, recording_version, duration,
                is_explicit, explicit_exists, file_path, catalog_id, processed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                row.isrc.as_str(),
                catalog.recording_title,
                catalog.isrc_failure_code,
                catalog.recording_artist_name,
                catalog.recording_year,
                catalog.is_valid_isrc,
                catalog.recording_version,
                catalog.duration,
                catalog.is_explicit,
                flag(row.explicit_version_exists),
                row.file_path,
                catalog.id,
                row.processed_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Duplicate(row.isrc.to_string())
            } else {
                StoreError::Sqlite(e)
            }
        })?;
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        let Some(conn) = self.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        debug!(path = %self.path.display(), "Track store closed");
        Ok(())
    }
}
