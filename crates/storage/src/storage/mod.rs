//! `SQLite` story store - modular structure
//!
//! One submodule per entity family. All methods are synchronous: each call
//! borrows a pooled connection, runs its statements (inside a transaction when
//! there is more than one), commits and hands the connection back.

// SQLite uses i64 for counts, Rust uses usize - safe conversions within DB context
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust usize conversions are safe within DB row counts"
)]

mod chapters;
mod characters;
mod compile;
mod config;
mod content_registry;
mod continuity;
mod evolution;
mod locations;
mod plot_threads;
mod promises;
mod relationships;
mod scene_entities;
mod stats;
mod world;

use std::path::Path;
use std::str::FromStr;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{Connection, Params, Row, Transaction};
use serde::de::DeserializeOwned;
use storyvault_core::{CoreError, StoreSettings};

use crate::error::{Result, StorageError};
use crate::migrations;

pub use content_registry::content_hash;
pub use continuity::{
    CharacterJourney, JourneyStop, RelationshipTimeline, SharedScene, UnresolvedThread,
};
pub use scene_entities::{SceneCharacter, SceneContext};
pub use stats::StoryStats;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Story store wrapping a `SQLite` connection pool.
///
/// Cheap to clone; clones share the pool. Construct one per story file and
/// pass it to every collaborator.
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn> {
    Ok(pool.get()?)
}

/// Current time as RFC 3339, the timestamp format of every table.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Decode a JSON text column. Undecodable text surfaces as `DataCorruption`.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    decode_json(idx, &raw)
}

/// Like [`json_column`] for a nullable column.
pub(crate) fn optional_json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| decode_json(idx, &raw)).transpose()
}

fn decode_json<T: DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a stored enum column.
pub(crate) fn enum_column<T: FromStr<Err = CoreError>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: CoreError| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Insert-or-fetch on a natural unique key.
///
/// `insert_sql` must carry an `ON CONFLICT … DO NOTHING` clause; `lookup_sql`
/// selects the id by the same key. Returns the row id and whether this call
/// created it.
pub(crate) fn insert_or_fetch<P: Params, Q: Params>(
    tx: &Transaction<'_>,
    insert_sql: &str,
    insert_params: P,
    lookup_sql: &str,
    lookup_params: Q,
) -> Result<(i64, bool)> {
    let inserted = tx.execute(insert_sql, insert_params)? > 0;
    let id: i64 = tx.query_row(lookup_sql, lookup_params, |row| row.get(0))?;
    Ok((id, inserted))
}

/// Custom connection initializer for integrity and concurrency settings
fn init_connection(conn: &mut Connection, busy_timeout_ms: u32) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;"
    ))
}

impl Storage {
    /// Open (creating if needed) the store at `db_path`, with settings from the environment.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or the schema cannot be initialized.
    /// Callers must not continue generation when this fails.
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_settings(db_path, &StoreSettings::from_env())
    }

    /// Open the store with explicit connection settings.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or the schema cannot be initialized.
    pub fn with_settings(db_path: &Path, settings: &StoreSettings) -> Result<Self> {
        let busy_timeout_ms = settings.busy_timeout_ms;
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(move |conn| init_connection(conn, busy_timeout_ms));

        let pool = Pool::builder().max_size(settings.pool_size).build(manager)?;

        // Run migrations on first connection
        let conn = pool.get()?;
        migrations::run_migrations(&conn).map_err(|e| StorageError::Migration(e.to_string()))?;
        drop(conn);

        tracing::info!(
            path = %db_path.display(),
            pool_size = settings.pool_size,
            "Story store initialized"
        );

        Ok(Self { pool })
    }

    /// Resolve a chapter number to its row id, failing if the chapter does not exist.
    pub(crate) fn chapter_id(conn: &Connection, chapter_number: u32) -> Result<i64> {
        use rusqlite::OptionalExtension as _;
        conn.query_row(
            "SELECT id FROM chapters WHERE chapter_number = ?1",
            [chapter_number],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| StorageError::Integrity(format!("chapter {chapter_number} does not exist")))
    }
}
