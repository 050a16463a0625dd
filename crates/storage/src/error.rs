//! Typed error enum for the storage layer.
//!
//! Lets callers match on specific failure modes (missing configuration,
//! integrity violations, illegal status changes) instead of downcasting
//! opaque boxes.

use rusqlite::ffi;
use storyvault_core::{CoreError, ThreadStatus};
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The story configuration singleton was never initialized.
    #[error("story configuration has not been initialized")]
    NotConfigured,

    /// Row not found for expected-present entity.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Foreign-key violation or other caller misuse.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Illegal plot thread status change.
    #[error("invalid plot thread transition: {from} -> {to}")]
    InvalidTransition { from: ThreadStatus, to: ThreadStatus },

    /// SQL / disk failure.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Connection pool could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Row data could not be deserialized into domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema initialization failure.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Pool(_) => true,
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                matches!(e.code, ffi::ErrorCode::DatabaseBusy | ffi::ErrorCode::DatabaseLocked)
            },
            _ => false,
        }
    }

    /// Whether this error means the caller must stop rather than continue generation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured | Self::Migration(_) | Self::DataCorruption { .. }
        ) || matches!(self, Self::Database(_) if !self.is_transient())
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }
}

/// Custom `From<rusqlite::Error>`, not a blanket `#[from]`.
///
/// - Column values that fail to decode map to `DataCorruption`
/// - Foreign-key and CHECK constraint failures map to `Integrity`
/// - Everything else maps to `Database`
///
/// Unique-key collisions never reach this point on the idempotent paths,
/// which use `ON CONFLICT` clauses.
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
                Self::DataCorruption { context: format!("undecodable value in column {column}"), source }
            },
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_CHECK =>
            {
                Self::Integrity(msg.unwrap_or_else(|| e.to_string()))
            },
            other => Self::Database(other),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        Self::DataCorruption { context: "stored enum value".to_owned(), source: Box::new(err) }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
