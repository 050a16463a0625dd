//! Typed error enum for the service layer.
//!
//! Wraps storage failures and adds the snapshot-level errors of the state
//! adapter, so callers can match on specific failure modes.

use storyvault_core::EntityKind;
use storyvault_storage::StorageError;
use thiserror::Error;

/// Service-layer error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, integrity, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Working state snapshot was produced by an incompatible pipeline version.
    #[error("unsupported working state version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// A stored row points at an entity that cannot be read back.
    #[error("stored reference to missing {kind} {id}")]
    DanglingReference { kind: EntityKind, id: i64 },
}

impl ServiceError {
    /// Whether the pipeline must stop rather than continue generation.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_fatal(),
            Self::UnsupportedVersion { .. } | Self::DanglingReference { .. } => true,
        }
    }
}
