//! Storage layer for storyvault
//!
//! SQLite-backed entity store, relationship ledger, append-only evolution log
//! and content dedup registry, behind a single synchronous [`Storage`] handle.

mod error;
mod migrations;
mod storage;
#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use migrations::SCHEMA_VERSION;
pub use storage::{
    CharacterJourney, JourneyStop, RelationshipTimeline, SceneCharacter, SceneContext,
    SharedScene, Storage, StoryStats, UnresolvedThread, content_hash,
};
