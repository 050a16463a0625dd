//! Evolution log records and content registry entries.

use serde::{Deserialize, Serialize};

use crate::chapter::EntityKind;

/// A change to append to the evolution log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntityChange {
    pub entity_kind: EntityKind,
    pub entity_id: i64,
    pub scene_id: i64,
    pub change_type: String,
    pub description: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
}

impl NewEntityChange {
    #[must_use]
    pub fn new(
        entity_kind: EntityKind,
        entity_id: i64,
        scene_id: i64,
        change_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            entity_kind,
            entity_id,
            scene_id,
            change_type: change_type.into(),
            description: description.into(),
            old_value: None,
            new_value: None,
        }
    }

    #[must_use]
    pub fn values(
        mut self,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
    ) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }
}

/// Stored evolution log entry, with the anchoring scene's story position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChange {
    pub id: i64,
    pub entity_kind: EntityKind,
    pub entity_id: i64,
    pub scene_id: i64,
    pub chapter_number: u32,
    pub scene_number: u32,
    pub change_type: String,
    pub description: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub created_at: String,
}

/// A prose fragment recorded as already used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: i64,
    pub content_type: String,
    pub content_hash: String,
    pub content: String,
    pub chapter_number: Option<u32>,
    pub scene_number: Option<u32>,
    pub created_at: String,
}
