//! Symmetric character-to-character relationships.

use serde::{Deserialize, Serialize};

/// Structured relationship payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipProperties {
    pub dynamics: Option<String>,
    /// Notes on how the relationship has shifted, oldest first.
    pub evolution: Vec<String>,
    pub conflicts: Vec<String>,
}

/// Canonical stored row: `character1_id < character2_id` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: i64,
    pub character1_id: i64,
    pub character2_id: i64,
    pub relationship_type: String,
    pub description: Option<String>,
    pub properties: RelationshipProperties,
    pub updated_at: String,
}

/// A relationship seen from one participant's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipView {
    pub relationship_id: i64,
    pub self_id: i64,
    pub other_id: i64,
    pub other_identifier: String,
    pub other_name: String,
    pub relationship_type: String,
    pub description: Option<String>,
    pub properties: RelationshipProperties,
}

/// Orders an unordered pair so the lower id comes first.
#[must_use]
pub const fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}
