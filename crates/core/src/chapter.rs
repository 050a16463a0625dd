//! Chapters, scenes and the entities that appear in them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stored chapter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub chapter_number: u32,
    pub title: String,
    pub outline: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial chapter update. `Some(None)` clears the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterUpdate {
    pub title: Option<String>,
    pub outline: Option<Option<String>>,
}

/// Payload for creating a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub scene_type: Option<String>,
}

impl SceneInput {
    #[must_use]
    pub fn described(description: impl Into<String>) -> Self {
        Self { description: Some(description.into()), ..Self::default() }
    }
}

/// Stored scene row. `(chapter_id, scene_number)` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: i64,
    pub chapter_id: i64,
    pub chapter_number: u32,
    pub scene_number: u32,
    pub description: Option<String>,
    pub content: Option<String>,
    pub audio_markup: Option<String>,
    pub scene_type: Option<String>,
    pub updated_at: String,
}

/// Partial scene update.
///
/// Outer `None` leaves a column untouched and `Some(None)` clears it. Setting
/// `content` also refreshes the stored word count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneUpdate {
    pub description: Option<Option<String>>,
    pub scene_type: Option<Option<String>>,
    pub content: Option<Option<String>>,
    pub audio_markup: Option<Option<String>>,
}

/// Kinds of rows the evolution log and scene links can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Character,
    Location,
    WorldElement,
    PlotThread,
    Chapter,
    Scene,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Character => "character",
            Self::Location => "location",
            Self::WorldElement => "world_element",
            Self::PlotThread => "plot_thread",
            Self::Chapter => "chapter",
            Self::Scene => "scene",
        }
    }

    /// Whether rows of this kind can be linked into a scene.
    #[must_use]
    pub const fn is_scene_linkable(&self) -> bool {
        matches!(*self, Self::Character | Self::Location | Self::WorldElement)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "character" => Ok(Self::Character),
            "location" => Ok(Self::Location),
            "world_element" | "worldelement" => Ok(Self::WorldElement),
            "plot_thread" | "plotthread" => Ok(Self::PlotThread),
            "chapter" => Ok(Self::Chapter),
            "scene" => Ok(Self::Scene),
            other => Err(CoreError::InvalidEntityKind(other.to_owned())),
        }
    }
}

/// How an entity takes part in a scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Involvement {
    #[default]
    Present,
    Mentioned,
    Affected,
}

impl Involvement {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Present => "present",
            Self::Mentioned => "mentioned",
            Self::Affected => "affected",
        }
    }
}

impl FromStr for Involvement {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "mentioned" => Ok(Self::Mentioned),
            "affected" => Ok(Self::Affected),
            other => Err(CoreError::InvalidInvolvement(other.to_owned())),
        }
    }
}

/// An entity linked to a scene, with its display name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub scene_id: i64,
    pub entity_kind: EntityKind,
    pub entity_id: i64,
    pub involvement: Involvement,
    /// Character/location name or world element key; `None` if the row is gone.
    pub name: Option<String>,
}
