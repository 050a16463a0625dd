//! Typed snapshot of the story-in-progress held by the generation pipeline.
//!
//! A [`WorkingState`] is disposable: everything except [`WorkingState::scratch`]
//! can be rebuilt from the store, and is written back to it by the state adapter.
//! Natural keys (character/location identifiers, thread names, chapter and
//! scene numbers) are the map keys, so the snapshot never carries row ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::character::Personality;
use crate::chapter::Involvement;
use crate::constants::WORKING_STATE_VERSION;
use crate::plot::{Importance, ThreadStatus};
use crate::relationship::RelationshipProperties;
use crate::story::StorySettings;
use crate::world::{PropertyMap, WorldValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingState {
    pub version: u32,
    pub config: StorySettings,
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterDraft>,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationDraft>,
    /// `category -> element_key -> value`.
    #[serde(default)]
    pub world: BTreeMap<String, BTreeMap<String, WorldValue>>,
    #[serde(default)]
    pub plot_threads: BTreeMap<String, PlotThreadDraft>,
    #[serde(default)]
    pub chapters: BTreeMap<u32, ChapterDraft>,
    /// Pipeline-only scratch flags. Never persisted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scratch: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub backstory: Option<String>,
    #[serde(default)]
    pub personality: Personality,
    /// Keyed by the other character's identifier. Mirrored on both participants.
    #[serde(default)]
    pub relationships: BTreeMap<String, RelationshipDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDraft {
    pub relationship_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: RelationshipProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Identifier of the enclosing location.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub properties: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotThreadDraft {
    pub description: String,
    #[serde(default)]
    pub thread_type: Option<String>,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub status: ThreadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDraft {
    pub title: String,
    #[serde(default)]
    pub outline: Option<String>,
    #[serde(default)]
    pub scenes: BTreeMap<u32, SceneDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDraft {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub audio_markup: Option<String>,
    #[serde(default)]
    pub scene_type: Option<String>,
    /// Character identifier -> involvement.
    #[serde(default)]
    pub characters: BTreeMap<String, Involvement>,
    /// Location identifier -> involvement.
    #[serde(default)]
    pub locations: BTreeMap<String, Involvement>,
}

impl WorkingState {
    #[must_use]
    pub fn new(config: StorySettings) -> Self {
        Self {
            version: WORKING_STATE_VERSION,
            config,
            characters: BTreeMap::new(),
            locations: BTreeMap::new(),
            world: BTreeMap::new(),
            plot_threads: BTreeMap::new(),
            chapters: BTreeMap::new(),
            scratch: BTreeMap::new(),
        }
    }

    /// Records a relationship on both participants.
    ///
    /// Returns `false` (and changes nothing) unless both characters exist and differ.
    pub fn relate(&mut self, a: &str, b: &str, draft: RelationshipDraft) -> bool {
        if a == b || !self.characters.contains_key(a) || !self.characters.contains_key(b) {
            return false;
        }
        if let Some(first) = self.characters.get_mut(a) {
            first.relationships.insert(b.to_owned(), draft.clone());
        }
        if let Some(second) = self.characters.get_mut(b) {
            second.relationships.insert(a.to_owned(), draft);
        }
        true
    }

    /// Mutable access to a scene, creating the chapter entry's scene if missing.
    ///
    /// Returns `None` when the chapter itself is not in the snapshot.
    pub fn scene_mut(&mut self, chapter: u32, scene: u32) -> Option<&mut SceneDraft> {
        self.chapters.get_mut(&chapter).map(|c| c.scenes.entry(scene).or_default())
    }

    /// Equality over persisted fields only.
    #[must_use]
    pub fn same_story_as(&self, other: &Self) -> bool {
        self.version == other.version
            && self.config == other.config
            && self.characters == other.characters
            && self.locations == other.locations
            && self.world == other.world
            && self.plot_threads == other.plot_threads
            && self.chapters == other.chapters
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.chapters.values().map(|c| c.scenes.len()).sum()
    }
}

impl CharacterDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            backstory: None,
            personality: Personality::default(),
            relationships: BTreeMap::new(),
        }
    }
}

impl RelationshipDraft {
    #[must_use]
    pub fn new(relationship_type: impl Into<String>) -> Self {
        Self {
            relationship_type: relationship_type.into(),
            description: None,
            properties: RelationshipProperties::default(),
        }
    }
}

impl ChapterDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), outline: None, scenes: BTreeMap::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorkingState {
        let mut state = WorkingState::new(StorySettings::new("Ember", "fantasy", "epic"));
        state.characters.insert("hero".to_owned(), CharacterDraft::new("Aria", "protagonist"));
        state.characters.insert("mentor".to_owned(), CharacterDraft::new("Oren", "mentor"));
        state
    }

    #[test]
    fn test_relate_mirrors_both_sides() {
        let mut state = sample();
        assert!(state.relate("hero", "mentor", RelationshipDraft::new("mentor-student")));
        assert_eq!(
            state.characters["hero"].relationships["mentor"].relationship_type,
            "mentor-student"
        );
        assert!(state.characters["mentor"].relationships.contains_key("hero"));
    }

    #[test]
    fn test_relate_rejects_unknown_or_self() {
        let mut state = sample();
        assert!(!state.relate("hero", "ghost", RelationshipDraft::new("haunts")));
        assert!(!state.relate("hero", "hero", RelationshipDraft::new("self")));
        assert!(state.characters["hero"].relationships.is_empty());
    }

    #[test]
    fn test_same_story_ignores_scratch() {
        let a = sample();
        let mut b = sample();
        b.scratch.insert("needs_revision".to_owned(), serde_json::json!(true));
        assert!(a.same_story_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_scene_mut_requires_chapter() {
        let mut state = sample();
        assert!(state.scene_mut(1, 1).is_none());
        state.chapters.insert(1, ChapterDraft::new("Embers"));
        if let Some(scene) = state.scene_mut(1, 1) {
            scene.characters.insert("hero".to_owned(), Involvement::Present);
        }
        assert_eq!(state.scene_count(), 1);
    }

    #[test]
    fn test_json_shape_uses_string_chapter_keys() {
        let mut state = sample();
        state.chapters.insert(3, ChapterDraft::new("Ash"));
        let json = serde_json::to_value(&state).unwrap();
        assert!(json["chapters"]["3"].is_object());
        assert!(json.get("scratch").is_none());
        let back: WorkingState = serde_json::from_value(json).unwrap();
        assert!(back.same_story_as(&state));
    }
}
