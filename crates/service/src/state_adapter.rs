//! Writes a [`WorkingState`] into the store and rebuilds it from there.
//!
//! `sync` is not atomic as a whole: every entity is committed on its own, and
//! each write is an idempotent create followed by a full overwrite, so a field
//! the snapshot leaves empty is cleared in the store. A sync that stops halfway
//! leaves a consistent prefix behind, and running it again converges on the
//! same rows without duplicates.
//!
//! Append-only records (knowledge, plot developments, evolution entries,
//! promises) are written directly by the pipeline and are not replayed here.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use storyvault_core::constants::WORKING_STATE_VERSION;
use storyvault_core::{
    ChapterDraft, ChapterUpdate, CharacterDraft, CharacterInput, CharacterUpdate, EntityKind,
    Involvement, LocationDraft, LocationInput, PlotThreadDraft, PlotThreadInput, RelationshipDraft,
    SceneDraft, SceneInput, SceneUpdate, WorkingState,
};
use storyvault_storage::Storage;

use crate::ServiceError;

/// Entities visited by one `sync`, per section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub characters: usize,
    pub relationships: usize,
    pub locations: usize,
    pub world_elements: usize,
    pub plot_threads: usize,
    pub chapters: usize,
    pub scenes: usize,
    pub scene_links: usize,
    /// References to identifiers the snapshot does not define.
    pub skipped_links: usize,
}

pub struct StateAdapter {
    storage: Storage,
}

impl StateAdapter {
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self { storage }
    }

    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Persist every persistable field of `state`.
    pub fn sync(&self, state: &WorkingState) -> Result<SyncReport, ServiceError> {
        if state.version != WORKING_STATE_VERSION {
            return Err(ServiceError::UnsupportedVersion {
                found: state.version,
                expected: WORKING_STATE_VERSION,
            });
        }
        let mut report = SyncReport::default();

        if self.storage.has_story_config()? {
            self.storage.update_story_config(&state.config.to_update())?;
        } else {
            self.storage.initialize_story_config(&state.config)?;
        }

        let character_ids = self.sync_characters(&state.characters, &mut report)?;
        self.sync_relationships(&state.characters, &character_ids, &mut report)?;
        let location_ids = self.sync_locations(&state.locations, &mut report)?;

        for (category, elements) in &state.world {
            for (key, value) in elements {
                self.storage.create_world_element(category, key, value)?;
                report.world_elements += 1;
            }
        }

        for (name, draft) in &state.plot_threads {
            self.sync_plot_thread(name, draft)?;
            report.plot_threads += 1;
        }

        for (&number, chapter) in &state.chapters {
            self.sync_chapter(number, chapter, &character_ids, &location_ids, &mut report)?;
        }

        tracing::info!(
            characters = report.characters,
            relationships = report.relationships,
            chapters = report.chapters,
            scenes = report.scenes,
            "Working state synced"
        );
        Ok(report)
    }

    fn sync_characters(
        &self,
        characters: &BTreeMap<String, CharacterDraft>,
        report: &mut SyncReport,
    ) -> Result<HashMap<String, i64>, ServiceError> {
        let mut ids = HashMap::with_capacity(characters.len());
        for (identifier, draft) in characters {
            let mut input = CharacterInput::new(identifier.as_str(), draft.name.as_str(), draft.role.as_str())
                .personality(draft.personality.clone());
            input.backstory.clone_from(&draft.backstory);
            let id = self.storage.create_character(&input)?;
            self.storage.update_character(
                id,
                &CharacterUpdate {
                    name: Some(draft.name.clone()),
                    role: Some(draft.role.clone()),
                    backstory: Some(draft.backstory.clone()),
                    personality: Some(draft.personality.clone()),
                },
            )?;
            ids.insert(identifier.clone(), id);
            report.characters += 1;
        }
        Ok(ids)
    }

    /// Each pair is written once: from the lexically lower identifier, or from
    /// whichever side carries the entry when it is not mirrored.
    fn sync_relationships(
        &self,
        characters: &BTreeMap<String, CharacterDraft>,
        ids: &HashMap<String, i64>,
        report: &mut SyncReport,
    ) -> Result<(), ServiceError> {
        for (identifier, draft) in characters {
            for (other, relationship) in &draft.relationships {
                let mirrored = characters.get(other).is_some_and(|o| o.relationships.contains_key(identifier));
                if mirrored && identifier > other {
                    continue;
                }
                let (Some(&a), Some(&b)) = (ids.get(identifier), ids.get(other)) else {
                    tracing::warn!(%identifier, %other, "Relationship references unknown character, skipping");
                    report.skipped_links += 1;
                    continue;
                };
                let RelationshipDraft { relationship_type, description, properties } = relationship;
                self.storage.upsert_relationship(a, b, relationship_type, description.as_deref(), properties)?;
                report.relationships += 1;
            }
        }
        Ok(())
    }

    /// Two passes so a child may name a parent that sorts after it.
    fn sync_locations(
        &self,
        locations: &BTreeMap<String, LocationDraft>,
        report: &mut SyncReport,
    ) -> Result<HashMap<String, i64>, ServiceError> {
        let mut ids = HashMap::with_capacity(locations.len());
        for (identifier, draft) in locations {
            let id = self.storage.create_location(&LocationInput::new(identifier.as_str(), draft.name.as_str()))?;
            ids.insert(identifier.clone(), id);
        }
        for (identifier, draft) in locations {
            let parent_id = match draft.parent.as_deref() {
                Some(parent) => {
                    let resolved = ids.get(parent).copied();
                    if resolved.is_none() {
                        tracing::warn!(%identifier, %parent, "Unknown parent location, storing as top-level");
                        report.skipped_links += 1;
                    }
                    resolved
                },
                None => None,
            };
            let input = LocationInput {
                identifier: identifier.clone(),
                name: draft.name.clone(),
                description: draft.description.clone(),
                parent_id,
                location_type: draft.location_type.clone(),
                properties: draft.properties.clone(),
            };
            if let Some(&id) = ids.get(identifier) {
                self.storage.update_location(id, &input)?;
                report.locations += 1;
            }
        }
        Ok(ids)
    }

    fn sync_plot_thread(&self, name: &str, draft: &PlotThreadDraft) -> Result<(), ServiceError> {
        let input = PlotThreadInput {
            name: name.to_owned(),
            description: draft.description.clone(),
            thread_type: draft.thread_type.clone(),
            importance: draft.importance,
            status: draft.status,
        };
        let id = self.storage.create_plot_thread(&input)?;
        self.storage.update_plot_thread_details(
            id,
            &draft.description,
            draft.thread_type.as_deref(),
            draft.importance,
        )?;
        let current = self.storage.get_plot_thread(id)?.map(|t| t.status);
        match current {
            Some(status) if !status.can_transition_to(draft.status) => {
                tracing::debug!(%name, stored = %status, wanted = %draft.status, "Keeping stored thread status");
            },
            _ => self.storage.update_plot_thread_status(id, draft.status)?,
        }
        Ok(())
    }

    fn sync_chapter(
        &self,
        number: u32,
        chapter: &ChapterDraft,
        character_ids: &HashMap<String, i64>,
        location_ids: &HashMap<String, i64>,
        report: &mut SyncReport,
    ) -> Result<(), ServiceError> {
        self.storage.create_chapter(number, &chapter.title, chapter.outline.as_deref())?;
        self.storage.update_chapter(
            number,
            &ChapterUpdate { title: Some(chapter.title.clone()), outline: Some(chapter.outline.clone()) },
        )?;
        report.chapters += 1;

        for (&scene_number, scene) in &chapter.scenes {
            let scene_id = self.sync_scene(number, scene_number, scene)?;
            report.scenes += 1;

            let characters = scene.characters.iter().map(|(identifier, involvement)| {
                (EntityKind::Character, character_ids.get(identifier), identifier, involvement)
            });
            let locations = scene.locations.iter().map(|(identifier, involvement)| {
                (EntityKind::Location, location_ids.get(identifier), identifier, involvement)
            });
            for (kind, id, identifier, &involvement) in characters.chain(locations) {
                let Some(&entity_id) = id else {
                    tracing::warn!(
                        %kind,
                        %identifier,
                        chapter = number,
                        scene = scene_number,
                        "Scene links unknown entity, skipping"
                    );
                    report.skipped_links += 1;
                    continue;
                };
                self.storage.add_entity_to_scene(scene_id, kind, entity_id, involvement)?;
                report.scene_links += 1;
            }
        }
        Ok(())
    }

    fn sync_scene(&self, chapter: u32, scene_number: u32, scene: &SceneDraft) -> Result<i64, ServiceError> {
        let input = SceneInput {
            description: scene.description.clone(),
            content: scene.content.clone(),
            scene_type: scene.scene_type.clone(),
        };
        let id = self.storage.create_scene(chapter, scene_number, &input)?;
        self.storage.update_scene(
            id,
            &SceneUpdate {
                description: Some(scene.description.clone()),
                scene_type: Some(scene.scene_type.clone()),
                content: Some(scene.content.clone()),
                audio_markup: Some(scene.audio_markup.clone()),
            },
        )?;
        Ok(id)
    }

    /// Rebuild the working state purely from the store.
    ///
    /// Fails with `NotConfigured` on a store that was never synced.
    pub fn load(&self) -> Result<WorkingState, ServiceError> {
        let config = self.storage.get_story_config()?.settings;
        let mut state = WorkingState::new(config);

        let characters = self.storage.list_characters()?;
        let character_keys: HashMap<i64, String> =
            characters.iter().map(|c| (c.id, c.identifier.clone())).collect();
        for character in characters {
            state.characters.insert(
                character.identifier,
                CharacterDraft {
                    name: character.name,
                    role: character.role,
                    backstory: character.backstory,
                    personality: character.personality,
                    relationships: BTreeMap::new(),
                },
            );
        }
        for relationship in self.storage.list_relationships()? {
            let first = resolve(&character_keys, EntityKind::Character, relationship.character1_id)?;
            let second = resolve(&character_keys, EntityKind::Character, relationship.character2_id)?;
            let draft = RelationshipDraft {
                relationship_type: relationship.relationship_type,
                description: relationship.description,
                properties: relationship.properties,
            };
            for (owner, other) in [(first, second), (second, first)] {
                if let Some(character) = state.characters.get_mut(owner) {
                    character.relationships.insert(other.clone(), draft.clone());
                }
            }
        }

        let locations = self.storage.list_locations()?;
        let location_keys: HashMap<i64, String> =
            locations.iter().map(|l| (l.id, l.identifier.clone())).collect();
        for location in locations {
            let parent = location.parent_id.and_then(|id| location_keys.get(&id).cloned());
            state.locations.insert(
                location.identifier,
                LocationDraft {
                    name: location.name,
                    description: location.description,
                    parent,
                    location_type: location.location_type,
                    properties: location.properties,
                },
            );
        }

        for element in self.storage.get_world_elements(None)? {
            state.world.entry(element.category).or_default().insert(element.element_key, element.value);
        }

        for thread in self.storage.list_plot_threads()? {
            state.plot_threads.insert(
                thread.name,
                PlotThreadDraft {
                    description: thread.description,
                    thread_type: thread.thread_type,
                    importance: thread.importance,
                    status: thread.status,
                },
            );
        }

        for chapter in self.storage.list_chapters()? {
            let mut draft = ChapterDraft::new(chapter.title);
            draft.outline = chapter.outline;
            for scene in self.storage.list_scenes(chapter.chapter_number)? {
                let mut scene_draft = SceneDraft {
                    description: scene.description,
                    content: scene.content,
                    audio_markup: scene.audio_markup,
                    scene_type: scene.scene_type,
                    ..SceneDraft::default()
                };
                for entity in self.storage.get_entities_in_scene(scene.id)? {
                    let (keys, links): (_, &mut BTreeMap<String, Involvement>) = match entity.entity_kind {
                        EntityKind::Character => (&character_keys, &mut scene_draft.characters),
                        EntityKind::Location => (&location_keys, &mut scene_draft.locations),
                        // world links are written by the pipeline, not the snapshot
                        _ => continue,
                    };
                    let identifier = resolve(keys, entity.entity_kind, entity.entity_id)?;
                    links.insert(identifier.clone(), entity.involvement);
                }
                draft.scenes.insert(scene.scene_number, scene_draft);
            }
            state.chapters.insert(chapter.chapter_number, draft);
        }

        tracing::debug!(
            characters = state.characters.len(),
            chapters = state.chapters.len(),
            scenes = state.scene_count(),
            "Working state loaded"
        );
        Ok(state)
    }
}

fn resolve(keys: &HashMap<i64, String>, kind: EntityKind, id: i64) -> Result<&String, ServiceError> {
    keys.get(&id).ok_or(ServiceError::DanglingReference { kind, id })
}
