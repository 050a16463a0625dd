use rusqlite::{params, OptionalExtension as _};
use serde::Serialize;
use storyvault_core::{
    Character, CharacterState, EntityKind, Involvement, Location, PlotThreadDevelopment, Scene,
    SceneEntity, WorldElement,
};

use super::chapters::{row_to_scene, SCENE_SELECT};
use super::characters::row_to_character_state;
use super::locations::row_to_location;
use super::plot_threads::row_to_development;
use super::world::row_to_world_element;
use super::{enum_column, get_conn, now, Storage};
use crate::error::{Result, StorageError};

/// A character present in a scene, with the state recorded for it there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneCharacter {
    pub character: Character,
    pub involvement: Involvement,
    pub state: Option<CharacterState>,
}

/// Everything needed to write or revise one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneContext {
    pub scene: Scene,
    pub characters: Vec<SceneCharacter>,
    pub locations: Vec<(Location, Involvement)>,
    pub world_elements: Vec<(WorldElement, Involvement)>,
    /// The scene immediately before this one in story order, if any.
    pub previous_scene: Option<Scene>,
    /// Plot developments anchored at this scene.
    pub developments: Vec<PlotThreadDevelopment>,
}

impl Storage {
    /// Link an entity to a scene. Re-linking the same entity replaces its involvement.
    ///
    /// # Errors
    /// Returns [`StorageError::Integrity`] if the scene or entity does not exist,
    /// or the entity kind cannot appear in a scene.
    pub fn add_entity_to_scene(
        &self,
        scene_id: i64,
        kind: EntityKind,
        entity_id: i64,
        involvement: Involvement,
    ) -> Result<()> {
        if !kind.is_scene_linkable() {
            return Err(StorageError::Integrity(format!("{kind} cannot be linked to a scene")));
        }
        let table = match kind {
            EntityKind::Character => "characters",
            EntityKind::Location => "locations",
            _ => "world_elements",
        };
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let exists: bool = tx.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
            [entity_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StorageError::Integrity(format!("{kind} {entity_id} does not exist")));
        }
        tx.execute(
            "INSERT INTO scene_entities (scene_id, entity_type, entity_id, involvement)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scene_id, entity_type, entity_id) DO UPDATE SET
                involvement = excluded.involvement",
            params![scene_id, kind.as_str(), entity_id, involvement.as_str()],
        )?;
        tx.execute("UPDATE scenes SET updated_at = ?1 WHERE id = ?2", params![now(), scene_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Entities linked to a scene, with display names resolved.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_entities_in_scene(&self, scene_id: i64) -> Result<Vec<SceneEntity>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT se.scene_id, se.entity_type, se.entity_id, se.involvement,
                    COALESCE(c.name, l.name, w.category || '/' || w.element_key)
               FROM scene_entities se
               LEFT JOIN characters c ON se.entity_type = 'character' AND c.id = se.entity_id
               LEFT JOIN locations l ON se.entity_type = 'location' AND l.id = se.entity_id
               LEFT JOIN world_elements w ON se.entity_type = 'world_element' AND w.id = se.entity_id
              WHERE se.scene_id = ?1
              ORDER BY se.entity_type, se.entity_id",
        )?;
        let results = stmt
            .query_map([scene_id], |row| {
                Ok(SceneEntity {
                    scene_id: row.get(0)?,
                    entity_kind: enum_column(row, 1)?,
                    entity_id: row.get(2)?,
                    involvement: enum_column(row, 3)?,
                    name: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Assemble the writing context for one scene.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the scene does not exist.
    pub fn get_scene_context(&self, scene_id: i64) -> Result<SceneContext> {
        let scene = self.get_scene(scene_id)?.ok_or_else(|| StorageError::not_found("scene", scene_id))?;
        let conn = get_conn(&self.pool)?;

        let mut stmt = conn.prepare(
            "SELECT c.id, c.identifier, c.name, c.role, c.backstory, c.personality,
                    c.created_at, c.updated_at, se.involvement
               FROM scene_entities se
               JOIN characters c ON c.id = se.entity_id
              WHERE se.scene_id = ?1 AND se.entity_type = 'character'
              ORDER BY c.id",
        )?;
        let linked: Vec<(Character, Involvement)> = stmt
            .query_map([scene_id], |row| {
                Ok((Self::row_to_character(row)?, enum_column(row, 8)?))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut state_stmt = conn.prepare(
            "SELECT id, character_id, scene_id, emotional_state, physical_state, location_id, notes
               FROM character_states WHERE character_id = ?1 AND scene_id = ?2",
        )?;
        let mut characters = Vec::with_capacity(linked.len());
        for (character, involvement) in linked {
            let state = state_stmt
                .query_row(params![character.id, scene_id], row_to_character_state)
                .optional()?;
            characters.push(SceneCharacter { character, involvement, state });
        }

        let mut stmt = conn.prepare(
            "SELECT l.id, l.identifier, l.name, l.description, l.parent_id, l.location_type,
                    l.properties, se.involvement
               FROM scene_entities se
               JOIN locations l ON l.id = se.entity_id
              WHERE se.scene_id = ?1 AND se.entity_type = 'location'
              ORDER BY l.id",
        )?;
        let locations = stmt
            .query_map([scene_id], |row| {
                Ok((row_to_location(row)?, enum_column(row, 7)?))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut stmt = conn.prepare(
            "SELECT w.id, w.category, w.element_key, w.value, w.updated_at, se.involvement
               FROM scene_entities se
               JOIN world_elements w ON w.id = se.entity_id
              WHERE se.scene_id = ?1 AND se.entity_type = 'world_element'
              ORDER BY w.category, w.element_key",
        )?;
        let world_elements = stmt
            .query_map([scene_id], |row| {
                Ok((row_to_world_element(row)?, enum_column(row, 5)?))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut stmt = conn.prepare(
            "SELECT d.id, d.plot_thread_id, d.scene_id, c.chapter_number, s.scene_number,
                    d.development_type, d.description, d.created_at
               FROM plot_thread_developments d
               JOIN scenes s ON s.id = d.scene_id
               JOIN chapters c ON c.id = s.chapter_id
              WHERE d.scene_id = ?1
              ORDER BY d.id",
        )?;
        let developments = stmt.query_map([scene_id], row_to_development)?.collect::<rusqlite::Result<_>>()?;

        let previous_scene = conn
            .query_row(
                &format!(
                    "{SCENE_SELECT}
                      WHERE c.chapter_number < ?1 OR (c.chapter_number = ?1 AND s.scene_number < ?2)
                      ORDER BY c.chapter_number DESC, s.scene_number DESC
                      LIMIT 1"
                ),
                params![scene.chapter_number, scene.scene_number],
                row_to_scene,
            )
            .optional()?;

        Ok(SceneContext { scene, characters, locations, world_elements, previous_scene, developments })
    }
}
