//! Cross-entity continuity queries: open threads, character arcs, shared
//! scenes, and the chapters a character change would ripple into.

use std::cmp::Reverse;

use rusqlite::{params, OptionalExtension as _};
use serde::Serialize;
use storyvault_core::{
    ChangeScope, Character, CharacterAspect, CharacterKnowledge, CharacterState, EntityChange,
    EntityKind, Involvement, PlotThread, Relationship,
};

use super::characters::row_to_character_state;
use super::plot_threads::row_to_thread;
use super::{enum_column, get_conn, Storage};
use crate::error::Result;

/// An open plot thread with its latest story position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedThread {
    pub thread: PlotThread,
    /// `(chapter_number, scene_number)` of the latest development.
    pub last_development: Option<(u32, u32)>,
    pub development_count: u32,
}

/// One scene on a character's path through the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JourneyStop {
    pub scene_id: i64,
    pub chapter_number: u32,
    pub scene_number: u32,
    pub involvement: Involvement,
    pub state: Option<CharacterState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterJourney {
    pub character: Character,
    pub stops: Vec<JourneyStop>,
    pub evolution: Vec<EntityChange>,
    pub knowledge: Vec<CharacterKnowledge>,
}

/// A scene two characters share, with each one's state there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedScene {
    pub scene_id: i64,
    pub chapter_number: u32,
    pub scene_number: u32,
    pub first_state: Option<CharacterState>,
    pub second_state: Option<CharacterState>,
}

/// How a pair of characters relate, and where they meet.
///
/// `first` and `second` follow the caller's argument order, not the stored pair order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipTimeline {
    pub first_id: i64,
    pub second_id: i64,
    pub relationship: Option<Relationship>,
    pub shared_scenes: Vec<SharedScene>,
}

impl Storage {
    /// Threads that are neither resolved nor abandoned.
    ///
    /// Major threads come first; within the same importance the most recently
    /// developed thread leads and threads never developed trail.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn unresolved_plot_threads(&self) -> Result<Vec<UnresolvedThread>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.description, t.thread_type, t.importance, t.status,
                    t.created_at, t.updated_at,
                    (SELECT COUNT(*) FROM plot_thread_developments d WHERE d.plot_thread_id = t.id)
               FROM plot_threads t
              WHERE t.status NOT IN ('resolved', 'abandoned')
              ORDER BY t.id",
        )?;
        let threads: Vec<(PlotThread, u32)> = stmt
            .query_map([], |row| Ok((row_to_thread(row)?, row.get(8)?)))?
            .collect::<rusqlite::Result<_>>()?;

        let mut latest = conn.prepare(
            "SELECT c.chapter_number, s.scene_number
               FROM plot_thread_developments d
               JOIN scenes s ON s.id = d.scene_id
               JOIN chapters c ON c.id = s.chapter_id
              WHERE d.plot_thread_id = ?1
              ORDER BY c.chapter_number DESC, s.scene_number DESC
              LIMIT 1",
        )?;
        let mut unresolved = Vec::with_capacity(threads.len());
        for (thread, development_count) in threads {
            let last_development: Option<(u32, u32)> = latest
                .query_row([thread.id], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()?;
            unresolved.push(UnresolvedThread { thread, last_development, development_count });
        }

        unresolved.sort_by_key(|u| (u.thread.importance, Reverse(u.last_development)));
        Ok(unresolved)
    }

    /// Every scene a character appears in, with state, evolution and knowledge.
    ///
    /// Returns `None` for an unknown character.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn character_journey(&self, character_id: i64) -> Result<Option<CharacterJourney>> {
        let Some(character) = self.get_character(character_id)? else {
            return Ok(None);
        };
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT s.id, c.chapter_number, s.scene_number, se.involvement
               FROM scene_entities se
               JOIN scenes s ON s.id = se.scene_id
               JOIN chapters c ON c.id = s.chapter_id
              WHERE se.entity_type = 'character' AND se.entity_id = ?1
              ORDER BY c.chapter_number, s.scene_number",
        )?;
        let appearances: Vec<(i64, u32, u32, Involvement)> = stmt
            .query_map([character_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, enum_column(row, 3)?))
            })?
            .collect::<rusqlite::Result<_>>()?;

        let mut state_stmt = conn.prepare(STATE_AT_SCENE)?;
        let mut stops = Vec::with_capacity(appearances.len());
        for (scene_id, chapter_number, scene_number, involvement) in appearances {
            let state = state_stmt
                .query_row(params![character_id, scene_id], row_to_character_state)
                .optional()?;
            stops.push(JourneyStop { scene_id, chapter_number, scene_number, involvement, state });
        }
        drop(state_stmt);
        drop(stmt);
        drop(conn);

        let evolution = self.get_evolution(EntityKind::Character, character_id)?;
        let knowledge = self.get_character_knowledge(character_id)?;
        Ok(Some(CharacterJourney { character, stops, evolution, knowledge }))
    }

    /// The relationship between two characters and every scene both are linked to.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn relationship_dynamics(&self, first_id: i64, second_id: i64) -> Result<RelationshipTimeline> {
        let relationship = self.get_relationship(first_id, second_id)?;
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT s.id, c.chapter_number, s.scene_number
               FROM scenes s
               JOIN chapters c ON c.id = s.chapter_id
              WHERE EXISTS (SELECT 1 FROM scene_entities a
                             WHERE a.scene_id = s.id AND a.entity_type = 'character' AND a.entity_id = ?1)
                AND EXISTS (SELECT 1 FROM scene_entities b
                             WHERE b.scene_id = s.id AND b.entity_type = 'character' AND b.entity_id = ?2)
              ORDER BY c.chapter_number, s.scene_number",
        )?;
        let scenes: Vec<(i64, u32, u32)> = stmt
            .query_map(params![first_id, second_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<_>>()?;

        let mut state_stmt = conn.prepare(STATE_AT_SCENE)?;
        let mut shared_scenes = Vec::with_capacity(scenes.len());
        for (scene_id, chapter_number, scene_number) in scenes {
            let first_state = state_stmt
                .query_row(params![first_id, scene_id], row_to_character_state)
                .optional()?;
            let second_state = state_stmt
                .query_row(params![second_id, scene_id], row_to_character_state)
                .optional()?;
            shared_scenes.push(SharedScene { scene_id, chapter_number, scene_number, first_state, second_state });
        }

        Ok(RelationshipTimeline { first_id, second_id, relationship, shared_scenes })
    }

    /// Chapters that would need revisiting if `aspect` of a character changed.
    ///
    /// Identity-level aspects reach every chapter the character is linked to;
    /// surface-level aspects only those where the character is present.
    /// Sorted ascending, without duplicates.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn chapters_affected_by_change(&self, character_id: i64, aspect: CharacterAspect) -> Result<Vec<u32>> {
        let present_only = aspect.scope() == ChangeScope::Surface;
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT c.chapter_number
               FROM scene_entities se
               JOIN scenes s ON s.id = se.scene_id
               JOIN chapters c ON c.id = s.chapter_id
              WHERE se.entity_type = 'character' AND se.entity_id = ?1
                AND (?2 = 0 OR se.involvement = 'present')
              ORDER BY c.chapter_number",
        )?;
        let chapters = stmt
            .query_map(params![character_id, present_only], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(chapters)
    }
}

const STATE_AT_SCENE: &str =
    "SELECT id, character_id, scene_id, emotional_state, physical_state, location_id, notes
       FROM character_states WHERE character_id = ?1 AND scene_id = ?2";
