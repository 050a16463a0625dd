use rusqlite::{params, OptionalExtension as _};
use storyvault_core::{
    Character, CharacterInput, CharacterKnowledge, CharacterState, CharacterStateInput,
    CharacterUpdate, Visibility,
};

use super::{enum_column, get_conn, insert_or_fetch, json_column, now, Storage};
use crate::error::{Result, StorageError};

const CHARACTER_COLUMNS: &str =
    "id, identifier, name, role, backstory, personality, created_at, updated_at";

impl Storage {
    /// Create a character, or resolve to the existing one with the same identifier.
    ///
    /// Retrying with the same identifier returns the same id and leaves the
    /// stored fields as they were; use [`Storage::update_character`] to change them.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn create_character(&self, input: &CharacterInput) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let now = now();
        let (id, inserted) = insert_or_fetch(
            &tx,
            "INSERT INTO characters
               (identifier, name, role, backstory, personality, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(identifier) DO NOTHING",
            params![
                input.identifier,
                input.name,
                input.role,
                input.backstory,
                serde_json::to_string(&input.personality)?,
                now,
            ],
            "SELECT id FROM characters WHERE identifier = ?1",
            params![input.identifier],
        )?;
        tx.commit()?;

        if !inserted {
            tracing::debug!(identifier = %input.identifier, id, "Character exists, reusing row");
        }
        Ok(id)
    }

    /// Get character by ID.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_character(&self, id: i64) -> Result<Option<Character>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {CHARACTER_COLUMNS} FROM characters WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], Self::row_to_character).optional()?)
    }

    /// Get character by its stable identifier.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_character_by_identifier(&self, identifier: &str) -> Result<Option<Character>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {CHARACTER_COLUMNS} FROM characters WHERE identifier = ?1");
        Ok(conn.query_row(&sql, [identifier], Self::row_to_character).optional()?)
    }

    /// All characters in creation order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_characters(&self) -> Result<Vec<Character>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {CHARACTER_COLUMNS} FROM characters ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map([], Self::row_to_character)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Apply a partial update to a character.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the character does not exist.
    pub fn update_character(&self, id: i64, update: &CharacterUpdate) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let personality = update.personality.as_ref().map(serde_json::to_string).transpose()?;
        let affected = conn.execute(
            "UPDATE characters
                SET name = COALESCE(?1, name),
                    role = COALESCE(?2, role),
                    backstory = CASE WHEN ?3 THEN ?4 ELSE backstory END,
                    personality = COALESCE(?5, personality),
                    updated_at = ?6
              WHERE id = ?7",
            params![
                update.name,
                update.role,
                update.backstory.is_some(),
                update.backstory.as_ref().and_then(Option::as_deref),
                personality,
                now(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("character", id));
        }
        Ok(())
    }

    /// Record (or overwrite) a character's state at a scene.
    ///
    /// # Errors
    /// Returns [`StorageError::Integrity`] if the character, scene or location does not exist.
    pub fn update_character_state(
        &self,
        character_id: i64,
        scene_id: i64,
        state: &CharacterStateInput,
    ) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO character_states
               (character_id, scene_id, emotional_state, physical_state, location_id, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(character_id, scene_id) DO UPDATE SET
                emotional_state = excluded.emotional_state,
                physical_state = excluded.physical_state,
                location_id = excluded.location_id,
                notes = excluded.notes",
            params![
                character_id,
                scene_id,
                state.emotional_state,
                state.physical_state,
                state.location_id,
                state.notes,
            ],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM character_states WHERE character_id = ?1 AND scene_id = ?2",
            params![character_id, scene_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// A character's recorded state at a scene, if any was recorded.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_character_state(
        &self,
        character_id: i64,
        scene_id: i64,
    ) -> Result<Option<CharacterState>> {
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT id, character_id, scene_id, emotional_state, physical_state, location_id, notes
                   FROM character_states WHERE character_id = ?1 AND scene_id = ?2",
                params![character_id, scene_id],
                row_to_character_state,
            )
            .optional()?)
    }

    /// Record a fact a character has learned.
    ///
    /// # Errors
    /// Returns [`StorageError::Integrity`] if the character or scene does not exist.
    pub fn add_character_knowledge(
        &self,
        character_id: i64,
        fact: &str,
        visibility: Visibility,
        learned_scene_id: Option<i64>,
    ) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO character_knowledge (character_id, fact, visibility, learned_scene_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![character_id, fact, visibility.as_str(), learned_scene_id, now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Everything a character knows, in the order it was learned.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_character_knowledge(&self, character_id: i64) -> Result<Vec<CharacterKnowledge>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, character_id, fact, visibility, learned_scene_id, created_at
               FROM character_knowledge WHERE character_id = ?1 ORDER BY id",
        )?;
        let results = stmt
            .query_map([character_id], |row| {
                Ok(CharacterKnowledge {
                    id: row.get(0)?,
                    character_id: row.get(1)?,
                    fact: row.get(2)?,
                    visibility: enum_column(row, 3)?,
                    learned_scene_id: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    pub(crate) fn row_to_character(row: &rusqlite::Row<'_>) -> rusqlite::Result<Character> {
        Ok(Character {
            id: row.get(0)?,
            identifier: row.get(1)?,
            name: row.get(2)?,
            role: row.get(3)?,
            backstory: row.get(4)?,
            personality: json_column(row, 5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

pub(crate) fn row_to_character_state(row: &rusqlite::Row<'_>) -> rusqlite::Result<CharacterState> {
    Ok(CharacterState {
        id: row.get(0)?,
        character_id: row.get(1)?,
        scene_id: row.get(2)?,
        emotional_state: row.get(3)?,
        physical_state: row.get(4)?,
        location_id: row.get(5)?,
        notes: row.get(6)?,
    })
}
