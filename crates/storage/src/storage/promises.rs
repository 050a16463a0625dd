use rusqlite::params;
use storyvault_core::CharacterPromise;

use super::{get_conn, now, Storage};
use crate::error::Result;

impl Storage {
    /// Record a narrative promise a character carries (a setup awaiting payoff).
    ///
    /// # Errors
    /// Returns [`crate::StorageError::Integrity`] if the character does not exist.
    pub fn create_character_promise(
        &self,
        character_id: i64,
        promise_type: &str,
        description: &str,
        introduced_chapter: u32,
    ) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO character_promises
               (character_id, promise_type, description, introduced_chapter, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![character_id, promise_type, description, introduced_chapter, now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Mark a promise fulfilled at a scene.
    ///
    /// Returns `false` if it was already fulfilled or does not exist; a
    /// fulfilled promise is never reopened or moved to another scene.
    ///
    /// # Errors
    /// Returns [`crate::StorageError::Integrity`] if the scene does not exist.
    pub fn fulfill_promise(&self, promise_id: i64, scene_id: i64) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE character_promises SET fulfilled = 1, fulfilled_scene_id = ?1
              WHERE id = ?2 AND fulfilled = 0",
            params![scene_id, promise_id],
        )?;
        if affected == 0 {
            tracing::debug!(promise_id, "Promise already fulfilled or unknown");
        }
        Ok(affected > 0)
    }

    /// Open promises, for one character or for everyone, oldest chapter first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_unfulfilled_promises(&self, character_id: Option<i64>) -> Result<Vec<CharacterPromise>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, character_id, promise_type, description, introduced_chapter,
                    fulfilled, fulfilled_scene_id, created_at
               FROM character_promises
              WHERE fulfilled = 0 AND (?1 IS NULL OR character_id = ?1)
              ORDER BY introduced_chapter, id",
        )?;
        let results = stmt
            .query_map([character_id], |row| {
                Ok(CharacterPromise {
                    id: row.get(0)?,
                    character_id: row.get(1)?,
                    promise_type: row.get(2)?,
                    description: row.get(3)?,
                    introduced_chapter: row.get(4)?,
                    fulfilled: row.get(5)?,
                    fulfilled_scene_id: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}
