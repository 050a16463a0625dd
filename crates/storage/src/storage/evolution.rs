use rusqlite::params;
use storyvault_core::{EntityChange, EntityKind, NewEntityChange};

use super::{enum_column, get_conn, now, optional_json_column, Storage};
use crate::error::Result;

impl Storage {
    /// Append a change to the evolution log. Entries are never updated or deleted.
    ///
    /// # Errors
    /// Returns [`crate::StorageError::Integrity`] if the anchoring scene does not exist.
    pub fn record_change(&self, change: &NewEntityChange) -> Result<i64> {
        let old_value = change.old_value.as_ref().map(serde_json::to_string).transpose()?;
        let new_value = change.new_value.as_ref().map(serde_json::to_string).transpose()?;
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO entity_changes
               (entity_type, entity_id, scene_id, change_type, description, old_value, new_value, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                change.entity_kind.as_str(),
                change.entity_id,
                change.scene_id,
                change.change_type,
                change.description,
                old_value,
                new_value,
                now(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(
            kind = %change.entity_kind,
            entity_id = change.entity_id,
            change_type = %change.change_type,
            id,
            "Change recorded"
        );
        Ok(id)
    }

    /// An entity's change history in story order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_evolution(&self, kind: EntityKind, entity_id: i64) -> Result<Vec<EntityChange>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT e.id, e.entity_type, e.entity_id, e.scene_id, c.chapter_number, s.scene_number,
                    e.change_type, e.description, e.old_value, e.new_value, e.created_at
               FROM entity_changes e
               JOIN scenes s ON s.id = e.scene_id
               JOIN chapters c ON c.id = s.chapter_id
              WHERE e.entity_type = ?1 AND e.entity_id = ?2
              ORDER BY c.chapter_number, s.scene_number, e.id",
        )?;
        let results = stmt
            .query_map(params![kind.as_str(), entity_id], |row| {
                Ok(EntityChange {
                    id: row.get(0)?,
                    entity_kind: enum_column(row, 1)?,
                    entity_id: row.get(2)?,
                    scene_id: row.get(3)?,
                    chapter_number: row.get(4)?,
                    scene_number: row.get(5)?,
                    change_type: row.get(6)?,
                    description: row.get(7)?,
                    old_value: optional_json_column(row, 8)?,
                    new_value: optional_json_column(row, 9)?,
                    created_at: row.get(10)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}
