use rusqlite::{params, OptionalExtension as _};
use storyvault_core::{canonical_pair, Relationship, RelationshipProperties, RelationshipView};

use super::{get_conn, json_column, now, Storage};
use crate::error::{Result, StorageError};

impl Storage {
    /// Create or replace the relationship between two characters.
    ///
    /// The pair is normalized so the lower id is stored first: `(a, b)` and
    /// `(b, a)` address the same row. Returns the canonical row id.
    ///
    /// # Errors
    /// Returns [`StorageError::Integrity`] for a self-relationship or unknown character.
    pub fn upsert_relationship(
        &self,
        character_a: i64,
        character_b: i64,
        relationship_type: &str,
        description: Option<&str>,
        properties: &RelationshipProperties,
    ) -> Result<i64> {
        if character_a == character_b {
            return Err(StorageError::Integrity(format!(
                "character {character_a} cannot have a relationship with itself"
            )));
        }
        let (first, second) = canonical_pair(character_a, character_b);
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO character_relationships
               (character1_id, character2_id, relationship_type, description, properties, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(character1_id, character2_id) DO UPDATE SET
                relationship_type = excluded.relationship_type,
                description = excluded.description,
                properties = excluded.properties,
                updated_at = excluded.updated_at",
            params![
                first,
                second,
                relationship_type,
                description,
                serde_json::to_string(properties)?,
                now(),
            ],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM character_relationships WHERE character1_id = ?1 AND character2_id = ?2",
            params![first, second],
            |row| row.get(0),
        )?;
        tx.commit()?;
        tracing::debug!(first, second, relationship_type, id, "Relationship upserted");
        Ok(id)
    }

    /// The canonical relationship row for a pair, in either order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_relationship(&self, character_a: i64, character_b: i64) -> Result<Option<Relationship>> {
        let (first, second) = canonical_pair(character_a, character_b);
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT id, character1_id, character2_id, relationship_type, description, properties, updated_at
                   FROM character_relationships WHERE character1_id = ?1 AND character2_id = ?2",
                params![first, second],
                row_to_relationship,
            )
            .optional()?)
    }

    /// Every relationship a character takes part in, from that character's side.
    ///
    /// An isolated character yields an empty list.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_relationships(&self, character_id: i64) -> Result<Vec<RelationshipView>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.character1_id, r.character2_id, r.relationship_type, r.description,
                    r.properties, c.identifier, c.name
               FROM character_relationships r
               JOIN characters c
                 ON c.id = CASE WHEN r.character1_id = ?1 THEN r.character2_id ELSE r.character1_id END
              WHERE r.character1_id = ?1 OR r.character2_id = ?1
              ORDER BY c.id",
        )?;
        let results = stmt
            .query_map([character_id], |row| {
                let first: i64 = row.get(1)?;
                let second: i64 = row.get(2)?;
                Ok(RelationshipView {
                    relationship_id: row.get(0)?,
                    self_id: character_id,
                    other_id: if first == character_id { second } else { first },
                    relationship_type: row.get(3)?,
                    description: row.get(4)?,
                    properties: json_column(row, 5)?,
                    other_identifier: row.get(6)?,
                    other_name: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// All canonical relationship rows.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_relationships(&self) -> Result<Vec<Relationship>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, character1_id, character2_id, relationship_type, description, properties, updated_at
               FROM character_relationships ORDER BY character1_id, character2_id",
        )?;
        let results = stmt.query_map([], row_to_relationship)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}

fn row_to_relationship(row: &rusqlite::Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: row.get(0)?,
        character1_id: row.get(1)?,
        character2_id: row.get(2)?,
        relationship_type: row.get(3)?,
        description: row.get(4)?,
        properties: json_column(row, 5)?,
        updated_at: row.get(6)?,
    })
}
