use rusqlite::{params, OptionalExtension as _};
use storyvault_core::{WorldElement, WorldValue};

use super::{get_conn, json_column, now, Storage};
use crate::error::Result;

impl Storage {
    /// Write a world element; the same `(category, key)` replaces the prior value.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn create_world_element(&self, category: &str, key: &str, value: &WorldValue) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO world_elements (category, element_key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category, element_key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![category, key, serde_json::to_string(value)?, now()],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM world_elements WHERE category = ?1 AND element_key = ?2",
            params![category, key],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// Get one world element.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_world_element(&self, category: &str, key: &str) -> Result<Option<WorldElement>> {
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT id, category, element_key, value, updated_at
                   FROM world_elements WHERE category = ?1 AND element_key = ?2",
                params![category, key],
                row_to_world_element,
            )
            .optional()?)
    }

    /// World elements, optionally restricted to one category, ordered by category then key.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_world_elements(&self, category: Option<&str>) -> Result<Vec<WorldElement>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, category, element_key, value, updated_at
               FROM world_elements
              WHERE ?1 IS NULL OR category = ?1
              ORDER BY category, element_key",
        )?;
        let results = stmt
            .query_map([category], row_to_world_element)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}

pub(crate) fn row_to_world_element(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorldElement> {
    Ok(WorldElement {
        id: row.get(0)?,
        category: row.get(1)?,
        element_key: row.get(2)?,
        value: json_column(row, 3)?,
        updated_at: row.get(4)?,
    })
}
