use rusqlite::{params, OptionalExtension as _};
use storyvault_core::{Location, LocationInput};

use super::{get_conn, insert_or_fetch, json_column, Storage};
use crate::error::Result;

const LOCATION_COLUMNS: &str =
    "id, identifier, name, description, parent_id, location_type, properties";

impl Storage {
    /// Create a location, or resolve to the existing one with the same identifier.
    ///
    /// # Errors
    /// Returns [`crate::StorageError::Integrity`] if `parent_id` does not exist.
    pub fn create_location(&self, input: &LocationInput) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let (id, inserted) = insert_or_fetch(
            &tx,
            "INSERT INTO locations (identifier, name, description, parent_id, location_type, properties)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(identifier) DO NOTHING",
            params![
                input.identifier,
                input.name,
                input.description,
                input.parent_id,
                input.location_type,
                serde_json::to_string(&input.properties)?,
            ],
            "SELECT id FROM locations WHERE identifier = ?1",
            params![input.identifier],
        )?;
        tx.commit()?;
        if !inserted {
            tracing::debug!(identifier = %input.identifier, id, "Location exists, reusing row");
        }
        Ok(id)
    }

    /// Overwrite a location's descriptive fields. The identifier never changes.
    ///
    /// # Errors
    /// Returns [`crate::StorageError::NotFound`] if the location does not exist.
    pub fn update_location(&self, id: i64, input: &LocationInput) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE locations
                SET name = ?1, description = ?2, parent_id = ?3, location_type = ?4, properties = ?5
              WHERE id = ?6",
            params![
                input.name,
                input.description,
                input.parent_id,
                input.location_type,
                serde_json::to_string(&input.properties)?,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(crate::StorageError::not_found("location", id));
        }
        Ok(())
    }

    /// Get location by ID.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_location(&self, id: i64) -> Result<Option<Location>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1");
        Ok(conn.query_row(&sql, [id], row_to_location).optional()?)
    }

    /// Get location by identifier.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_location_by_identifier(&self, identifier: &str) -> Result<Option<Location>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE identifier = ?1");
        Ok(conn.query_row(&sql, [identifier], row_to_location).optional()?)
    }

    /// All locations in creation order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_locations(&self) -> Result<Vec<Location>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map([], row_to_location)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Locations nested directly inside `parent_id`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn child_locations(&self, parent_id: i64) -> Result<Vec<Location>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE parent_id = ?1 ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map([parent_id], row_to_location)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}

pub(crate) fn row_to_location(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        identifier: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        parent_id: row.get(4)?,
        location_type: row.get(5)?,
        properties: json_column(row, 6)?,
    })
}
