use rusqlite::params;
use sha2::{Digest as _, Sha256};
use storyvault_core::ContentEntry;

use super::{get_conn, now, Storage};
use crate::error::Result;

/// Lowercase hex SHA-256 of the literal text. No normalization is applied.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

impl Storage {
    /// Record a prose fragment as used.
    ///
    /// Returns `false` when the exact same text was already registered under
    /// `content_type`; the existing entry is left untouched.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn register_content(
        &self,
        content_type: &str,
        text: &str,
        chapter_number: Option<u32>,
        scene_number: Option<u32>,
    ) -> Result<bool> {
        let hash = content_hash(text);
        let conn = get_conn(&self.pool)?;
        let inserted = conn.execute(
            "INSERT INTO content_registry
               (content_type, content_hash, content, chapter_number, scene_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(content_type, content_hash) DO NOTHING",
            params![content_type, hash, text, chapter_number, scene_number, now()],
        )? > 0;
        if !inserted {
            tracing::debug!(content_type, hash = %hash, "Duplicate content rejected");
        }
        Ok(inserted)
    }

    /// Whether the exact text is already registered under `content_type`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn check_content_exists(&self, content_type: &str, text: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM content_registry WHERE content_type = ?1 AND content_hash = ?2)",
            params![content_type, content_hash(text)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Registered fragments of one type, in registration order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_registered_content(&self, content_type: &str) -> Result<Vec<ContentEntry>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, content_type, content_hash, content, chapter_number, scene_number, created_at
               FROM content_registry WHERE content_type = ?1 ORDER BY id",
        )?;
        let results = stmt
            .query_map([content_type], |row| {
                Ok(ContentEntry {
                    id: row.get(0)?,
                    content_type: row.get(1)?,
                    content_hash: row.get(2)?,
                    content: row.get(3)?,
                    chapter_number: row.get(4)?,
                    scene_number: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }
}
