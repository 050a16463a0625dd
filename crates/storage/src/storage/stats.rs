use serde::Serialize;

use super::{get_conn, Storage};
use crate::error::Result;

/// Row counts across the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoryStats {
    pub characters: u64,
    pub locations: u64,
    pub world_elements: u64,
    pub relationships: u64,
    pub plot_threads: u64,
    pub unresolved_threads: u64,
    pub chapters: u64,
    pub scenes: u64,
    pub total_words: u64,
    pub evolution_entries: u64,
    pub registered_content: u64,
    pub open_promises: u64,
}

impl Storage {
    /// Get story statistics.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_stats(&self) -> Result<StoryStats> {
        let conn = get_conn(&self.pool)?;
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as u64)
        };
        Ok(StoryStats {
            characters: count("SELECT COUNT(*) FROM characters")?,
            locations: count("SELECT COUNT(*) FROM locations")?,
            world_elements: count("SELECT COUNT(*) FROM world_elements")?,
            relationships: count("SELECT COUNT(*) FROM character_relationships")?,
            plot_threads: count("SELECT COUNT(*) FROM plot_threads")?,
            unresolved_threads: count(
                "SELECT COUNT(*) FROM plot_threads WHERE status NOT IN ('resolved', 'abandoned')",
            )?,
            chapters: count("SELECT COUNT(*) FROM chapters")?,
            scenes: count("SELECT COUNT(*) FROM scenes")?,
            total_words: count("SELECT COALESCE(SUM(word_count), 0) FROM scenes")?,
            evolution_entries: count("SELECT COUNT(*) FROM entity_changes")?,
            registered_content: count("SELECT COUNT(*) FROM content_registry")?,
            open_promises: count("SELECT COUNT(*) FROM character_promises WHERE fulfilled = 0")?,
        })
    }
}
