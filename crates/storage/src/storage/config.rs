use rusqlite::{params, OptionalExtension as _};
use storyvault_core::constants::STORY_CONFIG_ID;
use storyvault_core::{StoryConfig, StoryConfigUpdate, StorySettings};

use super::{get_conn, now, Storage};
use crate::error::{Result, StorageError};

const SELECT_CONFIG: &str = "SELECT title, genre, tone, author_style, language, initial_idea, outline,
            narrative_structure, target_chapters, target_scenes_per_chapter,
            target_words_per_scene, created_at, updated_at
       FROM story_config WHERE id = ?1";

impl Storage {
    /// Create the configuration singleton.
    ///
    /// Idempotent: if the singleton already exists it is left untouched and
    /// `false` is returned. Use [`Storage::update_story_config`] to refine it.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn initialize_story_config(&self, settings: &StorySettings) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let now = now();
        let inserted = conn.execute(
            "INSERT INTO story_config
               (id, title, genre, tone, author_style, language, initial_idea, outline,
                narrative_structure, target_chapters, target_scenes_per_chapter,
                target_words_per_scene, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
             ON CONFLICT(id) DO NOTHING",
            params![
                STORY_CONFIG_ID,
                settings.title,
                settings.genre,
                settings.tone,
                settings.author_style,
                settings.language,
                settings.initial_idea,
                settings.outline,
                settings.narrative_structure,
                settings.target_chapters,
                settings.target_scenes_per_chapter,
                settings.target_words_per_scene,
                now,
            ],
        )?;
        if inserted > 0 {
            tracing::info!(title = %settings.title, "Story configuration initialized");
        } else {
            tracing::debug!("Story configuration already present, keeping existing row");
        }
        Ok(inserted > 0)
    }

    /// Get the configuration singleton.
    ///
    /// # Errors
    /// Returns [`StorageError::NotConfigured`] if it was never initialized.
    pub fn get_story_config(&self) -> Result<StoryConfig> {
        let conn = get_conn(&self.pool)?;
        conn.query_row(SELECT_CONFIG, [STORY_CONFIG_ID], |row| {
            Ok(StoryConfig {
                settings: row_to_settings(row)?,
                created_at: row.get(11)?,
                updated_at: row.get(12)?,
            })
        })
        .optional()?
        .ok_or(StorageError::NotConfigured)
    }

    /// Whether the configuration singleton exists.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn has_story_config(&self) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM story_config WHERE id = ?1",
            [STORY_CONFIG_ID],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Apply a partial update to the configuration singleton.
    ///
    /// # Errors
    /// Returns [`StorageError::NotConfigured`] if it was never initialized.
    pub fn update_story_config(&self, update: &StoryConfigUpdate) -> Result<StoryConfig> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let mut settings = tx
            .query_row(SELECT_CONFIG, [STORY_CONFIG_ID], row_to_settings)
            .optional()?
            .ok_or(StorageError::NotConfigured)?;
        update.apply_to(&mut settings);

        tx.execute(
            "UPDATE story_config
                SET title = ?1, genre = ?2, tone = ?3, author_style = ?4, language = ?5,
                    initial_idea = ?6, outline = ?7, narrative_structure = ?8,
                    target_chapters = ?9, target_scenes_per_chapter = ?10,
                    target_words_per_scene = ?11, updated_at = ?12
              WHERE id = ?13",
            params![
                settings.title,
                settings.genre,
                settings.tone,
                settings.author_style,
                settings.language,
                settings.initial_idea,
                settings.outline,
                settings.narrative_structure,
                settings.target_chapters,
                settings.target_scenes_per_chapter,
                settings.target_words_per_scene,
                now(),
                STORY_CONFIG_ID,
            ],
        )?;
        tx.commit()?;
        drop(conn);

        self.get_story_config()
    }
}

fn row_to_settings(row: &rusqlite::Row<'_>) -> rusqlite::Result<StorySettings> {
    Ok(StorySettings {
        title: row.get(0)?,
        genre: row.get(1)?,
        tone: row.get(2)?,
        author_style: row.get(3)?,
        language: row.get(4)?,
        initial_idea: row.get(5)?,
        outline: row.get(6)?,
        narrative_structure: row.get(7)?,
        target_chapters: row.get(8)?,
        target_scenes_per_chapter: row.get(9)?,
        target_words_per_scene: row.get(10)?,
    })
}
