use rusqlite::{params, OptionalExtension as _};
use storyvault_core::{Chapter, ChapterUpdate, Scene, SceneInput, SceneUpdate};

use super::{get_conn, insert_or_fetch, now, Storage};
use crate::error::{Result, StorageError};

pub(crate) const SCENE_SELECT: &str = "SELECT s.id, s.chapter_id, c.chapter_number, s.scene_number, s.description,
            s.content, s.audio_markup, s.scene_type, s.updated_at
       FROM scenes s JOIN chapters c ON c.id = s.chapter_id";

/// Whitespace-separated word count of a prose block.
pub(crate) fn word_count(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}

impl Storage {
    /// Create a chapter, or resolve to the existing chapter with the same number.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn create_chapter(&self, chapter_number: u32, title: &str, outline: Option<&str>) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let now = now();
        let (id, inserted) = insert_or_fetch(
            &tx,
            "INSERT INTO chapters (chapter_number, title, outline, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(chapter_number) DO NOTHING",
            params![chapter_number, title, outline, now],
            "SELECT id FROM chapters WHERE chapter_number = ?1",
            params![chapter_number],
        )?;
        tx.commit()?;
        if inserted {
            tracing::debug!(chapter_number, id, "Chapter created");
        }
        Ok(id)
    }

    /// Get chapter by number.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_chapter(&self, chapter_number: u32) -> Result<Option<Chapter>> {
        let conn = get_conn(&self.pool)?;
        Ok(conn
            .query_row(
                "SELECT id, chapter_number, title, outline, created_at, updated_at
                   FROM chapters WHERE chapter_number = ?1",
                [chapter_number],
                row_to_chapter,
            )
            .optional()?)
    }

    /// All chapters ordered by number.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_chapters(&self) -> Result<Vec<Chapter>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, chapter_number, title, outline, created_at, updated_at
               FROM chapters ORDER BY chapter_number",
        )?;
        let results = stmt.query_map([], row_to_chapter)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Apply a partial update to a chapter.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the chapter does not exist.
    pub fn update_chapter(&self, chapter_number: u32, update: &ChapterUpdate) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE chapters
                SET title = COALESCE(?1, title),
                    outline = CASE WHEN ?2 THEN ?3 ELSE outline END,
                    updated_at = ?4
              WHERE chapter_number = ?5",
            params![
                update.title,
                update.outline.is_some(),
                update.outline.as_ref().and_then(Option::as_deref),
                now(),
                chapter_number,
            ],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("chapter", chapter_number));
        }
        Ok(())
    }

    /// Create a scene, or resolve to the existing scene at the same position.
    ///
    /// Retrying returns the same id and keeps the stored fields.
    ///
    /// # Errors
    /// Returns [`StorageError::Integrity`] if the chapter does not exist.
    pub fn create_scene(&self, chapter_number: u32, scene_number: u32, input: &SceneInput) -> Result<i64> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction()?;
        let chapter_id = Self::chapter_id(&tx, chapter_number)?;
        let words = input.content.as_deref().map_or(0, word_count);
        let (id, inserted) = insert_or_fetch(
            &tx,
            "INSERT INTO scenes
               (chapter_id, scene_number, description, content, scene_type, word_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(chapter_id, scene_number) DO NOTHING",
            params![
                chapter_id,
                scene_number,
                input.description,
                input.content,
                input.scene_type,
                words,
                now(),
            ],
            "SELECT id FROM scenes WHERE chapter_id = ?1 AND scene_number = ?2",
            params![chapter_id, scene_number],
        )?;
        tx.commit()?;
        if !inserted {
            tracing::debug!(chapter_number, scene_number, id, "Scene exists, reusing row");
        }
        Ok(id)
    }

    /// Get scene by ID.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_scene(&self, id: i64) -> Result<Option<Scene>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("{SCENE_SELECT} WHERE s.id = ?1");
        Ok(conn.query_row(&sql, [id], row_to_scene).optional()?)
    }

    /// Get scene by its story position.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_scene_by_number(&self, chapter_number: u32, scene_number: u32) -> Result<Option<Scene>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("{SCENE_SELECT} WHERE c.chapter_number = ?1 AND s.scene_number = ?2");
        Ok(conn.query_row(&sql, params![chapter_number, scene_number], row_to_scene).optional()?)
    }

    /// Scenes of one chapter ordered by scene number.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_scenes(&self, chapter_number: u32) -> Result<Vec<Scene>> {
        let conn = get_conn(&self.pool)?;
        let sql = format!("{SCENE_SELECT} WHERE c.chapter_number = ?1 ORDER BY s.scene_number");
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt.query_map([chapter_number], row_to_scene)?.collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Apply a partial update to a scene. Position and links are unchanged.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the scene does not exist.
    pub fn update_scene(&self, id: i64, update: &SceneUpdate) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let content = update.content.as_ref().and_then(Option::as_deref);
        let affected = conn.execute(
            "UPDATE scenes
                SET description = CASE WHEN ?1 THEN ?2 ELSE description END,
                    scene_type = CASE WHEN ?3 THEN ?4 ELSE scene_type END,
                    content = CASE WHEN ?5 THEN ?6 ELSE content END,
                    word_count = CASE WHEN ?5 THEN ?7 ELSE word_count END,
                    audio_markup = CASE WHEN ?8 THEN ?9 ELSE audio_markup END,
                    updated_at = ?10
              WHERE id = ?11",
            params![
                update.description.is_some(),
                update.description.as_ref().and_then(Option::as_deref),
                update.scene_type.is_some(),
                update.scene_type.as_ref().and_then(Option::as_deref),
                update.content.is_some(),
                content,
                content.map_or(0, word_count),
                update.audio_markup.is_some(),
                update.audio_markup.as_ref().and_then(Option::as_deref),
                now(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("scene", id));
        }
        Ok(())
    }

    /// Replace a scene's prose. Position and links are unchanged.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the scene does not exist.
    pub fn update_scene_content(&self, id: i64, content: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE scenes SET content = ?1, word_count = ?2, updated_at = ?3 WHERE id = ?4",
            params![content, word_count(content), now(), id],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("scene", id));
        }
        tracing::debug!(scene_id = id, words = word_count(content), "Scene content updated");
        Ok(())
    }

    /// Replace a scene's audio markup.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the scene does not exist.
    pub fn update_scene_audio_markup(&self, id: i64, markup: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE scenes SET audio_markup = ?1, updated_at = ?2 WHERE id = ?3",
            params![markup, now(), id],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("scene", id));
        }
        Ok(())
    }
}

pub(crate) fn row_to_chapter(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chapter> {
    Ok(Chapter {
        id: row.get(0)?,
        chapter_number: row.get(1)?,
        title: row.get(2)?,
        outline: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub(crate) fn row_to_scene(row: &rusqlite::Row<'_>) -> rusqlite::Result<Scene> {
    Ok(Scene {
        id: row.get(0)?,
        chapter_id: row.get(1)?,
        chapter_number: row.get(2)?,
        scene_number: row.get(3)?,
        description: row.get(4)?,
        content: row.get(5)?,
        audio_markup: row.get(6)?,
        scene_type: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
