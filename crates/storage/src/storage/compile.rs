use std::fmt::Write as _;

use super::Storage;
use crate::error::Result;

impl Storage {
    /// Render the whole story as plain text.
    ///
    /// `# {title}`, then per chapter `## Chapter {n}: {title}` followed by each
    /// scene's prose in order, blocks separated by blank lines. Scenes with no
    /// content are skipped.
    ///
    /// # Errors
    /// Returns [`crate::StorageError::NotConfigured`] on an unconfigured store.
    pub fn compile_story(&self) -> Result<String> {
        let config = self.get_story_config()?;
        let mut out = format!("# {}\n", config.settings.title);

        for chapter in self.list_chapters()? {
            let _ = write!(out, "\n## Chapter {}: {}\n", chapter.chapter_number, chapter.title);
            for scene in self.list_scenes(chapter.chapter_number)? {
                match scene.content.as_deref().map(str::trim) {
                    Some(text) if !text.is_empty() => {
                        let _ = write!(out, "\n{text}\n");
                    },
                    _ => tracing::warn!(
                        chapter = chapter.chapter_number,
                        scene = scene.scene_number,
                        "Scene has no content, skipping"
                    ),
                }
            }
        }
        Ok(out)
    }
}
