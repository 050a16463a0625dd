//! Test utilities and module declarations for storage tests.

use storyvault_core::{CharacterInput, SceneInput, StorySettings};
use tempfile::TempDir;

use crate::Storage;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

/// Store with a story configuration already initialized.
#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_configured_storage() -> (Storage, TempDir) {
    let (storage, dir) = create_test_storage();
    storage
        .initialize_story_config(&StorySettings::new("The Long Road", "fantasy", "epic"))
        .unwrap();
    (storage, dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn add_character(storage: &Storage, identifier: &str) -> i64 {
    storage
        .create_character(&CharacterInput::new(identifier, identifier.to_uppercase(), "supporting"))
        .unwrap()
}

/// Creates chapter `chapter` (if needed) and scene `scene` inside it.
#[expect(clippy::unwrap_used, reason = "test code")]
pub fn add_scene(storage: &Storage, chapter: u32, scene: u32) -> i64 {
    storage.create_chapter(chapter, &format!("Chapter {chapter}"), None).unwrap();
    storage
        .create_scene(chapter, scene, &SceneInput::described(format!("{chapter}.{scene}")))
        .unwrap()
}

mod config_tests;
mod evolution_tests;
mod relationship_tests;
mod scene_entity_tests;
