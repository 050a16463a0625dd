#![expect(clippy::unwrap_used, reason = "test code")]

use std::thread;

use storyvault_core::{CharacterInput, RelationshipProperties, SceneInput, StorySettings};
use storyvault_storage::Storage;
use tempfile::tempdir;

#[test]
fn test_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("story.db");

    {
        let storage = Storage::new(&db_path).unwrap();
        storage.initialize_story_config(&StorySettings::new("Ashes", "fantasy", "grim")).unwrap();
        let hero = storage.create_character(&CharacterInput::new("hero", "Arin", "protagonist")).unwrap();
        let mentor = storage.create_character(&CharacterInput::new("mentor", "Veyra", "mentor")).unwrap();
        storage
            .upsert_relationship(hero, mentor, "mentor-student", None, &RelationshipProperties::default())
            .unwrap();
        storage.create_chapter(1, "Embers", None).unwrap();
        storage.create_scene(1, 1, &SceneInput::described("Arrival")).unwrap();
        storage.register_content("opening", "It began with smoke.", Some(1), Some(1)).unwrap();
    }

    let reopened = Storage::new(&db_path).unwrap();
    assert_eq!(reopened.get_story_config().unwrap().settings.title, "Ashes");
    assert_eq!(reopened.list_characters().unwrap().len(), 2);
    assert_eq!(reopened.list_relationships().unwrap().len(), 1);
    assert!(reopened.get_scene_by_number(1, 1).unwrap().is_some());
    assert!(!reopened.register_content("opening", "It began with smoke.", None, None).unwrap());
}

#[test]
fn test_concurrent_creates_resolve_to_one_row() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(&dir.path().join("story.db")).unwrap();

    let ids: Vec<i64> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = storage.clone();
                s.spawn(move || {
                    storage
                        .create_character(&CharacterInput::new("hero", format!("Arin {i}"), "protagonist"))
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(ids.windows(2).all(|w| w[0] == w[1]), "all retries must resolve to one id: {ids:?}");
    assert_eq!(storage.list_characters().unwrap().len(), 1);
}
