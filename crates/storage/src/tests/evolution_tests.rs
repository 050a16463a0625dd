use serde_json::json;
use storyvault_core::{EntityKind, NewEntityChange};

use super::{add_character, add_scene, create_test_storage};
use crate::{content_hash, StorageError};

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_evolution_is_ordered_by_story_position() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let chapter_two = add_scene(&storage, 2, 1);
    let chapter_one_late = add_scene(&storage, 1, 5);
    let chapter_one_early = add_scene(&storage, 1, 2);

    for (scene, change) in [
        (chapter_two, "scarred"),
        (chapter_one_late, "grieving"),
        (chapter_one_early, "hopeful"),
    ] {
        storage
            .record_change(
                &NewEntityChange::new(EntityKind::Character, hero, scene, "mood", change)
                    .values(None, Some(json!({ "mood": change }))),
            )
            .unwrap();
    }

    let history = storage.get_evolution(EntityKind::Character, hero).unwrap();
    let order: Vec<&str> = history.iter().map(|c| c.description.as_str()).collect();
    assert_eq!(order, ["hopeful", "grieving", "scarred"]);
    assert_eq!(history[0].new_value, Some(json!({ "mood": "hopeful" })));
    assert!(storage.get_evolution(EntityKind::Location, hero).unwrap().is_empty());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_same_scene_changes_keep_insertion_order() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let scene = add_scene(&storage, 1, 1);

    let first = storage.record_change(&NewEntityChange::new(EntityKind::Character, hero, scene, "a", "first")).unwrap();
    let second = storage.record_change(&NewEntityChange::new(EntityKind::Character, hero, scene, "b", "second")).unwrap();

    assert!(first < second);
    let history = storage.get_evolution(EntityKind::Character, hero).unwrap();
    assert_eq!(history[0].id, first);
    assert_eq!(history[1].id, second);
}

#[test]
fn test_change_without_scene_is_integrity_error() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let result = storage.record_change(&NewEntityChange::new(EntityKind::Character, hero, 77, "x", "y"));
    assert!(matches!(result, Err(StorageError::Integrity(_))));
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_register_content_rejects_exact_duplicates_only() {
    let (storage, _dir) = create_test_storage();
    let line = "The wind carried the smell of rain.";

    assert!(storage.register_content("sentence", line, Some(1), Some(1)).unwrap());
    assert!(!storage.register_content("sentence", line, Some(3), Some(2)).unwrap());
    // Different type, same text: stored separately.
    assert!(storage.register_content("opening", line, None, None).unwrap());
    // Not normalized: whitespace and case differences are distinct content.
    assert!(storage.register_content("sentence", "the wind carried the smell of rain.", None, None).unwrap());

    assert!(storage.check_content_exists("sentence", line).unwrap());
    assert!(!storage.check_content_exists("sentence", "Unseen").unwrap());

    let entries = storage.list_registered_content("sentence").unwrap();
    assert_eq!(entries.len(), 2);
    // Rejected duplicate did not move the original.
    assert_eq!(entries[0].chapter_number, Some(1));
    assert_eq!(entries[0].content_hash, content_hash(line));
}

#[test]
fn test_content_hash_is_sha256_hex() {
    assert_eq!(
        content_hash(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(content_hash("abc").len(), 64);
}
