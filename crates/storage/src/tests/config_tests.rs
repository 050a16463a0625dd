use storyvault_core::{StoryConfigUpdate, StorySettings};

use super::{create_configured_storage, create_test_storage};
use crate::StorageError;

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_empty_store_is_not_configured() {
    let (storage, _dir) = create_test_storage();

    assert!(!storage.has_story_config().unwrap());
    let err = storage.get_story_config().unwrap_err();
    assert!(matches!(err, StorageError::NotConfigured));
    assert!(err.is_fatal());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_initialize_is_idempotent_and_keeps_first_values() {
    let (storage, _dir) = create_test_storage();

    let first = storage.initialize_story_config(&StorySettings::new("A", "fantasy", "epic")).unwrap();
    let second = storage.initialize_story_config(&StorySettings::new("B", "noir", "bleak")).unwrap();

    assert!(first);
    assert!(!second);
    let config = storage.get_story_config().unwrap();
    assert_eq!(config.settings.title, "A");
    assert_eq!(config.settings.language, "English");
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_update_touches_only_patched_fields() {
    let (storage, _dir) = create_configured_storage();

    let updated = storage
        .update_story_config(&StoryConfigUpdate {
            outline: Some(Some("1. Departure\n2. Return".to_owned())),
            target_chapters: Some(Some(12)),
            ..StoryConfigUpdate::default()
        })
        .unwrap();

    assert_eq!(updated.settings.title, "The Long Road");
    assert_eq!(updated.settings.genre, "fantasy");
    assert_eq!(updated.settings.outline.as_deref(), Some("1. Departure\n2. Return"));
    assert_eq!(updated.settings.target_chapters, Some(12));

    // Some(None) clears an optional column.
    let cleared = storage
        .update_story_config(&StoryConfigUpdate {
            target_chapters: Some(None),
            ..StoryConfigUpdate::default()
        })
        .unwrap();
    assert_eq!(cleared.settings.target_chapters, None);
    assert!(cleared.settings.outline.is_some());
}

#[test]
fn test_update_without_config_fails() {
    let (storage, _dir) = create_test_storage();
    let result = storage.update_story_config(&StoryConfigUpdate::default());
    assert!(matches!(result, Err(StorageError::NotConfigured)));
}
