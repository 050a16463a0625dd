#![expect(clippy::unwrap_used, reason = "test code")]

use std::collections::BTreeMap;

use serde_json::json;
use storyvault_core::{
    ChapterDraft, CharacterDraft, CharacterInput, EntityKind, Importance, Involvement, LocationDraft,
    PlotThreadDraft, RelationshipDraft, SceneDraft, StorySettings, ThreadStatus, WorkingState,
    WorldValue,
};
use storyvault_service::{ServiceError, StateAdapter};
use storyvault_storage::{Storage, StorageError};
use tempfile::tempdir;

fn example_state() -> WorkingState {
    let mut state = WorkingState::new(StorySettings::new("The Long Road", "fantasy", "epic"));
    state.characters.insert("hero".to_owned(), CharacterDraft::new("Arin", "protagonist"));
    state.characters.insert("mentor".to_owned(), CharacterDraft::new("Veyra", "mentor"));
    assert!(state.relate("hero", "mentor", RelationshipDraft::new("mentor-student")));

    let mut chapter = ChapterDraft::new("Departure");
    let mut scene = SceneDraft { description: Some("They meet".to_owned()), ..SceneDraft::default() };
    scene.characters.insert("hero".to_owned(), Involvement::Present);
    scene.characters.insert("mentor".to_owned(), Involvement::Present);
    chapter.scenes.insert(1, scene);
    state.chapters.insert(1, chapter);
    state
}

#[test]
fn test_resume_after_crash_restores_state() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("story.db");
    let state = example_state();

    {
        let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
        adapter.sync(&state).unwrap();
        // Adapter and store dropped here without any shutdown step.
    }

    let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
    let loaded = adapter.load().unwrap();

    assert_eq!(loaded.config.title, "The Long Road");
    assert_eq!(loaded.config.genre, "fantasy");
    assert_eq!(adapter.storage().list_relationships().unwrap().len(), 1);
    assert!(loaded.characters.contains_key("hero"));
    assert!(loaded.characters.contains_key("mentor"));
    assert_eq!(loaded.characters["hero"].relationships["mentor"].relationship_type, "mentor-student");
    assert_eq!(loaded.characters["mentor"].relationships["hero"].relationship_type, "mentor-student");
    let scene = &loaded.chapters[&1].scenes[&1];
    assert_eq!(scene.characters.get("hero"), Some(&Involvement::Present));
    assert_eq!(scene.characters.get("mentor"), Some(&Involvement::Present));
    assert!(loaded.same_story_as(&state));
}

#[test]
fn test_resync_is_idempotent() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());
    let state = example_state();

    let first = adapter.sync(&state).unwrap();
    let second = adapter.sync(&state).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.relationships, 1);
    let stats = adapter.storage().get_stats().unwrap();
    assert_eq!(stats.characters, 2);
    assert_eq!(stats.relationships, 1);
    assert_eq!(stats.scenes, 1);
    assert_eq!(adapter.load().unwrap(), state);
}

#[test]
fn test_full_snapshot_round_trips() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());
    let mut state = example_state();
    state.config.outline = Some("1. Departure".to_owned());
    state.config.target_chapters = Some(10);
    if let Some(hero) = state.characters.get_mut("hero") {
        hero.backstory = Some("Raised on a farm".to_owned());
        hero.personality.traits = vec!["stubborn".to_owned()];
    }
    // Child sorts before its parent.
    state.locations.insert(
        "a-tavern".to_owned(),
        LocationDraft {
            name: "The Gull".to_owned(),
            description: None,
            parent: Some("z-city".to_owned()),
            location_type: Some("tavern".to_owned()),
            properties: BTreeMap::from([("rooms".to_owned(), json!(6))]),
        },
    );
    state.locations.insert(
        "z-city".to_owned(),
        LocationDraft {
            name: "Harrowgate".to_owned(),
            description: Some("Port city".to_owned()),
            parent: None,
            location_type: None,
            properties: BTreeMap::new(),
        },
    );
    state
        .world
        .entry("magic".to_owned())
        .or_default()
        .insert("cost".to_owned(), WorldValue::text("blood"));
    state.plot_threads.insert(
        "quest".to_owned(),
        PlotThreadDraft {
            description: "Find the relic".to_owned(),
            thread_type: Some("main".to_owned()),
            importance: Importance::Major,
            status: ThreadStatus::Developing,
        },
    );
    if let Some(scene) = state.scene_mut(1, 1) {
        scene.content = Some("They met at dawn.".to_owned());
        scene.audio_markup = Some("<speak>They met at dawn.</speak>".to_owned());
        scene.locations.insert("a-tavern".to_owned(), Involvement::Present);
    }
    state.scratch.insert("retry".to_owned(), json!(2));

    adapter.sync(&state).unwrap();
    let loaded = adapter.load().unwrap();

    assert!(loaded.scratch.is_empty());
    assert!(loaded.same_story_as(&state));
    assert_eq!(loaded.locations["a-tavern"].parent.as_deref(), Some("z-city"));
}

#[test]
fn test_sync_keeps_status_advanced_by_pipeline() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());
    let mut state = example_state();
    state.plot_threads.insert(
        "quest".to_owned(),
        PlotThreadDraft {
            description: "Find the relic".to_owned(),
            thread_type: None,
            importance: Importance::Major,
            status: ThreadStatus::Introduced,
        },
    );
    adapter.sync(&state).unwrap();

    let storage = adapter.storage();
    let thread = storage.get_plot_thread_by_name("quest").unwrap().unwrap();
    let scene = storage.get_scene_by_number(1, 1).unwrap().unwrap();
    storage.add_plot_thread_development(thread.id, scene.id, "setup", "A map").unwrap();

    // The snapshot still says introduced; the store is ahead and wins.
    adapter.sync(&state).unwrap();

    let loaded = adapter.load().unwrap();
    assert_eq!(loaded.plot_threads["quest"].status, ThreadStatus::Developing);
}

#[test]
fn test_unknown_version_is_rejected() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());
    let mut state = example_state();
    state.version = 99;

    let err = adapter.sync(&state).unwrap_err();

    assert!(matches!(err, ServiceError::UnsupportedVersion { found: 99, .. }));
    assert!(err.is_fatal());
    assert!(!adapter.storage().has_story_config().unwrap());
}

#[test]
fn test_load_from_empty_store_is_not_configured() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());

    let err = adapter.load().unwrap_err();

    assert!(matches!(err, ServiceError::Storage(StorageError::NotConfigured)));
}

#[test]
fn test_dangling_scene_link_is_skipped() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());
    let mut state = example_state();
    if let Some(scene) = state.scene_mut(1, 1) {
        scene.characters.insert("stranger".to_owned(), Involvement::Mentioned);
    }

    let report = adapter.sync(&state).unwrap();

    assert_eq!(report.skipped_links, 1);
    assert_eq!(report.scene_links, 2);
}

#[test]
fn test_sync_clears_fields_dropped_from_snapshot() {
    let dir = tempdir().unwrap();
    let adapter = StateAdapter::new(Storage::new(&dir.path().join("story.db")).unwrap());
    let mut drafted = example_state();
    if let Some(hero) = drafted.characters.get_mut("hero") {
        hero.backstory = Some("Raised on a farm".to_owned());
    }
    if let Some(chapter) = drafted.chapters.get_mut(&1) {
        chapter.outline = Some("They leave at dawn".to_owned());
    }
    if let Some(scene) = drafted.scene_mut(1, 1) {
        scene.content = Some("Draft prose.".to_owned());
        scene.audio_markup = Some("<speak/>".to_owned());
    }
    adapter.sync(&drafted).unwrap();

    let mut revised = example_state();
    if let Some(scene) = revised.scene_mut(1, 1) {
        scene.description = None;
    }
    adapter.sync(&revised).unwrap();

    let loaded = adapter.load().unwrap();
    assert!(loaded.characters["hero"].backstory.is_none());
    assert!(loaded.chapters[&1].outline.is_none());
    let scene = &loaded.chapters[&1].scenes[&1];
    assert!(scene.description.is_none());
    assert!(scene.content.is_none());
    assert!(scene.audio_markup.is_none());
    assert!(loaded.same_story_as(&revised));
    assert_eq!(adapter.storage().get_stats().unwrap().total_words, 0);
}

#[test]
fn test_sync_completes_partially_persisted_store() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("story.db");
    let state = example_state();

    {
        // A sync that died after the config, one character and an empty chapter.
        let storage = Storage::new(&db_path).unwrap();
        storage.initialize_story_config(&StorySettings::new("Working Title", "fantasy", "grim")).unwrap();
        storage
            .create_character(&CharacterInput::new("hero", "Arin of Nowhere", "extra").backstory("stale"))
            .unwrap();
        storage.create_chapter(1, "Untitled", Some("stale outline")).unwrap();
    }

    let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
    adapter.sync(&state).unwrap();

    let stats = adapter.storage().get_stats().unwrap();
    assert_eq!(stats.characters, 2);
    assert_eq!(stats.relationships, 1);
    assert_eq!(stats.chapters, 1);
    assert_eq!(stats.scenes, 1);
    let loaded = adapter.load().unwrap();
    assert_eq!(loaded.config.tone, "epic");
    assert_eq!(loaded.characters["hero"].name, "Arin");
    assert!(loaded.characters["hero"].backstory.is_none());
    assert!(loaded.same_story_as(&state));
}

#[test]
fn test_load_fails_on_corrupt_row() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("story.db");
    {
        let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
        adapter.sync(&example_state()).unwrap();
    }

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute("UPDATE characters SET personality = 'not json' WHERE identifier = 'mentor'", [])
        .unwrap();
    drop(conn);

    let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
    let err = adapter.load().unwrap_err();

    assert!(matches!(err, ServiceError::Storage(StorageError::DataCorruption { .. })));
    assert!(err.is_fatal());
}

#[test]
fn test_load_fails_on_dangling_scene_link() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("story.db");
    {
        let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
        adapter.sync(&example_state()).unwrap();
    }

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "INSERT INTO scene_entities (scene_id, entity_type, entity_id, involvement)
         SELECT id, 'character', 999, 'present' FROM scenes",
        [],
    )
    .unwrap();
    drop(conn);

    let adapter = StateAdapter::new(Storage::new(&db_path).unwrap());
    let err = adapter.load().unwrap_err();

    assert!(matches!(err, ServiceError::DanglingReference { kind: EntityKind::Character, id: 999 }));
    assert!(err.is_fatal());
}
