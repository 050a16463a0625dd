use storyvault_core::{
    CharacterStateInput, EntityKind, Importance, Involvement, LocationInput, PlotThreadInput,
    WorldValue,
};

use super::{add_character, add_scene, create_test_storage};
use crate::StorageError;

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_relinking_replaces_involvement() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let scene = add_scene(&storage, 1, 1);

    storage.add_entity_to_scene(scene, EntityKind::Character, hero, Involvement::Mentioned).unwrap();
    storage.add_entity_to_scene(scene, EntityKind::Character, hero, Involvement::Present).unwrap();

    let entities = storage.get_entities_in_scene(scene).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].involvement, Involvement::Present);
    assert_eq!(entities[0].name.as_deref(), Some("HERO"));
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_unlinkable_or_missing_entities_are_rejected() {
    let (storage, _dir) = create_test_storage();
    let scene = add_scene(&storage, 1, 1);
    let thread = storage
        .create_plot_thread(&PlotThreadInput::new("quest", "Find the relic", Importance::Major))
        .unwrap();

    let thread_link = storage.add_entity_to_scene(scene, EntityKind::PlotThread, thread, Involvement::Present);
    let ghost_link = storage.add_entity_to_scene(scene, EntityKind::Character, 31, Involvement::Present);

    assert!(matches!(thread_link, Err(StorageError::Integrity(_))));
    assert!(matches!(ghost_link, Err(StorageError::Integrity(_))));
    assert!(storage.get_entities_in_scene(scene).unwrap().is_empty());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_scene_context_gathers_linked_rows() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let mentor = add_character(&storage, "mentor");
    let inn = storage.create_location(&LocationInput::new("inn", "The Inn")).unwrap();
    let rule = storage.create_world_element("magic", "cost", &WorldValue::text("blood")).unwrap();
    let thread = storage
        .create_plot_thread(&PlotThreadInput::new("quest", "Find the relic", Importance::Major))
        .unwrap();
    let opening = add_scene(&storage, 1, 1);
    let scene = add_scene(&storage, 1, 2);

    storage.add_entity_to_scene(scene, EntityKind::Character, hero, Involvement::Present).unwrap();
    storage.add_entity_to_scene(scene, EntityKind::Character, mentor, Involvement::Mentioned).unwrap();
    storage.add_entity_to_scene(scene, EntityKind::Location, inn, Involvement::Present).unwrap();
    storage.add_entity_to_scene(scene, EntityKind::WorldElement, rule, Involvement::Affected).unwrap();
    storage
        .update_character_state(
            hero,
            scene,
            &CharacterStateInput { emotional_state: Some("wary".to_owned()), ..CharacterStateInput::default() },
        )
        .unwrap();
    storage.add_plot_thread_development(thread, scene, "clue", "A map is found").unwrap();

    let context = storage.get_scene_context(scene).unwrap();

    assert_eq!(context.scene.id, scene);
    assert_eq!(context.characters.len(), 2);
    let hero_entry = context.characters.iter().find(|c| c.character.id == hero).unwrap();
    assert_eq!(hero_entry.state.as_ref().unwrap().emotional_state.as_deref(), Some("wary"));
    let mentor_entry = context.characters.iter().find(|c| c.character.id == mentor).unwrap();
    assert_eq!(mentor_entry.involvement, Involvement::Mentioned);
    assert!(mentor_entry.state.is_none());
    assert_eq!(context.locations.len(), 1);
    assert_eq!(context.world_elements[0].1, Involvement::Affected);
    assert_eq!(context.previous_scene.map(|s| s.id), Some(opening));
    assert_eq!(context.developments.len(), 1);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_previous_scene_crosses_chapter_boundary() {
    let (storage, _dir) = create_test_storage();
    let last_of_first = add_scene(&storage, 1, 3);
    add_scene(&storage, 1, 1);
    let first_of_second = add_scene(&storage, 2, 1);

    let context = storage.get_scene_context(first_of_second).unwrap();
    assert_eq!(context.previous_scene.map(|s| s.id), Some(last_of_first));

    let opening = storage.get_scene_by_number(1, 1).unwrap().unwrap();
    assert!(storage.get_scene_context(opening.id).unwrap().previous_scene.is_none());
}

#[test]
fn test_context_for_missing_scene_is_not_found() {
    let (storage, _dir) = create_test_storage();
    assert!(matches!(storage.get_scene_context(5), Err(StorageError::NotFound { .. })));
}
