use storyvault_core::RelationshipProperties;

use super::{add_character, create_test_storage};
use crate::StorageError;

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_pair_order_addresses_one_row() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let mentor = add_character(&storage, "mentor");

    // Written from the higher id first, then rewritten from the other side.
    let first = storage
        .upsert_relationship(mentor, hero, "mentor-student", None, &RelationshipProperties::default())
        .unwrap();
    let second = storage
        .upsert_relationship(hero, mentor, "rivals", Some("fell out"), &RelationshipProperties::default())
        .unwrap();

    assert_eq!(first, second);
    let rows = storage.list_relationships().unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].character1_id < rows[0].character2_id);
    assert_eq!(rows[0].relationship_type, "rivals");
    assert_eq!(storage.get_relationship(mentor, hero).unwrap(), storage.get_relationship(hero, mentor).unwrap());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn test_views_are_from_each_participants_side() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");
    let mentor = add_character(&storage, "mentor");
    let loner = add_character(&storage, "loner");
    let properties = RelationshipProperties {
        dynamics: Some("protective".to_owned()),
        conflicts: vec!["the lie".to_owned()],
        ..RelationshipProperties::default()
    };
    storage.upsert_relationship(hero, mentor, "mentor-student", None, &properties).unwrap();

    let from_hero = storage.get_relationships(hero).unwrap();
    let from_mentor = storage.get_relationships(mentor).unwrap();

    assert_eq!(from_hero.len(), 1);
    assert_eq!(from_hero[0].other_id, mentor);
    assert_eq!(from_hero[0].other_identifier, "mentor");
    assert_eq!(from_hero[0].properties, properties);
    assert_eq!(from_mentor[0].other_id, hero);
    assert_eq!(from_mentor[0].other_name, "HERO");
    assert!(storage.get_relationships(loner).unwrap().is_empty());
}

#[test]
fn test_self_relationship_is_rejected() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");

    let result = storage.upsert_relationship(hero, hero, "self", None, &RelationshipProperties::default());

    assert!(matches!(result, Err(StorageError::Integrity(_))));
}

#[test]
fn test_relationship_with_unknown_character_is_rejected() {
    let (storage, _dir) = create_test_storage();
    let hero = add_character(&storage, "hero");

    let result = storage.upsert_relationship(hero, 777, "ghost", None, &RelationshipProperties::default());

    assert!(matches!(result, Err(StorageError::Integrity(_))));
}
