use std::path::Path;

use anyhow::{Result, anyhow};
use storyvault_core::{Character, CharacterAspect};
use storyvault_storage::Storage;

use super::emit_json;

pub(crate) fn run_stats(db_path: &Path) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let stats = storage.get_stats()?;
    emit_json(&stats, None)
}

pub(crate) fn run_threads(db_path: &Path) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let threads = storage.unresolved_plot_threads()?;
    emit_json(&threads, None)
}

pub(crate) fn run_journey(db_path: &Path, identifier: &str) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let character = find_character(&storage, identifier)?;
    match storage.character_journey(character.id)? {
        Some(journey) => emit_json(&journey, None),
        None => Err(anyhow!("Character not found: {identifier}")),
    }
}

pub(crate) fn run_affected(db_path: &Path, identifier: &str, aspect: CharacterAspect) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let character = find_character(&storage, identifier)?;
    let chapters = storage.chapters_affected_by_change(character.id, aspect)?;
    emit_json(&chapters, None)
}

fn find_character(storage: &Storage, identifier: &str) -> Result<Character> {
    storage
        .get_character_by_identifier(identifier)?
        .ok_or_else(|| anyhow!("Character not found: {identifier}"))
}
