use std::path::Path;

use anyhow::{Context as _, Result};
use storyvault_core::{StorySettings, WorkingState};
use storyvault_service::StateAdapter;
use storyvault_storage::Storage;

use super::{emit_json, emit_text};

pub(crate) fn run_init(
    db_path: &Path,
    title: String,
    genre: String,
    tone: String,
    language: Option<String>,
) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let mut settings = StorySettings::new(title, genre, tone);
    if let Some(language) = language {
        settings.language = language;
    }
    if storage.initialize_story_config(&settings)? {
        println!("Initialized story \"{}\" at {}", settings.title, db_path.display());
    } else {
        let existing = storage.get_story_config()?;
        println!("Story \"{}\" already initialized, left unchanged", existing.settings.title);
    }
    Ok(())
}

pub(crate) fn run_import(db_path: &Path, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let state: WorkingState = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid working state", file.display()))?;
    let adapter = StateAdapter::new(Storage::new(db_path)?);
    let report = adapter.sync(&state)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_export(db_path: &Path, output: Option<&Path>) -> Result<()> {
    let adapter = StateAdapter::new(Storage::new(db_path)?);
    let state = adapter.load()?;
    emit_json(&state, output)
}

pub(crate) fn run_compile(db_path: &Path, output: Option<&Path>) -> Result<()> {
    let storage = Storage::new(db_path)?;
    let text = storage.compile_story()?;
    emit_text(&text, output)
}
