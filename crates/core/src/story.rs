//! Story configuration singleton.

use serde::{Deserialize, Serialize};

/// Creative and structural parameters of the story being generated.
///
/// This is both the payload for initializing the configuration singleton and
/// the root section of [`crate::WorkingState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySettings {
    pub title: String,
    pub genre: String,
    pub tone: String,
    #[serde(default)]
    pub author_style: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub initial_idea: Option<String>,
    /// Full outline text, refined as the outline stage iterates.
    #[serde(default)]
    pub outline: Option<String>,
    #[serde(default)]
    pub narrative_structure: Option<String>,
    #[serde(default)]
    pub target_chapters: Option<u32>,
    #[serde(default)]
    pub target_scenes_per_chapter: Option<u32>,
    #[serde(default)]
    pub target_words_per_scene: Option<u32>,
}

fn default_language() -> String {
    "English".to_owned()
}

impl StorySettings {
    #[must_use]
    pub fn new(title: impl Into<String>, genre: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genre: genre.into(),
            tone: tone.into(),
            author_style: None,
            language: default_language(),
            initial_idea: None,
            outline: None,
            narrative_structure: None,
            target_chapters: None,
            target_scenes_per_chapter: None,
            target_words_per_scene: None,
        }
    }

    /// Patch that rewrites every field to the values in `self`.
    #[must_use]
    pub fn to_update(&self) -> StoryConfigUpdate {
        StoryConfigUpdate {
            title: Some(self.title.clone()),
            genre: Some(self.genre.clone()),
            tone: Some(self.tone.clone()),
            author_style: Some(self.author_style.clone()),
            language: Some(self.language.clone()),
            initial_idea: Some(self.initial_idea.clone()),
            outline: Some(self.outline.clone()),
            narrative_structure: Some(self.narrative_structure.clone()),
            target_chapters: Some(self.target_chapters),
            target_scenes_per_chapter: Some(self.target_scenes_per_chapter),
            target_words_per_scene: Some(self.target_words_per_scene),
        }
    }
}

/// Stored configuration singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryConfig {
    #[serde(flatten)]
    pub settings: StorySettings,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update of the configuration singleton.
///
/// Outer `None` leaves a field untouched; for optional columns the inner
/// `Option` is written as-is, so `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryConfigUpdate {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub tone: Option<String>,
    pub author_style: Option<Option<String>>,
    pub language: Option<String>,
    pub initial_idea: Option<Option<String>>,
    pub outline: Option<Option<String>>,
    pub narrative_structure: Option<Option<String>>,
    pub target_chapters: Option<Option<u32>>,
    pub target_scenes_per_chapter: Option<Option<u32>>,
    pub target_words_per_scene: Option<Option<u32>>,
}

impl StoryConfigUpdate {
    /// Applies the patch to `settings` in place.
    pub fn apply_to(&self, settings: &mut StorySettings) {
        if let Some(v) = &self.title {
            settings.title.clone_from(v);
        }
        if let Some(v) = &self.genre {
            settings.genre.clone_from(v);
        }
        if let Some(v) = &self.tone {
            settings.tone.clone_from(v);
        }
        if let Some(v) = &self.author_style {
            settings.author_style.clone_from(v);
        }
        if let Some(v) = &self.language {
            settings.language.clone_from(v);
        }
        if let Some(v) = &self.initial_idea {
            settings.initial_idea.clone_from(v);
        }
        if let Some(v) = &self.outline {
            settings.outline.clone_from(v);
        }
        if let Some(v) = &self.narrative_structure {
            settings.narrative_structure.clone_from(v);
        }
        if let Some(v) = self.target_chapters {
            settings.target_chapters = v;
        }
        if let Some(v) = self.target_scenes_per_chapter {
            settings.target_scenes_per_chapter = v;
        }
        if let Some(v) = self.target_words_per_scene {
            settings.target_words_per_scene = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut settings = StorySettings::new("The Long Road", "fantasy", "epic");
        settings.outline = Some("Act one".to_owned());

        let update = StoryConfigUpdate {
            tone: Some("grim".to_owned()),
            target_chapters: Some(Some(12)),
            ..StoryConfigUpdate::default()
        };
        update.apply_to(&mut settings);

        assert_eq!(settings.tone, "grim");
        assert_eq!(settings.genre, "fantasy");
        assert_eq!(settings.outline.as_deref(), Some("Act one"));
        assert_eq!(settings.target_chapters, Some(12));
    }

    #[test]
    fn test_update_can_clear_optional_field() {
        let mut settings = StorySettings::new("t", "g", "x");
        settings.outline = Some("draft".to_owned());
        let update = StoryConfigUpdate { outline: Some(None), ..StoryConfigUpdate::default() };
        update.apply_to(&mut settings);
        assert!(settings.outline.is_none());
    }

    #[test]
    fn test_settings_deserialize_defaults_language() {
        let settings: StorySettings =
            serde_json::from_str(r#"{"title":"t","genre":"g","tone":"x"}"#).unwrap();
        assert_eq!(settings.language, "English");
        assert!(settings.target_chapters.is_none());
    }
}
