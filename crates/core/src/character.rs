//! Characters, their per-scene state, knowledge and narrative promises.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Structured personality profile produced by character generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    pub traits: Vec<String>,
    pub strengths: Vec<String>,
    pub flaws: Vec<String>,
    pub fears: Vec<String>,
    pub desires: Vec<String>,
    pub values: Vec<String>,
    pub appearance: Option<String>,
    pub speech_style: Option<String>,
}

impl Personality {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Payload for creating a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInput {
    /// Stable human-readable key, unique per story (e.g. `"hero"`).
    pub identifier: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub backstory: Option<String>,
    #[serde(default)]
    pub personality: Personality,
}

impl CharacterInput {
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            role: role.into(),
            backstory: None,
            personality: Personality::default(),
        }
    }

    #[must_use]
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = Some(backstory.into());
        self
    }

    #[must_use]
    pub fn personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }
}

/// Stored character row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub role: String,
    pub backstory: Option<String>,
    pub personality: Personality,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial character update. `None` leaves the column untouched; `Some(None)`
/// clears the backstory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    pub role: Option<String>,
    pub backstory: Option<Option<String>>,
    pub personality: Option<Personality>,
}

/// Emotional and physical state of a character at one scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStateInput {
    pub emotional_state: Option<String>,
    pub physical_state: Option<String>,
    pub location_id: Option<i64>,
    pub notes: Option<String>,
}

/// Stored per-scene character state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
    pub id: i64,
    pub character_id: i64,
    pub scene_id: i64,
    pub emotional_state: Option<String>,
    pub physical_state: Option<String>,
    pub location_id: Option<i64>,
    pub notes: Option<String>,
}

/// Who may know a fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Secret,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Public => "public",
            Self::Secret => "secret",
        }
    }
}

impl FromStr for Visibility {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "secret" => Ok(Self::Secret),
            other => Err(CoreError::InvalidVisibility(other.to_owned())),
        }
    }
}

/// A fact a character has learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterKnowledge {
    pub id: i64,
    pub character_id: i64,
    pub fact: String,
    pub visibility: Visibility,
    pub learned_scene_id: Option<i64>,
    pub created_at: String,
}

/// A narrative obligation set up for a character (a Chekhov's gun, a vow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPromise {
    pub id: i64,
    pub character_id: i64,
    pub promise_type: String,
    pub description: String,
    pub introduced_chapter: u32,
    pub fulfilled: bool,
    pub fulfilled_scene_id: Option<i64>,
    pub created_at: String,
}

/// How far a character edit reaches into already-written chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeScope {
    /// Invalidates every chapter the character is linked to, with any involvement.
    Identity,
    /// Invalidates only chapters where the character is on stage.
    Surface,
}

/// Category of a retroactive character change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterAspect {
    Backstory,
    Personality,
    Motivation,
    Role,
    Name,
    Relationships,
    Appearance,
    Voice,
    Mannerisms,
}

impl CharacterAspect {
    pub const ALL_VARIANTS_STR: &'static str =
        "backstory|personality|motivation|role|name|relationships|appearance|voice|mannerisms";

    #[must_use]
    pub const fn scope(&self) -> ChangeScope {
        match *self {
            Self::Backstory
            | Self::Personality
            | Self::Motivation
            | Self::Role
            | Self::Name
            | Self::Relationships => ChangeScope::Identity,
            Self::Appearance | Self::Voice | Self::Mannerisms => ChangeScope::Surface,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Backstory => "backstory",
            Self::Personality => "personality",
            Self::Motivation => "motivation",
            Self::Role => "role",
            Self::Name => "name",
            Self::Relationships => "relationships",
            Self::Appearance => "appearance",
            Self::Voice => "voice",
            Self::Mannerisms => "mannerisms",
        }
    }
}

impl FromStr for CharacterAspect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backstory" => Ok(Self::Backstory),
            "personality" => Ok(Self::Personality),
            "motivation" => Ok(Self::Motivation),
            "role" => Ok(Self::Role),
            "name" => Ok(Self::Name),
            "relationships" | "relationship" => Ok(Self::Relationships),
            "appearance" => Ok(Self::Appearance),
            "voice" | "speech" => Ok(Self::Voice),
            "mannerisms" => Ok(Self::Mannerisms),
            other => Err(CoreError::InvalidCharacterAspect(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_scopes() {
        assert_eq!(CharacterAspect::Backstory.scope(), ChangeScope::Identity);
        assert_eq!(CharacterAspect::Name.scope(), ChangeScope::Identity);
        assert_eq!(CharacterAspect::Appearance.scope(), ChangeScope::Surface);
        assert_eq!(CharacterAspect::Voice.scope(), ChangeScope::Surface);
    }

    #[test]
    fn test_aspect_parse_aliases() {
        assert_eq!("Speech".parse::<CharacterAspect>(), Ok(CharacterAspect::Voice));
        assert_eq!("relationship".parse::<CharacterAspect>(), Ok(CharacterAspect::Relationships));
        assert!("haircut".parse::<CharacterAspect>().is_err());
    }

    #[test]
    fn test_personality_partial_json() {
        let p: Personality = serde_json::from_str(r#"{"traits":["brave"]}"#).unwrap();
        assert_eq!(p.traits, vec!["brave"]);
        assert!(p.flaws.is_empty());
        assert!(!p.is_empty());
        assert!(Personality::default().is_empty());
    }

    #[test]
    fn test_visibility_roundtrip_str() {
        for v in [Visibility::Public, Visibility::Secret] {
            assert_eq!(v.as_str().parse::<Visibility>(), Ok(v));
        }
    }
}
