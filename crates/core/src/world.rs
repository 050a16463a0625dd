//! Locations and worldbuilding elements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Open-ended key/value bag for genuinely schema-less worldbuilding data.
pub type PropertyMap = BTreeMap<String, serde_json::Value>;

/// Payload for creating a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl LocationInput {
    #[must_use]
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            description: None,
            parent_id: None,
            location_type: None,
            properties: PropertyMap::new(),
        }
    }
}

/// Stored location row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub location_type: Option<String>,
    pub properties: PropertyMap,
}

/// Value of a world element: free text or a structured map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum WorldValue {
    Text(String),
    Structured(PropertyMap),
}

impl WorldValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Stored world element, keyed by `(category, element_key)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldElement {
    pub id: i64,
    pub category: String,
    pub element_key: String,
    pub value: WorldValue,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_value_tagged_json() {
        let text = serde_json::to_string(&WorldValue::text("Ash plains")).unwrap();
        assert_eq!(text, r#"{"kind":"text","value":"Ash plains"}"#);

        let mut map = PropertyMap::new();
        map.insert("climate".to_owned(), serde_json::json!("arid"));
        let structured = WorldValue::Structured(map);
        let json = serde_json::to_string(&structured).unwrap();
        let back: WorldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, structured);
    }
}
