//! Character definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CharacterCode, SpreadNumber};

/// A character definition as stored in the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterCode,
    pub name: String,

    /// Free-form descriptive attributes (age, appearance, temperament...).
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// One page reference per spread, in spread order.
    pub story: Vec<String>,
}

impl CharacterRecord {
    /// Create a record with an empty story.
    pub fn new(id: CharacterCode, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: BTreeMap::new(),
            story: Vec::new(),
        }
    }

    /// Set the story entries.
    pub fn with_story<I, S>(mut self, story: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.story = story.into_iter().map(Into::into).collect();
        self
    }

    /// Pair each story entry with its spread number.
    ///
    /// Entries beyond the last spread are dropped; callers check the length.
    pub fn spread_references(&self) -> Vec<SpreadReference> {
        self.story
            .iter()
            .zip(SpreadNumber::all())
            .map(|(page, spread)| SpreadReference {
                spread,
                page: page.clone(),
            })
            .collect()
    }
}

/// A (spread number, page record name) pair from a character's story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpreadReference {
    pub spread: SpreadNumber,
    pub page: String,
}
