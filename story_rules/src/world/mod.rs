//! World configuration - the root record naming the characters of a set.

use serde::{Deserialize, Serialize};

use crate::entities::CharacterCode;

/// Record name of the world configuration in the content store.
pub const WORLD_RECORD: &str = "world";

/// An entry in the symbolic-element catalog (recurring motifs and objects).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicElement {
    pub name: String,
    #[serde(default)]
    pub meaning: String,
}

/// Root configuration of a storybook set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default)]
    pub title: String,

    /// Character codes in the set, in presentation order.
    pub characters: Vec<CharacterCode>,

    #[serde(default)]
    pub symbols: Vec<SymbolicElement>,
}

impl WorldConfig {
    /// Create a configuration for the given characters.
    pub fn new(characters: impl IntoIterator<Item = CharacterCode>) -> Self {
        Self {
            title: String::new(),
            characters: characters.into_iter().collect(),
            symbols: Vec::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a symbolic element to the catalog.
    pub fn with_symbol(mut self, name: impl Into<String>, meaning: impl Into<String>) -> Self {
        self.symbols.push(SymbolicElement {
            name: name.into(),
            meaning: meaning.into(),
        });
        self
    }

    /// Find a symbolic element by name (case-insensitive).
    pub fn symbol(&self, name: &str) -> Option<&SymbolicElement> {
        self.symbols
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
