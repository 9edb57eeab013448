//! Error types for loading, building and assembling a storybook set.

use std::path::PathBuf;
use thiserror::Error;

use story_rules::CharacterCode;

use crate::content_store::RecordKind;

/// Errors raised while loading records from disk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to convert {path}: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} record '{name}' is defined twice ({first} and {second})")]
    DuplicateRecord {
        kind: RecordKind,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Fatal errors raised while building the graph model.
///
/// No partial graph is usable after any of these.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unresolved reference: {kind} '{name}' (referenced by {referenced_by})")]
    UnresolvedReference {
        kind: RecordKind,
        name: String,
        referenced_by: String,
    },

    #[error("malformed {kind} record '{name}': {reason}")]
    Malformed {
        kind: RecordKind,
        name: String,
        reason: String,
    },

    #[error("character '{code}' lists {found} story entries, expected {expected}")]
    InvalidStoryLength {
        code: CharacterCode,
        found: usize,
        expected: usize,
    },

    #[error("character '{0}' is listed more than once")]
    DuplicateCharacter(CharacterCode),

    #[error("the world configuration names no characters")]
    NoCharacters,
}

/// Errors raised by the story assembler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("unknown character '{0}'")]
    UnknownCharacter(String),
}
