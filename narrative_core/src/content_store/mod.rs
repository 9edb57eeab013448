//! Content Store - named raw records, read-only from the core's point of view.
//!
//! Records are kept format-neutral as `serde_json::Value`; the graph builder
//! deserializes them into the typed records of `story_rules`.

mod directory;

pub use directory::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record as stored, before typing.
pub type RawRecord = serde_json::Value;

/// The kinds of record a storybook set is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    World,
    Character,
    Page,
    Node,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::World => "world",
            RecordKind::Character => "character",
            RecordKind::Page => "page",
            RecordKind::Node => "node",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup service over named records.
pub trait ContentStore {
    /// Get a record by kind and name.
    fn get(&self, kind: RecordKind, name: &str) -> Option<&RawRecord>;

    /// All record names of a kind, sorted.
    fn names(&self, kind: RecordKind) -> Vec<&str>;

    /// Check if a record exists.
    fn contains(&self, kind: RecordKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }
}

/// A content store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: BTreeMap<RecordKind, BTreeMap<String, RawRecord>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, returning the previous one.
    pub fn insert(
        &mut self,
        kind: RecordKind,
        name: impl Into<String>,
        record: RawRecord,
    ) -> Option<RawRecord> {
        self.records
            .entry(kind)
            .or_default()
            .insert(name.into(), record)
    }

    /// Serialize a typed record and insert it.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        kind: RecordKind,
        name: impl Into<String>,
        record: &T,
    ) -> Result<Option<RawRecord>, serde_json::Error> {
        let value = serde_json::to_value(record)?;
        Ok(self.insert(kind, name, value))
    }

    /// Remove a record.
    pub fn remove(&mut self, kind: RecordKind, name: &str) -> Option<RawRecord> {
        self.records.get_mut(&kind)?.remove(name)
    }

    /// Number of records of a kind.
    pub fn count(&self, kind: RecordKind) -> usize {
        self.records.get(&kind).map_or(0, BTreeMap::len)
    }
}

impl ContentStore for InMemoryStore {
    fn get(&self, kind: RecordKind, name: &str) -> Option<&RawRecord> {
        self.records.get(&kind)?.get(name)
    }

    fn names(&self, kind: RecordKind) -> Vec<&str> {
        self.records
            .get(&kind)
            .map(|records| records.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
