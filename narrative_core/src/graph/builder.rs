//! Graph builder - turns raw store records into a `World`.

use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use story_rules::{
    normalize_reference, CharacterCode, CharacterRecord, NodeDefinition, PageRecord,
    SpreadNumber, WorldConfig, SPREAD_COUNT, WORLD_RECORD,
};

use super::{Character, NodeId, PageId, PageUse, World};
use crate::content_store::{ContentStore, RecordKind};
use crate::error::BuildError;

/// Builds the graph model from a content store.
///
/// The build is sequential: every reference is resolved, and every page is
/// interned exactly once, before the `World` is handed to any reader.
pub struct GraphBuilder<'s, S: ContentStore + ?Sized> {
    store: &'s S,
    pages: Vec<PageRecord>,
    page_index: BTreeMap<String, PageId>,
}

impl<'s, S: ContentStore + ?Sized> GraphBuilder<'s, S> {
    /// Create a builder reading from the given store.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            pages: Vec::new(),
            page_index: BTreeMap::new(),
        }
    }

    /// Build the world.
    ///
    /// Fails on any reference to a record absent from the store, on records
    /// that do not deserialize, and on structurally unusable character lists.
    /// Unreferenced page records are not an error here.
    pub fn build(mut self) -> Result<World, BuildError> {
        let store = self.store;
        let config: WorldConfig = self.load(RecordKind::World, WORLD_RECORD, "content store")?;
        if config.characters.is_empty() {
            return Err(BuildError::NoCharacters);
        }

        let mut characters = Vec::with_capacity(config.characters.len());
        let mut character_index = BTreeMap::new();
        for code in &config.characters {
            if character_index.insert(code.clone(), characters.len()).is_some() {
                return Err(BuildError::DuplicateCharacter(code.clone()));
            }
            characters.push(self.build_character(code)?);
        }

        let mut nodes = Vec::new();
        for name in store.names(RecordKind::Node) {
            let mut node: NodeDefinition = self.load(RecordKind::Node, name, "content store")?;
            node.name = name.to_string();
            for participant in &node.participants {
                if !character_index.contains_key(participant) {
                    return Err(BuildError::UnresolvedReference {
                        kind: RecordKind::Character,
                        name: participant.to_string(),
                        referenced_by: format!("node '{}'", name),
                    });
                }
            }
            if let Some(page) = node.meeting_page() {
                let page = page.to_string();
                self.intern_page(&page, &format!("node '{}'", name))?;
            }
            nodes.push(node);
        }

        let mut node_claims: BTreeMap<(CharacterCode, SpreadNumber), Vec<NodeId>> =
            BTreeMap::new();
        for (index, node) in nodes.iter().enumerate() {
            let participants: BTreeSet<&CharacterCode> = node.participants.iter().collect();
            for participant in participants {
                node_claims
                    .entry((participant.clone(), node.spread))
                    .or_default()
                    .push(NodeId(index));
            }
        }

        let mut page_uses = vec![Vec::new(); self.pages.len()];
        for character in &characters {
            for (spread, id) in character.spreads() {
                page_uses[id.0].push(PageUse {
                    character: character.code.clone(),
                    spread,
                });
            }
        }
        for uses in &mut page_uses {
            uses.sort();
        }

        let orphans: Vec<String> = store
            .names(RecordKind::Page)
            .into_iter()
            .filter(|name| {
                self.page_index
                    .get(*name)
                    .map_or(true, |id| page_uses[id.0].is_empty())
            })
            .map(str::to_string)
            .collect();
        if !orphans.is_empty() {
            debug!(count = orphans.len(), "unreferenced page records");
        }

        for code in store.names(RecordKind::Character) {
            if !character_index.contains_key(code) {
                warn!(code, "character record is not listed in the world configuration");
            }
        }

        info!(
            characters = characters.len(),
            pages = self.pages.len(),
            nodes = nodes.len(),
            "built narrative graph"
        );

        Ok(World {
            config,
            characters,
            character_index,
            pages: self.pages,
            page_index: self.page_index,
            page_uses,
            nodes,
            node_claims,
            orphans,
        })
    }

    fn build_character(&mut self, code: &CharacterCode) -> Result<Character, BuildError> {
        let record: CharacterRecord = self.load(RecordKind::Character, code.as_str(), "world")?;
        if record.id != *code {
            return Err(BuildError::Malformed {
                kind: RecordKind::Character,
                name: code.to_string(),
                reason: format!("id '{}' does not match the record name", record.id),
            });
        }
        if record.story.len() != usize::from(SPREAD_COUNT) {
            return Err(BuildError::InvalidStoryLength {
                code: code.clone(),
                found: record.story.len(),
                expected: usize::from(SPREAD_COUNT),
            });
        }

        let mut spreads = Vec::with_capacity(record.story.len());
        for reference in record.spread_references() {
            let name =
                normalize_reference(&reference.page).map_err(|err| BuildError::Malformed {
                    kind: RecordKind::Character,
                    name: code.to_string(),
                    reason: format!("spread {}: {}", reference.spread, err),
                })?;
            let referenced_by = format!("character '{}' spread {}", code, reference.spread);
            spreads.push(self.intern_page(&name, &referenced_by)?);
        }

        debug!(code = %code, name = %record.name, "resolved character story");
        Ok(Character {
            code: code.clone(),
            name: record.name,
            spreads,
        })
    }

    /// Resolve a page record once; later references get the same id.
    fn intern_page(&mut self, name: &str, referenced_by: &str) -> Result<PageId, BuildError> {
        if let Some(&id) = self.page_index.get(name) {
            return Ok(id);
        }
        let mut page: PageRecord = self.load(RecordKind::Page, name, referenced_by)?;
        page.name = name.to_string();

        let id = PageId(self.pages.len());
        self.pages.push(page);
        self.page_index.insert(name.to_string(), id);
        Ok(id)
    }

    fn load<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        name: &str,
        referenced_by: &str,
    ) -> Result<T, BuildError> {
        let raw = self
            .store
            .get(kind, name)
            .ok_or_else(|| BuildError::UnresolvedReference {
                kind,
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })?;
        T::deserialize(raw).map_err(|err| BuildError::Malformed {
            kind,
            name: name.to_string(),
            reason: err.to_string(),
        })
    }
}

impl World {
    /// Build a world from a content store.
    pub fn build<S: ContentStore + ?Sized>(store: &S) -> Result<World, BuildError> {
        GraphBuilder::new(store).build()
    }
}
