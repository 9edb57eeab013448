//! Graph Model - the typed, read-only view of a storybook set.
//!
//! Page records live in an arena and are referenced by `PageId`; two spread
//! references naming the same record hold the same id, which is how meeting
//! pages are shared without being copied. Nothing here is mutated after
//! `GraphBuilder::build` returns.

mod builder;

pub use builder::*;

use serde::Serialize;
use std::collections::BTreeMap;

use story_rules::{
    CharacterCode, NodeDefinition, PageRecord, SpreadNumber, SpreadReference, WorldConfig,
};

/// Index of a page record in the world's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PageId(usize);

/// Index of a node definition in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

/// A character with its resolved spread sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Character {
    pub code: CharacterCode,
    pub name: String,
    /// One page per spread, in spread order.
    spreads: Vec<PageId>,
}

impl Character {
    /// The page placed at a spread.
    pub fn page_at(&self, spread: SpreadNumber) -> PageId {
        self.spreads[spread.index()]
    }

    /// Spread numbers paired with their pages, in order.
    pub fn spreads(&self) -> impl Iterator<Item = (SpreadNumber, PageId)> + '_ {
        SpreadNumber::all().zip(self.spreads.iter().copied())
    }
}

/// Who places a page in their story, and where.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PageUse {
    pub character: CharacterCode,
    pub spread: SpreadNumber,
}

/// The process-wide read-only registry of a storybook set.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    characters: Vec<Character>,
    character_index: BTreeMap<CharacterCode, usize>,
    pages: Vec<PageRecord>,
    page_index: BTreeMap<String, PageId>,
    page_uses: Vec<Vec<PageUse>>,
    nodes: Vec<NodeDefinition>,
    node_claims: BTreeMap<(CharacterCode, SpreadNumber), Vec<NodeId>>,
    orphans: Vec<String>,
}

impl World {
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Characters in configuration order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, code: &str) -> Option<&Character> {
        self.character_index
            .get(code)
            .map(|&index| &self.characters[index])
    }

    pub fn page(&self, id: PageId) -> &PageRecord {
        &self.pages[id.0]
    }

    pub fn page_id(&self, name: &str) -> Option<PageId> {
        self.page_index.get(name).copied()
    }

    pub fn page_by_name(&self, name: &str) -> Option<&PageRecord> {
        self.page_id(name).map(|id| self.page(id))
    }

    /// The page a character places at a spread.
    pub fn page_of(&self, character: &Character, spread: SpreadNumber) -> &PageRecord {
        self.page(character.page_at(spread))
    }

    /// All resolved pages, sorted by name.
    pub fn pages(&self) -> impl Iterator<Item = (PageId, &PageRecord)> {
        self.page_index.values().map(|&id| (id, self.page(id)))
    }

    /// Every (character, spread) placing this page, sorted.
    pub fn page_uses(&self, id: PageId) -> &[PageUse] {
        &self.page_uses[id.0]
    }

    /// Distinct characters placing this page, sorted.
    pub fn page_owners(&self, id: PageId) -> Vec<&CharacterCode> {
        let mut owners: Vec<&CharacterCode> =
            self.page_uses(id).iter().map(|u| &u.character).collect();
        owners.dedup();
        owners
    }

    /// Node definitions, sorted by name.
    pub fn nodes(&self) -> &[NodeDefinition] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &NodeDefinition {
        &self.nodes[id.0]
    }

    /// Node definitions claiming a character's spread, sorted by name.
    pub fn nodes_at(
        &self,
        code: &CharacterCode,
        spread: SpreadNumber,
    ) -> impl Iterator<Item = &NodeDefinition> {
        self.node_claims
            .get(&(code.clone(), spread))
            .into_iter()
            .flatten()
            .map(|&id| self.node(id))
    }

    /// Meeting definitions governing a page.
    pub fn meeting_nodes_for(&self, page: &str) -> impl Iterator<Item = &NodeDefinition> + '_ {
        let page = page.to_string();
        self.nodes
            .iter()
            .filter(move |node| node.meeting_page() == Some(page.as_str()))
    }

    /// Page records in the store that no character's story reaches.
    pub fn orphans(&self) -> &[String] {
        &self.orphans
    }

    /// Re-derive a character's spread references from the graph.
    pub fn spread_references(&self, code: &str) -> Option<Vec<SpreadReference>> {
        let character = self.character(code)?;
        Some(
            character
                .spreads()
                .map(|(spread, id)| SpreadReference {
                    spread,
                    page: self.page(id).name.clone(),
                })
                .collect(),
        )
    }
}
