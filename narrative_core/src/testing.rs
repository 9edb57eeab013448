//! Shared fixtures: a complete, structurally sound four-character set that
//! individual tests perturb.
//!
//! - `el` and `no` share the meeting page `el-no-07`
//! - `ma` and `le` are mirrored at spread 5 and resonant at spread 8

use serde_json::{json, Value};
use std::collections::BTreeMap;

use story_rules::{CharacterCode, CharacterRecord, WorldConfig, WORLD_RECORD};

use crate::content_store::{InMemoryStore, RecordKind};
use crate::graph::World;

pub(crate) const CAST: [(&str, &str); 4] = [
    ("el", "Elowen"),
    ("no", "Noor"),
    ("ma", "Mara"),
    ("le", "Leif"),
];

pub(crate) fn code(c: &str) -> CharacterCode {
    CharacterCode::new(c).unwrap()
}

/// A well-formed page record body.
pub(crate) fn page_json(spread: u8, tag: Option<&str>) -> Value {
    let first = u32::from(spread) * 2 - 1;
    let mut page = json!({
        "spread": spread,
        "beat": format!("beat {}", spread),
        "description": format!("Spread {} of the story.", spread),
        "scenes": [
            {
                "page": "left",
                "page_number": first,
                "focus": "arrival",
                "visual": "A small figure stands at the edge of a windy meadow.",
                "text": "The wind was soft. The grass bent low. Someone was waiting by the stones."
            },
            {
                "page": "right",
                "page_number": first + 1,
                "focus": "discovery",
                "visual": "A lantern glows in the tall grass.",
                "text": "A light flickered. It was warm and gold. She picked it up! Was it hers?"
            }
        ]
    });
    if let Some(tag) = tag {
        page["node_type"] = json!(tag);
    }
    page
}

pub(crate) struct Fixture {
    pub config: WorldConfig,
    pub characters: Vec<CharacterRecord>,
    pub pages: BTreeMap<String, Value>,
    pub nodes: BTreeMap<String, Value>,
}

impl Fixture {
    pub fn valid() -> Self {
        let config = WorldConfig::new(CAST.iter().map(|(c, _)| code(c)))
            .with_title("The Lantern Books")
            .with_symbol("Lantern", "hope carried forward")
            .with_symbol("Paper boat", "letting go");

        let mut characters = Vec::new();
        let mut pages = BTreeMap::new();
        for (c, name) in CAST {
            let mut story = Vec::new();
            for spread in 1..=12u8 {
                let page = match (c, spread) {
                    ("el" | "no", 7) => "el-no-07".to_string(),
                    _ => format!("{}-{:02}", c, spread),
                };
                let tag = match (c, spread) {
                    ("el" | "no", 7) => Some("meeting"),
                    ("ma" | "le", 5) => Some("mirrored"),
                    ("ma" | "le", 8) => Some("resonant"),
                    (_, 1) => Some("solo"),
                    _ => None,
                };
                pages.entry(page.clone()).or_insert_with(|| page_json(spread, tag));
                story.push(page);
            }
            characters.push(CharacterRecord::new(code(c), name).with_story(story));
        }
        pages.get_mut("el-no-07").unwrap()["location"] = json!("the old stone bridge");

        let mut nodes = BTreeMap::new();
        nodes.insert(
            "meeting-07".to_string(),
            json!({
                "kind": "meeting",
                "spread": 7,
                "participants": ["el", "no"],
                "page": "el-no-07",
                "points_of_view": {
                    "el": "Elowen sees Noor's boat drift under the bridge.",
                    "no": "Noor looks up and sees a lantern on the bridge."
                }
            }),
        );
        nodes.insert(
            "mirrored-05".to_string(),
            json!({
                "kind": "mirrored",
                "spread": 5,
                "participants": ["ma", "le"],
                "motif": "Lantern"
            }),
        );
        nodes.insert(
            "resonant-08".to_string(),
            json!({
                "kind": "resonant",
                "spread": 8,
                "participants": ["ma", "le"],
                "motif": "Paper boat",
                "ripples": {
                    "ma": "Mara feels brave enough to let the boat go.",
                    "le": "Leif finds the boat and keeps it safe."
                },
                "growth_moments": { "ma": 4, "le": 6 }
            }),
        );

        Self {
            config,
            characters,
            pages,
            nodes,
        }
    }

    /// Point a character's spread at another page.
    pub fn set_spread(&mut self, c: &str, spread: u8, page: &str) {
        let character = self
            .characters
            .iter_mut()
            .find(|ch| ch.id.as_str() == c)
            .unwrap();
        character.story[usize::from(spread) - 1] = page.to_string();
    }

    pub fn page_mut(&mut self, name: &str) -> &mut Value {
        self.pages.get_mut(name).unwrap()
    }

    pub fn node_mut(&mut self, name: &str) -> &mut Value {
        self.nodes.get_mut(name).unwrap()
    }

    pub fn store(&self) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store
            .insert_serialized(RecordKind::World, WORLD_RECORD, &self.config)
            .unwrap();
        for character in &self.characters {
            store
                .insert_serialized(RecordKind::Character, character.id.as_str(), character)
                .unwrap();
        }
        for (name, page) in &self.pages {
            store.insert(RecordKind::Page, name.clone(), page.clone());
        }
        for (name, node) in &self.nodes {
            store.insert(RecordKind::Node, name.clone(), node.clone());
        }
        store
    }

    pub fn world(&self) -> World {
        World::build(&self.store()).expect("fixture should build")
    }
}
