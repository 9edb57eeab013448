//! Story Assembler - reconstructs one character's ordered story.
//!
//! The assembler walks a character's twelve spreads in order, dereferences
//! each page through the graph, and annotates every non-exclusive spread with
//! the narrative nodes that tie it to other characters. It only reads the
//! `World`, so any number of assemblers can run over one world at once.

mod render;

use serde::Serialize;
use tracing::debug;

use story_rules::{CharacterCode, NodeDefinition, NodeKind, PageRecord, SpreadNumber, SpreadReference};

use crate::error::AssembleError;
use crate::graph::{Character, World};

/// One narrative node touching a spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeLink {
    pub kind: NodeKind,
    pub spread: SpreadNumber,

    /// Definition record name; `None` for a meeting inferred from a shared
    /// page that no definition governs.
    pub definition: Option<String>,

    pub motif: Option<String>,

    /// Participants other than the story's character, sorted.
    pub other_participants: Vec<CharacterCode>,
}

impl NodeLink {
    fn from_definition(node: &NodeDefinition, code: &CharacterCode) -> Self {
        let mut others: Vec<CharacterCode> = node.others(code).cloned().collect();
        others.sort();
        others.dedup();
        Self {
            kind: node.kind(),
            spread: node.spread,
            definition: Some(node.name.clone()),
            motif: node.variant.motif().map(str::to_string),
            other_participants: others,
        }
    }
}

/// Node analysis for one spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "links", rename_all = "lowercase")]
pub enum NodeAnnotation {
    Solo,
    Linked(Vec<NodeLink>),
}

impl NodeAnnotation {
    pub fn is_solo(&self) -> bool {
        matches!(self, NodeAnnotation::Solo)
    }

    pub fn links(&self) -> &[NodeLink] {
        match self {
            NodeAnnotation::Solo => &[],
            NodeAnnotation::Linked(links) => links,
        }
    }
}

/// One resolved spread of a story.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledSpread<'w> {
    pub spread: SpreadNumber,
    pub page: &'w PageRecord,
    pub analysis: NodeAnnotation,
}

/// A character's complete story, borrowed from the world.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledStory<'w> {
    pub code: CharacterCode,
    pub name: String,
    pub spreads: Vec<AssembledSpread<'w>>,
}

impl<'w> AssembledStory<'w> {
    /// Spread references naming the pages this story resolved to.
    pub fn spread_references(&self) -> Vec<SpreadReference> {
        self.spreads
            .iter()
            .map(|s| SpreadReference {
                spread: s.spread,
                page: s.page.name.clone(),
            })
            .collect()
    }

    /// Spreads linked to at least one other character.
    pub fn linked_spreads(&self) -> impl Iterator<Item = &AssembledSpread<'w>> {
        self.spreads.iter().filter(|s| !s.analysis.is_solo())
    }
}

/// A node seen from one other participant, with that participant's
/// surrounding pages.
#[derive(Debug, Clone, Serialize)]
pub struct Connection<'w> {
    pub spread: SpreadNumber,
    pub kind: NodeKind,
    pub definition: Option<String>,
    pub motif: Option<String>,
    pub other: &'w Character,

    /// The story's own page at the node's spread.
    pub page: &'w PageRecord,

    /// The other participant's pages on either side of the node.
    pub before: Option<&'w PageRecord>,
    pub after: Option<&'w PageRecord>,
}

/// Assembles character stories from a built world.
pub struct StoryAssembler<'w> {
    world: &'w World,
}

impl<'w> StoryAssembler<'w> {
    pub fn new(world: &'w World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    /// Assemble a character's story.
    ///
    /// Best effort on graphs that fail validation: whatever nodes claim a
    /// spread are reported, in definition-name order.
    pub fn assemble(&self, code: &str) -> Result<AssembledStory<'w>, AssembleError> {
        let character = self
            .world
            .character(code)
            .ok_or_else(|| AssembleError::UnknownCharacter(code.to_string()))?;

        let spreads: Vec<AssembledSpread<'w>> = character
            .spreads()
            .map(|(spread, id)| AssembledSpread {
                spread,
                page: self.world.page(id),
                analysis: self.analyze(character, spread),
            })
            .collect();

        debug!(
            code,
            linked = spreads.iter().filter(|s| !s.analysis.is_solo()).count(),
            "assembled story"
        );

        Ok(AssembledStory {
            code: character.code.clone(),
            name: character.name.clone(),
            spreads,
        })
    }

    fn analyze(&self, character: &Character, spread: SpreadNumber) -> NodeAnnotation {
        if spread.is_exclusive() {
            return NodeAnnotation::Solo;
        }

        let mut links: Vec<NodeLink> = self
            .world
            .nodes_at(&character.code, spread)
            .map(|node| NodeLink::from_definition(node, &character.code))
            .collect();

        if !links.iter().any(|link| link.kind == NodeKind::Meeting) {
            let sharing: Vec<CharacterCode> = self
                .world
                .page_owners(character.page_at(spread))
                .into_iter()
                .filter(|c| **c != character.code)
                .cloned()
                .collect();
            if !sharing.is_empty() {
                links.push(NodeLink {
                    kind: NodeKind::Meeting,
                    spread,
                    definition: None,
                    motif: None,
                    other_participants: sharing,
                });
            }
        }

        if links.is_empty() {
            NodeAnnotation::Solo
        } else {
            NodeAnnotation::Linked(links)
        }
    }

    /// Every (node, other participant) pair of a story, in spread order.
    ///
    /// Participants absent from the world are skipped.
    pub fn connections(&self, story: &AssembledStory<'w>) -> Vec<Connection<'w>> {
        let mut connections = Vec::new();
        for assembled in story.linked_spreads() {
            for link in assembled.analysis.links() {
                for code in &link.other_participants {
                    let Some(other) = self.world.character(code.as_str()) else {
                        continue;
                    };
                    let neighbour =
                        |s: Option<SpreadNumber>| s.map(|s| self.world.page_of(other, s));
                    connections.push(Connection {
                        spread: link.spread,
                        kind: link.kind,
                        definition: link.definition.clone(),
                        motif: link.motif.clone(),
                        other,
                        page: assembled.page,
                        before: neighbour(link.spread.previous()),
                        after: neighbour(link.spread.next()),
                    });
                }
            }
        }
        connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{code, page_json, Fixture};
    use serde_json::json;

    fn spread(n: u8) -> SpreadNumber {
        SpreadNumber::new(n).unwrap()
    }

    #[test]
    fn test_story_round_trips_spread_references() {
        let fixture = Fixture::valid();
        let world = fixture.world();
        let assembler = StoryAssembler::new(&world);

        for record in &fixture.characters {
            let story = assembler.assemble(record.id.as_str()).unwrap();
            assert_eq!(story.spreads.len(), 12);
            assert_eq!(story.spread_references(), record.spread_references());
        }
    }

    #[test]
    fn test_unknown_character() {
        let world = Fixture::valid().world();
        let err = StoryAssembler::new(&world).assemble("zz").unwrap_err();
        assert_eq!(err, AssembleError::UnknownCharacter("zz".to_string()));
    }

    #[test]
    fn test_meeting_annotation() {
        let world = Fixture::valid().world();
        let story = StoryAssembler::new(&world).assemble("el").unwrap();

        let links = story.spreads[6].analysis.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, NodeKind::Meeting);
        assert_eq!(links[0].spread, spread(7));
        assert_eq!(links[0].definition.as_deref(), Some("meeting-07"));
        assert_eq!(links[0].other_participants, vec![code("no")]);

        let solo = story.spreads.iter().filter(|s| s.analysis.is_solo()).count();
        assert_eq!(solo, 11);
    }

    #[test]
    fn test_mirrored_and_resonant_annotations() {
        let world = Fixture::valid().world();
        let story = StoryAssembler::new(&world).assemble("le").unwrap();

        let mirrored = &story.spreads[4].analysis.links()[0];
        assert_eq!(mirrored.kind, NodeKind::Mirrored);
        assert_eq!(mirrored.motif.as_deref(), Some("Lantern"));
        assert_eq!(mirrored.other_participants, vec![code("ma")]);

        let resonant = &story.spreads[7].analysis.links()[0];
        assert_eq!(resonant.kind, NodeKind::Resonant);
        assert_eq!(resonant.definition.as_deref(), Some("resonant-08"));

        assert_eq!(story.linked_spreads().count(), 2);
    }

    #[test]
    fn test_shared_page_resolves_to_one_record() {
        let world = Fixture::valid().world();
        let assembler = StoryAssembler::new(&world);
        let el = assembler.assemble("el").unwrap();
        let no = assembler.assemble("no").unwrap();

        assert!(std::ptr::eq(el.spreads[6].page, no.spreads[6].page));
        assert_eq!(el.spreads[6].page.location.as_deref(), Some("the old stone bridge"));
    }

    #[test]
    fn test_exclusive_spreads_are_never_annotated() {
        let mut fixture = Fixture::valid();
        fixture.node_mut("mirrored-05")["spread"] = json!(11);
        let world = fixture.world();

        let story = StoryAssembler::new(&world).assemble("ma").unwrap();
        assert!(story.spreads[10].analysis.is_solo());
        assert!(story.spreads[4].analysis.is_solo());
    }

    #[test]
    fn test_inferred_meeting_for_undefined_shared_page() {
        let mut fixture = Fixture::valid();
        fixture.pages.insert("le-ma-03".to_string(), page_json(3, Some("meeting")));
        fixture.set_spread("ma", 3, "le-ma-03");
        fixture.set_spread("le", 3, "le-ma-03");
        let world = fixture.world();

        let story = StoryAssembler::new(&world).assemble("ma").unwrap();
        let links = story.spreads[2].analysis.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, NodeKind::Meeting);
        assert_eq!(links[0].definition, None);
        assert_eq!(links[0].other_participants, vec![code("le")]);
    }

    #[test]
    fn test_overlapping_claims_are_all_reported() {
        let mut fixture = Fixture::valid();
        fixture.nodes.insert(
            "resonant-05".to_string(),
            json!({
                "kind": "resonant",
                "spread": 5,
                "participants": ["ma", "no"],
                "motif": "Lantern",
                "ripples": { "ma": "a", "no": "b" },
                "growth_moments": { "ma": 2, "no": 3 }
            }),
        );
        let world = fixture.world();

        let story = StoryAssembler::new(&world).assemble("ma").unwrap();
        let names: Vec<_> = story.spreads[4]
            .analysis
            .links()
            .iter()
            .map(|l| l.definition.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["mirrored-05", "resonant-05"]);
    }

    #[test]
    fn test_connections_include_surrounding_pages() {
        let world = Fixture::valid().world();
        let assembler = StoryAssembler::new(&world);
        let story = assembler.assemble("el").unwrap();

        let connections = assembler.connections(&story);
        assert_eq!(connections.len(), 1);
        let connection = &connections[0];
        assert_eq!(connection.other.code, code("no"));
        assert_eq!(connection.page.name, "el-no-07");
        assert_eq!(connection.before.map(|p| p.name.as_str()), Some("no-06"));
        assert_eq!(connection.after.map(|p| p.name.as_str()), Some("no-08"));
    }

    #[test]
    fn test_assembly_is_deterministic_across_threads() {
        let world = Fixture::valid().world();
        let expected = serde_json::to_string(&StoryAssembler::new(&world).assemble("ma").unwrap())
            .unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let story = StoryAssembler::new(&world).assemble("ma").unwrap();
                        serde_json::to_string(&story).unwrap()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_annotation_serializes_with_type_tag() {
        let world = Fixture::valid().world();
        let story = StoryAssembler::new(&world).assemble("el").unwrap();
        let value = serde_json::to_value(&story).unwrap();

        assert_eq!(value["spreads"][0]["analysis"], json!({ "type": "solo" }));
        assert_eq!(value["spreads"][6]["analysis"]["type"], "linked");
        assert_eq!(
            value["spreads"][6]["analysis"]["links"][0]["definition"],
            "meeting-07"
        );
        assert_eq!(value["spreads"][6]["page"]["name"], "el-no-07");
    }
}
