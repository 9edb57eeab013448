//! Individual structural checks.

use std::collections::BTreeSet;

use story_rules::{
    is_valid_code, meeting_page_name, node_definition_name, parse_page_name, solo_page_name,
    CharacterCode, NodeDefinition, NodeKind, NodeVariant, PageSide, PageTag, SpreadNumber,
};

use super::{CheckCode, Finding, ValidatorConfig};
use crate::graph::World;

fn join_codes<'a>(codes: impl IntoIterator<Item = &'a CharacterCode>) -> String {
    codes
        .into_iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_spreads(spreads: &[SpreadNumber]) -> String {
    spreads
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn distinct_participants(node: &NodeDefinition) -> BTreeSet<&CharacterCode> {
    node.participants.iter().collect()
}

/// Report metadata keyed by character that misses participants or names
/// non-participants.
fn metadata_coverage<'a>(
    node: &NodeDefinition,
    label: &str,
    keys: impl IntoIterator<Item = &'a CharacterCode>,
    listed: &BTreeSet<&CharacterCode>,
    out: &mut Vec<Finding>,
) {
    let keys: BTreeSet<&CharacterCode> = keys.into_iter().collect();
    for missing in listed.difference(&keys) {
        out.push(Finding::error(
            CheckCode::NodeParticipants,
            &node.name,
            format!("no {} for participant '{}'", label, missing),
        ));
    }
    for extra in keys.difference(listed) {
        out.push(Finding::error(
            CheckCode::NodeParticipants,
            &node.name,
            format!("{} given for '{}', who is not a participant", label, extra),
        ));
    }
}

/// Spreads 1, 11 and 12 hold solo pages used by exactly one character.
pub(super) fn spread_exclusivity(world: &World, config: &ValidatorConfig, out: &mut Vec<Finding>) {
    let exclusive = join_spreads(&config.exclusive_spreads);

    for character in world.characters() {
        for &spread in &config.exclusive_spreads {
            let id = character.page_at(spread);
            let page = world.page(id);
            let tag = page.tag();
            if !tag.is_solo() {
                out.push(Finding::error(
                    CheckCode::SpreadExclusivity,
                    character.code.as_str(),
                    format!(
                        "spread {} uses '{}' tagged '{}'; spreads {} must be solo",
                        spread, page.name, tag, exclusive
                    ),
                ));
            }

            let others: Vec<&CharacterCode> = world
                .page_owners(id)
                .into_iter()
                .filter(|c| **c != character.code)
                .collect();
            if !others.is_empty() {
                out.push(Finding::error(
                    CheckCode::SpreadExclusivity,
                    character.code.as_str(),
                    format!(
                        "spread {} uses '{}', which is also referenced by {}; spreads {} must be character-specific",
                        spread,
                        page.name,
                        join_codes(others),
                        exclusive
                    ),
                ));
            }
        }
    }

    for node in world.nodes() {
        if config.exclusive_spreads.contains(&node.spread) {
            out.push(Finding::error(
                CheckCode::SpreadExclusivity,
                &node.name,
                format!(
                    "{} node claims spread {}, which must belong to a single character",
                    node.kind(),
                    node.spread
                ),
            ));
        }
    }
}

/// Node participant lists match the characters actually using the content.
pub(super) fn node_participants(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for node in world.nodes() {
        let listed = distinct_participants(node);
        if listed.len() != node.participants.len() {
            out.push(Finding::error(
                CheckCode::NodeParticipants,
                &node.name,
                "lists a participant more than once",
            ));
        }
        if listed.len() < 2 {
            out.push(Finding::error(
                CheckCode::NodeParticipants,
                &node.name,
                format!("needs at least two distinct participants, found {}", listed.len()),
            ));
        }

        match &node.variant {
            NodeVariant::Meeting {
                page,
                points_of_view,
            } => {
                let Some(id) = world.page_id(page) else {
                    continue;
                };
                let actual: BTreeSet<&CharacterCode> = world
                    .characters()
                    .iter()
                    .filter(|c| c.page_at(node.spread) == id)
                    .map(|c| &c.code)
                    .collect();
                for missing in listed.difference(&actual) {
                    out.push(Finding::error(
                        CheckCode::NodeParticipants,
                        &node.name,
                        format!(
                            "participant '{}' does not place '{}' at spread {}",
                            missing, page, node.spread
                        ),
                    ));
                }
                for extra in actual.difference(&listed) {
                    out.push(Finding::error(
                        CheckCode::NodeParticipants,
                        &node.name,
                        format!(
                            "'{}' places '{}' at spread {} but is not a participant",
                            extra, page, node.spread
                        ),
                    ));
                }
                metadata_coverage(node, "point of view", points_of_view.keys(), &listed, out);
            }
            NodeVariant::Mirrored { .. } | NodeVariant::Resonant { .. } => {
                let kind = node.kind();
                for participant in &listed {
                    let Some(character) = world.character(participant.as_str()) else {
                        continue;
                    };
                    let id = character.page_at(node.spread);
                    let page = world.page(id);
                    match page.tag() {
                        PageTag::Untagged => {}
                        PageTag::Node(tagged) if tagged == kind => {}
                        other => out.push(Finding::error(
                            CheckCode::NodeParticipants,
                            &node.name,
                            format!(
                                "participant '{}' places '{}' tagged '{}' at spread {}; expected a {} page",
                                participant, page.name, other, node.spread, kind
                            ),
                        )),
                    }

                    let owners = world.page_owners(id);
                    if owners.len() > 1 {
                        out.push(Finding::error(
                            CheckCode::NodeParticipants,
                            &node.name,
                            format!(
                                "'{}' is shared by {}; {} participants each own a distinct page",
                                page.name,
                                join_codes(owners),
                                kind
                            ),
                        ));
                    }
                }
                if let NodeVariant::Resonant { ripples, .. } = &node.variant {
                    metadata_coverage(node, "emotional ripple", ripples.keys(), &listed, out);
                }
            }
        }
    }

    for (id, page) in world.pages() {
        let Some(kind) = page.tag().node_kind() else {
            continue;
        };
        if kind == NodeKind::Meeting {
            continue;
        }
        for page_use in world.page_uses(id) {
            let covered = world
                .nodes_at(&page_use.character, page_use.spread)
                .any(|node| node.kind() == kind);
            if !covered {
                out.push(Finding::error(
                    CheckCode::NodeParticipants,
                    &page.name,
                    format!(
                        "tagged {} but no {} node at spread {} lists '{}'",
                        kind, kind, page_use.spread, page_use.character
                    ),
                ));
            }
        }
    }
}

/// A page is tagged `meeting` iff two or more characters share it.
pub(super) fn meeting_sharing(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for (id, page) in world.pages() {
        let uses = world.page_uses(id);
        if uses.is_empty() {
            continue;
        }
        let owners = world.page_owners(id);
        let is_meeting = page.tag() == PageTag::Node(NodeKind::Meeting);

        if is_meeting && owners.len() < 2 {
            out.push(Finding::error(
                CheckCode::MeetingSharing,
                &page.name,
                format!(
                    "tagged meeting but only referenced by {}",
                    join_codes(owners.iter().copied())
                ),
            ));
        }
        if !is_meeting && owners.len() >= 2 {
            out.push(Finding::error(
                CheckCode::MeetingSharing,
                &page.name,
                format!(
                    "referenced by {} but not tagged meeting",
                    join_codes(owners.iter().copied())
                ),
            ));
        }

        if is_meeting || owners.len() >= 2 {
            let spreads: BTreeSet<SpreadNumber> = uses.iter().map(|u| u.spread).collect();
            if spreads.len() > 1 {
                let placements = uses
                    .iter()
                    .map(|u| format!("'{}' at {}", u.character, u.spread))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push(Finding::error(
                    CheckCode::MeetingSharing,
                    &page.name,
                    format!("shared page is placed at different spreads: {}", placements),
                ));
            }
            if world.meeting_nodes_for(&page.name).next().is_none() {
                out.push(Finding::error(
                    CheckCode::MeetingSharing,
                    &page.name,
                    "shared page has no meeting node definition",
                ));
            }
        }
    }
}

/// Mirrored and resonant participants place content written for the node's spread.
pub(super) fn node_alignment(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for node in world.nodes() {
        if node.kind() == NodeKind::Meeting {
            continue;
        }
        for participant in distinct_participants(node) {
            let Some(character) = world.character(participant.as_str()) else {
                continue;
            };
            let page = world.page_of(character, node.spread);
            let authored = parse_page_name(&page.name)
                .ok()
                .map(|name| name.spread)
                .filter(|&s| s != node.spread.get());
            let declared = page.spread.filter(|&s| s != node.spread);

            let misplaced = match (authored, declared) {
                (Some(authored), _) => Some(format!("authored for spread {:02}", authored)),
                (None, Some(declared)) => Some(format!("declares spread {}", declared)),
                (None, None) => None,
            };
            if let Some(reason) = misplaced {
                out.push(Finding::error(
                    CheckCode::NodeAlignment,
                    &node.name,
                    format!(
                        "participant '{}' places '{}' at spread {}, but it is {}; all {} participants must align at spread {}",
                        participant,
                        page.name,
                        node.spread,
                        reason,
                        node.kind(),
                        node.spread
                    ),
                ));
            }
        }
    }
}

/// Each resonant participant's growth moment comes before the node.
pub(super) fn resonant_precedence(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for node in world.nodes() {
        let NodeVariant::Resonant { growth_moments, .. } = &node.variant else {
            continue;
        };
        let listed = distinct_participants(node);
        for participant in &listed {
            match growth_moments.get(*participant) {
                None => out.push(Finding::error(
                    CheckCode::ResonantPrecedence,
                    &node.name,
                    format!("no growth-moment spread for participant '{}'", participant),
                )),
                Some(growth) if *growth >= node.spread => out.push(Finding::error(
                    CheckCode::ResonantPrecedence,
                    &node.name,
                    format!(
                        "growth moment for '{}' at spread {} does not precede spread {}",
                        participant, growth, node.spread
                    ),
                )),
                Some(_) => {}
            }
        }
        for extra in growth_moments.keys().filter(|k| !listed.contains(k)) {
            out.push(Finding::error(
                CheckCode::ResonantPrecedence,
                &node.name,
                format!("growth moment given for '{}', who is not a participant", extra),
            ));
        }
    }
}

/// Record names follow the grammar for how they are used.
pub(super) fn naming(world: &World, config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for character in world.characters() {
        if !is_valid_code(character.code.as_str(), config.code_width) {
            out.push(Finding::error(
                CheckCode::Naming,
                character.code.as_str(),
                format!(
                    "character code should be {} lowercase letters",
                    config.code_width
                ),
            ));
        }
    }

    for (id, page) in world.pages() {
        let uses = world.page_uses(id);
        if uses.is_empty() {
            continue;
        }
        let owners = world.page_owners(id);
        let shared = owners.len() >= 2 || page.tag() == PageTag::Node(NodeKind::Meeting);

        if !shared {
            // Every placement of a solo page must agree with its name.
            for page_use in uses {
                let expected = solo_page_name(&page_use.character, page_use.spread);
                if expected != page.name {
                    out.push(Finding::error(
                        CheckCode::Naming,
                        &page.name,
                        format!(
                            "'{}' places it at spread {}; a solo page there should be named '{}'",
                            page_use.character, page_use.spread, expected
                        ),
                    ));
                }
            }
            continue;
        }

        let expected: BTreeSet<String> = uses
            .iter()
            .map(|u| meeting_page_name(owners.iter().copied(), u.spread))
            .collect();
        if !expected.contains(&page.name) {
            let expected = expected
                .iter()
                .map(|name| format!("'{}'", name))
                .collect::<Vec<_>>()
                .join(" or ");
            out.push(Finding::error(
                CheckCode::Naming,
                &page.name,
                format!("page should be named {} for how it is used", expected),
            ));
        }
    }

    for name in world.orphans() {
        if let Err(err) = parse_page_name(name) {
            out.push(Finding::error(
                CheckCode::Naming,
                name,
                format!("does not follow the page naming grammar: {}", err),
            ));
        }
    }

    for node in world.nodes() {
        let expected = node_definition_name(node.kind(), node.spread);
        if node.name != expected {
            out.push(Finding::error(
                CheckCode::Naming,
                &node.name,
                format!(
                    "should be named '{}' for a {} node at spread {}",
                    expected,
                    node.kind(),
                    node.spread
                ),
            ));
        }
    }
}

/// Page records no story reaches.
pub(super) fn orphans(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for name in world.orphans() {
        out.push(Finding::warning(
            CheckCode::Orphan,
            name,
            "not referenced by any character's story",
        ));
    }
}

/// Two complete scenes per page, three or four sentences each.
pub(super) fn scene_completeness(world: &World, config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for (_, page) in world.pages() {
        let mut warn = |message: String| {
            out.push(Finding::warning(
                CheckCode::SceneCompleteness,
                &page.name,
                message,
            ));
        };

        if page.scenes.len() != config.scenes_per_page {
            warn(format!(
                "has {} scene(s), expected {} (left and right)",
                page.scenes.len(),
                config.scenes_per_page
            ));
        }

        for (index, scene) in page.scenes.iter().enumerate() {
            let n = index + 1;
            if scene.visual.trim().is_empty() {
                warn(format!("scene {} is missing its visual description", n));
            }
            if scene.text.trim().is_empty() {
                warn(format!("scene {} is missing its text", n));
            } else {
                let sentences = scene.sentence_count();
                if !(config.min_sentences..=config.max_sentences).contains(&sentences) {
                    warn(format!(
                        "scene {} has {} sentence(s), expected {}-{}",
                        n, sentences, config.min_sentences, config.max_sentences
                    ));
                }
            }
            if scene.page.is_none() {
                warn(format!("scene {} does not say which page (left/right) it is on", n));
            }
        }

        if let [first, second] = page.scenes.as_slice() {
            if first.page == Some(PageSide::Right) || second.page == Some(PageSide::Left) {
                warn("scenes should run left then right".to_string());
            }
        }
    }
}

/// Node-type tags come from the known vocabulary.
pub(super) fn node_type(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for (_, page) in world.pages() {
        if let PageTag::Unknown(raw) = page.tag() {
            out.push(Finding::error(
                CheckCode::NodeType,
                &page.name,
                format!(
                    "invalid node_type '{}'; expected one of solo, meeting, mirrored, resonant",
                    raw
                ),
            ));
        }
    }
}

/// A page that declares its spread is placed there by everyone using it.
pub(super) fn spread_placement(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    for (id, page) in world.pages() {
        let Some(declared) = page.spread else {
            continue;
        };
        for page_use in world.page_uses(id) {
            if page_use.spread != declared {
                out.push(Finding::error(
                    CheckCode::SpreadPlacement,
                    &page.name,
                    format!(
                        "declares spread {} but '{}' places it at spread {}",
                        declared, page_use.character, page_use.spread
                    ),
                ));
            }
        }
    }
}

/// Node motifs come from the world's symbolic-element catalog, when it has one.
pub(super) fn motif_catalog(world: &World, _config: &ValidatorConfig, out: &mut Vec<Finding>) {
    if world.config().symbols.is_empty() {
        return;
    }
    for node in world.nodes() {
        let Some(motif) = node.variant.motif() else {
            continue;
        };
        if world.config().symbol(motif).is_none() {
            out.push(Finding::warning(
                CheckCode::MotifCatalog,
                &node.name,
                format!("motif '{}' is not in the symbolic-element catalog", motif),
            ));
        }
    }
}
