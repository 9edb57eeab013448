//! Narrative nodes - structural links between characters' stories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::entities::{CharacterCode, SpreadNumber};

/// The three shapes of cross-character link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Characters share literally the same page record.
    Meeting,
    /// Separate pages linked by a shared motif at aligned spreads.
    Mirrored,
    /// Like mirrored, plus an emotional ripple after a growth moment.
    Resonant,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Meeting, NodeKind::Mirrored, NodeKind::Resonant];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Meeting => "meeting",
            NodeKind::Mirrored => "mirrored",
            NodeKind::Resonant => "resonant",
        }
    }

    /// Human-readable label, e.g. "Meeting Node".
    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::Meeting => "Meeting Node",
            NodeKind::Mirrored => "Mirrored Node",
            NodeKind::Resonant => "Resonant Node",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node kind '{0}'")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// Variant-specific data of a node definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeVariant {
    Meeting {
        /// The single page record every participant references.
        page: String,
        /// Each participant's vantage on the shared scene.
        #[serde(default)]
        points_of_view: BTreeMap<CharacterCode, String>,
    },
    Mirrored {
        /// The shared symbolic motif.
        motif: String,
    },
    Resonant {
        motif: String,
        /// How the emotional ripple lands for each participant.
        #[serde(default)]
        ripples: BTreeMap<CharacterCode, String>,
        /// Spread of each participant's preceding growth moment.
        #[serde(default)]
        growth_moments: BTreeMap<CharacterCode, SpreadNumber>,
    },
}

impl NodeVariant {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeVariant::Meeting { .. } => NodeKind::Meeting,
            NodeVariant::Mirrored { .. } => NodeKind::Mirrored,
            NodeVariant::Resonant { .. } => NodeKind::Resonant,
        }
    }

    pub fn motif(&self) -> Option<&str> {
        match self {
            NodeVariant::Meeting { .. } => None,
            NodeVariant::Mirrored { motif } | NodeVariant::Resonant { motif, .. } => {
                Some(motif.as_str())
            }
        }
    }
}

/// A node definition record: which characters are linked, where, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Record name; filled in from the store key.
    #[serde(default, skip_deserializing)]
    pub name: String,

    pub spread: SpreadNumber,

    pub participants: Vec<CharacterCode>,

    #[serde(flatten)]
    pub variant: NodeVariant,
}

impl NodeDefinition {
    pub fn kind(&self) -> NodeKind {
        self.variant.kind()
    }

    /// Check if a character participates in this node.
    pub fn involves(&self, code: &CharacterCode) -> bool {
        self.participants.contains(code)
    }

    /// Participants other than the given character, in listed order.
    pub fn others<'a>(&'a self, code: &'a CharacterCode) -> impl Iterator<Item = &'a CharacterCode> {
        self.participants.iter().filter(move |p| *p != code)
    }

    /// The shared page, for meeting nodes.
    pub fn meeting_page(&self) -> Option<&str> {
        match &self.variant {
            NodeVariant::Meeting { page, .. } => Some(page),
            _ => None,
        }
    }
}
