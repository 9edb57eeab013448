//! Page records - the stored content of one spread.

use serde::{Deserialize, Serialize};

use super::SpreadNumber;
use crate::nodes::NodeKind;

/// Which half of the spread a scene sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSide {
    Left,
    Right,
}

impl std::fmt::Display for PageSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageSide::Left => write!(f, "Left"),
            PageSide::Right => write!(f, "Right"),
        }
    }
}

/// One illustrated page of a spread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub page: Option<PageSide>,

    #[serde(default)]
    pub page_number: Option<u32>,

    /// Short label for what the scene is about.
    #[serde(default)]
    pub focus: String,

    /// Prose description consumed by the illustration pipeline.
    #[serde(default)]
    pub visual: String,

    /// Read-aloud text, three or four sentences.
    #[serde(default)]
    pub text: String,
}

impl Scene {
    /// Count the sentences of the scene text.
    ///
    /// A sentence ends at `.`, `!` or `?` (runs such as `...` or `?!` count
    /// once) followed by whitespace or the end of the text. Closing quotes and
    /// brackets after the terminator are skipped. Trailing words without a
    /// terminator count as a final sentence.
    pub fn sentence_count(&self) -> usize {
        let chars: Vec<char> = self.text.chars().collect();
        let mut count = 0;
        let mut has_words = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_alphanumeric() {
                has_words = true;
                i += 1;
                continue;
            }
            if matches!(c, '.' | '!' | '?') {
                let mut end = i;
                while end + 1 < chars.len() && matches!(chars[end + 1], '.' | '!' | '?') {
                    end += 1;
                }
                while end + 1 < chars.len()
                    && matches!(chars[end + 1], '"' | '\'' | ')' | '\u{201d}' | '\u{2019}')
                {
                    end += 1;
                }
                let at_boundary = end + 1 >= chars.len() || chars[end + 1].is_whitespace();
                if at_boundary && has_words {
                    count += 1;
                    has_words = false;
                }
                i = end + 1;
                continue;
            }
            i += 1;
        }

        if has_words {
            count += 1;
        }
        count
    }
}

/// Node-type tag carried by a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PageTag {
    /// No `node_type` given; treated as solo.
    Untagged,
    Solo,
    Node(NodeKind),
    /// A tag outside the known vocabulary, kept for reporting.
    Unknown(String),
}

impl PageTag {
    /// Interpret an optional raw `node_type` value.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => PageTag::Untagged,
            Some("solo") => PageTag::Solo,
            Some(other) => match other.parse::<NodeKind>() {
                Ok(kind) => PageTag::Node(kind),
                Err(_) => PageTag::Unknown(other.to_string()),
            },
        }
    }

    /// Whether the page belongs to a single character.
    pub fn is_solo(&self) -> bool {
        matches!(self, PageTag::Untagged | PageTag::Solo)
    }

    pub fn node_kind(&self) -> Option<NodeKind> {
        match self {
            PageTag::Node(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for PageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageTag::Untagged | PageTag::Solo => write!(f, "solo"),
            PageTag::Node(kind) => write!(f, "{}", kind),
            PageTag::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// The content of one spread for one character context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRecord {
    /// Record name; filled in from the store key, never read from the body.
    #[serde(default, skip_deserializing)]
    pub name: String,

    /// Spread the page was written for, if the author declared it.
    #[serde(default)]
    pub spread: Option<SpreadNumber>,

    /// Raw node-type tag (`solo`, `meeting`, `mirrored`, `resonant`).
    #[serde(default)]
    pub node_type: Option<String>,

    /// Story beat this spread delivers.
    #[serde(default)]
    pub beat: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Where a meeting takes place.
    #[serde(default)]
    pub location: Option<String>,

    /// What the characters do together at a meeting.
    #[serde(default)]
    pub shared_action: Option<String>,

    /// Left and right scenes, in that order.
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl PageRecord {
    /// Create an empty page record with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the node-type tag.
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Add a scene.
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }

    /// The interpreted node-type tag.
    pub fn tag(&self) -> PageTag {
        PageTag::parse(self.node_type.as_deref())
    }
}
