//! Markdown rendering of assembled stories.

use story_rules::{CharacterCode, NodeKind, PageRecord, PageSide, PageTag};

use super::{AssembledStory, Connection, StoryAssembler};

const RULE_WIDTH: usize = 80;

impl<'w> StoryAssembler<'w> {
    /// Render a story as Markdown, followed by its node analysis.
    pub fn to_markdown(&self, story: &AssembledStory<'w>) -> String {
        let mut out = String::new();

        out.push_str(&format!("# {}'s Story\n\n", story.name));
        out.push_str(&format!(
            "**Character Code:** {}\n",
            story.code.as_str().to_uppercase()
        ));
        out.push_str(&format!("**Total Spreads:** {}\n", story.spreads.len()));
        out.push_str(
            "**Layout:** 2 pages per spread, 1 image per page, 3-4 sentences per scene\n\n",
        );

        let motifs: Vec<_> = story
            .linked_spreads()
            .flat_map(|s| s.analysis.links())
            .filter_map(|link| link.motif.as_deref())
            .filter_map(|motif| self.world().config().symbol(motif))
            .collect();
        if !motifs.is_empty() {
            out.push_str("**Motifs:**\n");
            for symbol in motifs {
                out.push_str(&format!("- {}: {}\n", symbol.name, symbol.meaning));
            }
            out.push('\n');
        }

        out.push_str("## Story\n\n");
        for assembled in &story.spreads {
            self.push_page(&mut out, assembled.page, &story.code, 3);
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push_str("\n\n");
        }

        let connections = self.connections(story);
        if !connections.is_empty() {
            out.push_str("## Narrative Node Analysis\n\n");
            out.push_str(&format!(
                "This story connects with other characters at {} point(s):\n\n",
                connections.len()
            ));
            for connection in &connections {
                self.push_connection(&mut out, connection, &story.code);
            }
        }

        out
    }

    fn push_connection(&self, out: &mut String, connection: &Connection<'w>, code: &CharacterCode) {
        let other = connection.other;
        out.push_str(&format!(
            "### {} with {} ({}) at spread {}\n\n",
            connection.kind.display_name(),
            other.name,
            other.code.as_str().to_uppercase(),
            connection.spread
        ));
        if let Some(motif) = &connection.motif {
            out.push_str(&format!("**Motif:** {}\n\n", motif));
        }

        if let Some(before) = connection.before {
            out.push_str(&format!("#### Before (from {}'s story)\n\n", other.name));
            self.push_page(out, before, &other.code, 5);
        }

        out.push_str("#### Shared/Connected Page\n\n");
        self.push_page(out, connection.page, code, 5);

        if let Some(after) = connection.after {
            out.push_str(&format!("#### After (from {}'s story)\n\n", other.name));
            self.push_page(out, after, &other.code, 5);
        }
    }

    fn push_page(&self, out: &mut String, page: &PageRecord, code: &CharacterCode, level: usize) {
        let heading = "#".repeat(level);
        let content_heading = "#".repeat(level + 1);

        let others: Vec<String> = self
            .world()
            .page_id(&page.name)
            .map(|id| self.world().page_owners(id))
            .unwrap_or_default()
            .into_iter()
            .filter(|c| *c != code)
            .map(|c| c.as_str().to_uppercase())
            .collect();
        let joint = if others.is_empty() {
            String::new()
        } else {
            format!(" (joint with {})", others.join(", "))
        };

        let tag = page.tag();
        let node_type = match &tag {
            PageTag::Untagged if !others.is_empty() => "Meeting Node",
            PageTag::Untagged | PageTag::Solo => "Solo",
            PageTag::Node(kind) => kind.display_name(),
            PageTag::Unknown(raw) => raw.as_str(),
        };

        let spread = page
            .spread
            .map_or_else(|| "?".to_string(), |s| s.to_string());
        out.push_str(&format!(
            "{} Spread {}: {}{}\n",
            heading, spread, page.name, joint
        ));
        out.push_str(&format!(
            "**Node Type:** {} | **Beat:** {}\n\n",
            node_type,
            page.beat.as_deref().unwrap_or("Unknown beat")
        ));

        out.push_str(&format!("{} Description\n\n", content_heading));
        out.push_str(&format!(
            "{}\n\n",
            page.description
                .as_deref()
                .unwrap_or("No description available")
        ));

        for (index, scene) in page.scenes.iter().enumerate() {
            let side = scene.page.unwrap_or(if index == 0 {
                PageSide::Left
            } else {
                PageSide::Right
            });
            let side = match side {
                PageSide::Left => "Left",
                PageSide::Right => "Right",
            };
            let mut title = match scene.page_number {
                Some(number) => format!("Page {} ({})", number, side),
                None => format!("{} Page", side),
            };
            if !scene.focus.is_empty() {
                title.push_str(&format!(" - {}", scene.focus));
            }
            out.push_str(&format!("{} {}\n\n", content_heading, title));
            out.push_str(&format!("**Visual:**\n{}\n\n", scene.visual.trim()));
            out.push_str(&format!("**Text:**\n{}\n\n", scene.text.trim()));
        }

        if matches!(tag, PageTag::Node(NodeKind::Meeting)) || !others.is_empty() {
            if let Some(location) = &page.location {
                out.push_str(&format!("**Meeting Location:** {}\n\n", location));
            }
            if let Some(action) = &page.shared_action {
                out.push_str(&format!("**Shared Action:** {}\n\n", action));
            }
        }
    }
}
