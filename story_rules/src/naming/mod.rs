//! Record naming grammar.
//!
//! Records are identified by name alone, independent of where they are
//! stored:
//!
//! - solo page: `{code}-{NN}`
//! - meeting page: participant codes sorted and hyphen-joined, then `-{NN}`
//! - mirrored/resonant page: `{code}-{NN}`, same as solo
//! - node definition: `{kind}-{NN}`

use thiserror::Error;

use crate::entities::{CharacterCode, SpreadNumber};
use crate::nodes::NodeKind;

/// Conventional width of a character code.
pub const CODE_WIDTH: usize = 2;

/// File extensions tolerated on story entries.
pub const RECORD_EXTENSIONS: [&str; 3] = ["toml", "yaml", "yml"];

/// Errors from parsing record names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("record name is empty")]
    Empty,

    #[error("'{0}' contains a path separator; use the bare record name")]
    PathSeparator(String),

    #[error("'{0}' does not end in a two-digit spread number")]
    MissingSpread(String),

    #[error("'{name}' has an invalid segment '{segment}'")]
    BadSegment { name: String, segment: String },
}

/// Components of a page record name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageName {
    /// Character codes in the order written.
    pub codes: Vec<String>,
    /// Spread number as written; not range-checked.
    pub spread: u8,
}

/// Check a character code against the lowercase fixed-width convention.
pub fn is_valid_code(code: &str, width: usize) -> bool {
    code.len() == width && code.chars().all(|c| c.is_ascii_lowercase())
}

/// Name of a solo (or mirrored/resonant) page, e.g. `el-03`.
pub fn solo_page_name(code: &CharacterCode, spread: SpreadNumber) -> String {
    format!("{}-{:02}", code, spread.get())
}

/// Name of a shared meeting page, e.g. `el-no-07`.
pub fn meeting_page_name<'a, I>(codes: I, spread: SpreadNumber) -> String
where
    I: IntoIterator<Item = &'a CharacterCode>,
{
    let mut codes: Vec<&str> = codes.into_iter().map(CharacterCode::as_str).collect();
    codes.sort_unstable();
    codes.dedup();
    format!("{}-{:02}", codes.join("-"), spread.get())
}

/// Name of a node definition, e.g. `mirrored-05`.
pub fn node_definition_name(kind: NodeKind, spread: SpreadNumber) -> String {
    format!("{}-{:02}", kind, spread.get())
}

fn split_spread(name: &str) -> Result<(&str, u8), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let (head, digits) = name
        .rsplit_once('-')
        .ok_or_else(|| NameError::MissingSpread(name.to_string()))?;
    if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(NameError::MissingSpread(name.to_string()));
    }
    let spread = digits
        .parse::<u8>()
        .map_err(|_| NameError::MissingSpread(name.to_string()))?;
    Ok((head, spread))
}

/// Parse a page record name into its codes and spread number.
pub fn parse_page_name(name: &str) -> Result<PageName, NameError> {
    let (head, spread) = split_spread(name)?;
    let codes: Vec<String> = head.split('-').map(str::to_string).collect();
    if let Some(bad) = codes
        .iter()
        .find(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_lowercase()))
    {
        return Err(NameError::BadSegment {
            name: name.to_string(),
            segment: bad.clone(),
        });
    }
    Ok(PageName { codes, spread })
}

/// Parse a node definition name into its kind and spread number.
pub fn parse_node_name(name: &str) -> Result<(NodeKind, u8), NameError> {
    let (head, spread) = split_spread(name)?;
    let kind = head.parse::<NodeKind>().map_err(|_| NameError::BadSegment {
        name: name.to_string(),
        segment: head.to_string(),
    })?;
    Ok((kind, spread))
}

/// Turn a story entry into a bare record name.
///
/// A known file extension is stripped; path separators are rejected.
pub fn normalize_reference(entry: &str) -> Result<String, NameError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(NameError::Empty);
    }
    if entry.contains('/') || entry.contains('\\') {
        return Err(NameError::PathSeparator(entry.to_string()));
    }
    let bare = entry
        .rsplit_once('.')
        .filter(|(_, ext)| RECORD_EXTENSIONS.contains(ext))
        .map_or(entry, |(stem, _)| stem);
    Ok(bare.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(c: &str) -> CharacterCode {
        CharacterCode::new(c).unwrap()
    }

    fn spread(n: u8) -> SpreadNumber {
        SpreadNumber::new(n).unwrap()
    }

    #[test]
    fn test_page_names() {
        assert_eq!(solo_page_name(&code("el"), spread(3)), "el-03");
        assert_eq!(
            meeting_page_name([&code("no"), &code("el")], spread(7)),
            "el-no-07"
        );
        assert_eq!(
            node_definition_name(NodeKind::Mirrored, spread(12)),
            "mirrored-12"
        );
    }

    #[test]
    fn test_parse_page_name() {
        let parsed = parse_page_name("el-no-07").unwrap();
        assert_eq!(parsed.codes, vec!["el", "no"]);
        assert_eq!(parsed.spread, 7);

        assert_eq!(
            parse_page_name("el-7"),
            Err(NameError::MissingSpread("el-7".to_string()))
        );
        assert!(matches!(
            parse_page_name("El-07"),
            Err(NameError::BadSegment { .. })
        ));
        assert!(parse_page_name("07").is_err());
        assert!(parse_page_name("-07").is_err());
    }

    #[test]
    fn test_parse_node_name() {
        assert_eq!(parse_node_name("resonant-09"), Ok((NodeKind::Resonant, 9)));
        assert!(parse_node_name("solo-09").is_err());
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference("el-01.yaml").unwrap(), "el-01");
        assert_eq!(normalize_reference("el-01.toml").unwrap(), "el-01");
        assert_eq!(normalize_reference(" el-01 ").unwrap(), "el-01");
        assert_eq!(
            normalize_reference("pages/el-01.yaml"),
            Err(NameError::PathSeparator("pages/el-01.yaml".to_string()))
        );
        assert_eq!(normalize_reference(""), Err(NameError::Empty));
    }

    #[test]
    fn test_code_convention() {
        assert!(is_valid_code("el", CODE_WIDTH));
        assert!(!is_valid_code("elo", CODE_WIDTH));
        assert!(!is_valid_code("E1", CODE_WIDTH));
    }
}
