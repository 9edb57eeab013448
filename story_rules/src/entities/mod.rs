//! Entity definitions for a storybook set.

mod character;
mod page;

pub use character::*;
pub use page::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of spreads in every character's book.
pub const SPREAD_COUNT: u8 = 12;

/// Spreads that always belong to exactly one character: the opening and the
/// two closing spreads. No narrative node may place content on them.
pub const EXCLUSIVE_SPREADS: [u8; 3] = [1, 11, 12];

/// Errors raised when an identifier is out of its domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("spread number {0} is outside 1..={SPREAD_COUNT}")]
    SpreadOutOfRange(u8),

    #[error("character code must not be empty")]
    EmptyCode,
}

/// Short lowercase code identifying a character (e.g. `el`).
///
/// The code is kept verbatim; whether it follows the lowercase fixed-width
/// convention is checked by the naming grammar, not at construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterCode(String);

impl CharacterCode {
    /// Create a code, rejecting only the empty string.
    pub fn new(code: impl Into<String>) -> Result<Self, IdentifierError> {
        let code = code.into();
        if code.is_empty() {
            return Err(IdentifierError::EmptyCode);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for CharacterCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Position of a spread within a book, always in `1..=SPREAD_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SpreadNumber(u8);

impl SpreadNumber {
    pub const FIRST: SpreadNumber = SpreadNumber(1);
    pub const LAST: SpreadNumber = SpreadNumber(SPREAD_COUNT);

    /// Create a spread number, rejecting values outside the book.
    pub fn new(value: u8) -> Result<Self, IdentifierError> {
        if (1..=SPREAD_COUNT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(IdentifierError::SpreadOutOfRange(value))
        }
    }

    /// Spread number for a zero-based position in a story list.
    pub fn from_index(index: usize) -> Result<Self, IdentifierError> {
        let value = u8::try_from(index + 1).unwrap_or(u8::MAX);
        Self::new(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into a story list.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// All spread numbers of a book, in order.
    pub fn all() -> impl Iterator<Item = SpreadNumber> {
        (1..=SPREAD_COUNT).map(SpreadNumber)
    }

    /// Whether the spread is reserved for a single character.
    pub fn is_exclusive(self) -> bool {
        EXCLUSIVE_SPREADS.contains(&self.0)
    }

    /// The preceding spread, if any.
    pub fn previous(self) -> Option<SpreadNumber> {
        Self::new(self.0 - 1).ok()
    }

    /// The following spread, if any.
    pub fn next(self) -> Option<SpreadNumber> {
        Self::new(self.0 + 1).ok()
    }
}

impl TryFrom<u8> for SpreadNumber {
    type Error = IdentifierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpreadNumber> for u8 {
    fn from(spread: SpreadNumber) -> Self {
        spread.0
    }
}

impl std::fmt::Display for SpreadNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_number_bounds() {
        assert!(SpreadNumber::new(0).is_err());
        assert!(SpreadNumber::new(1).is_ok());
        assert!(SpreadNumber::new(12).is_ok());
        assert_eq!(
            SpreadNumber::new(13),
            Err(IdentifierError::SpreadOutOfRange(13))
        );
    }

    #[test]
    fn test_spread_number_navigation() {
        assert_eq!(SpreadNumber::FIRST.previous(), None);
        assert_eq!(SpreadNumber::LAST.next(), None);
        assert_eq!(SpreadNumber::new(5).unwrap().next().unwrap().get(), 6);
        assert_eq!(SpreadNumber::from_index(0).unwrap(), SpreadNumber::FIRST);
        assert_eq!(SpreadNumber::LAST.index(), 11);
        assert_eq!(SpreadNumber::all().count(), 12);
        assert!(SpreadNumber::new(11).unwrap().is_exclusive());
        assert!(!SpreadNumber::new(10).unwrap().is_exclusive());
    }

    #[test]
    fn test_spread_number_deserialize_rejects_out_of_range() {
        let ok: SpreadNumber = serde_json::from_value(serde_json::json!(7)).unwrap();
        assert_eq!(ok.get(), 7);

        let bad: Result<SpreadNumber, _> = serde_json::from_value(serde_json::json!(13));
        assert!(bad.is_err());
    }

    #[test]
    fn test_character_code() {
        assert_eq!(CharacterCode::new(""), Err(IdentifierError::EmptyCode));
        let code = CharacterCode::new("el").unwrap();
        assert_eq!(code.as_str(), "el");
        assert_eq!(code.to_string(), "el");
    }
}
