//! Validated sorted set key

use crate::error::{PaginatorError, PaginatorResult};
use std::fmt;

/// Name of a sorted set in the store. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortedSetKey(String);

impl SortedSetKey {
    /// Validate a key before it reaches the store
    pub fn parse(key: impl Into<String>) -> PaginatorResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(PaginatorError::InvalidKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SortedSetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SortedSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_named_set() {
        let key = SortedSetKey::parse("leaderboard").unwrap();
        assert_eq!(key.as_str(), "leaderboard");
        assert_eq!(key.to_string(), "leaderboard");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            SortedSetKey::parse(""),
            Err(PaginatorError::InvalidKey)
        ));
    }
}
