use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ulid::{Generator, Ulid};

/// Opaque identifier for boards, lists and cards.
///
/// Freshly generated identifiers are ULIDs, but any non-empty string is
/// accepted so that data written by older versions keeps its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = crate::error::PinboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::error::PinboardError::InvalidId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Ulid> for Identifier {
    fn from(value: Ulid) -> Self {
        Self(value.to_string())
    }
}

/// Produces identifiers that never repeat within a session.
///
/// Each value is a 48-bit millisecond timestamp followed by 80 random bits.
/// Within the same millisecond the random part is incremented, so values are
/// strictly increasing for the lifetime of the generator.
pub struct IdGenerator {
    inner: Generator,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Generator::new(),
        }
    }

    /// Returns a fresh identifier
    pub fn next_id(&mut self) -> Identifier {
        match self.inner.generate() {
            Ok(ulid) => ulid.into(),
            // Random part overflowed inside one millisecond; start a new one.
            Err(_) => {
                std::thread::sleep(std::time::Duration::from_millis(1));
                self.inner
                    .generate()
                    .unwrap_or_else(|_| Ulid::new())
                    .into()
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let mut gen = IdGenerator::new();
        let ids: HashSet<Identifier> = (0..10_000).map(|_| gen.next_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut gen = IdGenerator::new();
        let mut previous = gen.next_id();
        for _ in 0..1_000 {
            let next = gen.next_id();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_separate_generators_do_not_collide() {
        let mut a = IdGenerator::new();
        let mut b = IdGenerator::new();
        let left: HashSet<Identifier> = (0..500).map(|_| a.next_id()).collect();
        assert!((0..500).all(|_| !left.contains(&b.next_id())));
    }

    #[test]
    fn test_identifier_parsing() {
        let id = Identifier::from_str("1700000000000abc123xyz").unwrap();
        assert_eq!(id.as_str(), "1700000000000abc123xyz");

        let id = Identifier::from_str("  padded ").unwrap();
        assert_eq!(id.as_str(), "padded");

        assert!(Identifier::from_str("").is_err());
        assert!(Identifier::from_str("   ").is_err());
    }

    #[test]
    fn test_identifier_serializes_as_plain_string() {
        let id = Identifier::from_str("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");

        let back: Identifier = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
