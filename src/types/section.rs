//! Document sections of a resource node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named section of a node document.
///
/// `Reported` holds the state observed by a collector and is mandatory on
/// every node. `Desired` carries requested target state, `Metadata` carries
/// annotations derived during import (resolved ancestors and the like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// State gathered by the collector.
    Reported,
    /// Requested target state.
    Desired,
    /// Annotations derived during import.
    Metadata,
}

impl Section {
    /// All sections in canonical document order.
    pub const ALL_ORDERED: [Section; 3] =
        [Section::Reported, Section::Desired, Section::Metadata];

    /// Parse a section name from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reported" => Some(Self::Reported),
            "desired" => Some(Self::Desired),
            "metadata" => Some(Self::Metadata),
            _ => None,
        }
    }

    /// Canonical lowercase name as it appears in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "reported",
            Self::Desired => "desired",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parsing() {
        assert_eq!(Section::from_str("reported"), Some(Section::Reported));
        assert_eq!(Section::from_str("DESIRED"), Some(Section::Desired));
        assert_eq!(Section::from_str("metadata"), Some(Section::Metadata));
        assert_eq!(Section::from_str("unknown"), None);
    }

    #[test]
    fn test_section_order() {
        assert_eq!(
            Section::ALL_ORDERED,
            [Section::Reported, Section::Desired, Section::Metadata]
        );
        assert!(Section::Reported < Section::Desired);
        assert!(Section::Desired < Section::Metadata);
    }

    #[test]
    fn test_section_display_roundtrip() {
        for section in Section::ALL_ORDERED {
            assert_eq!(Section::from_str(&section.to_string()), Some(section));
        }
    }
}
