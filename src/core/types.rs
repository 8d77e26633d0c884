//! Common types used throughout tinyenv

use serde::{Deserialize, Serialize};

use super::error::TinyenvError;

/// Supported language ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Java,
    Node,
    Perl,
    Python,
    Raku,
    Ruby,
    Solr,
}

impl Language {
    /// Every supported language, in declaration order
    pub const ALL: &'static [Self] = &[
        Self::Go,
        Self::Java,
        Self::Node,
        Self::Perl,
        Self::Python,
        Self::Raku,
        Self::Ruby,
        Self::Solr,
    ];

    /// Directory and shim-owner name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Java => "java",
            Self::Node => "node",
            Self::Perl => "perl",
            Self::Python => "python",
            Self::Raku => "raku",
            Self::Ruby => "ruby",
            Self::Solr => "solr",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = TinyenvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == s)
            .ok_or_else(|| TinyenvError::UnknownLanguage(s.to_string()))
    }
}
