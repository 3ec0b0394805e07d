use std::fmt;

use serde::{Deserialize, Serialize};

/// Taxing authority a table or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    Federal,
    California,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Federal => "federal",
            Self::California => "california",
        }
    }

    /// Accepts the canonical name plus the short codes used in data files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "federal" | "fed" | "us" => Some(Self::Federal),
            "california" | "ca" => Some(Self::California),
            _ => None,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
