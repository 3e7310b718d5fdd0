use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Granularity of a structure record partition.
///
/// A record carries its attribute columns at one or both of these resolutions.
/// Representation builders and the contact detector select which partition to
/// read through this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// One element per residue, positioned at a representative backbone atom.
    Residue,
    /// One element per atom.
    Atom,
}

impl Resolution {
    /// Returns the canonical lowercase name used in cache directory slugs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Residue => "residue",
            Resolution::Atom => "atom",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("unknown resolution '{0}', expected 'residue' or 'atom'")]
pub struct ParseResolutionError(String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "residue" => Ok(Resolution::Residue),
            "atom" => Ok(Resolution::Atom),
            other => Err(ParseResolutionError(other.to_string())),
        }
    }
}
