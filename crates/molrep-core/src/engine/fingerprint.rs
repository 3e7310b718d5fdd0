use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identity of the hook pair a dataset was persisted with.
///
/// Built from the hooks' declared tags, never from their captured state, so
/// the identity is stable across processes. Two hooks sharing a tag are the
/// same hook as far as the cache is concerned; that coarseness is the
/// contract, not an accident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// `pre_transform=<tag>;pre_filter=<tag>`, with `none` for an absent
    /// hook.
    pub fn from_tags(pre_transform: Option<&str>, pre_filter: Option<&str>) -> Self {
        Self(format!(
            "pre_transform={};pre_filter={}",
            pre_transform.unwrap_or("none"),
            pre_filter.unwrap_or("none"),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
