//! Keyword search results.

use serde::Serialize;

use crate::models::CweEntry;

/// Weaknesses matching a keyword, in upstream listing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Keyword as the caller supplied it.
    pub keyword: String,
    /// Matches found before truncation.
    pub total_matches: usize,
    /// True when `total_matches` exceeded the requested maximum.
    pub truncated: bool,
    #[serde(rename = "Weaknesses")]
    pub entries: Vec<CweEntry>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
