use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated lookup, built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    raw_query_term: String,
    is_autocomplete: bool,
}

impl SearchRequest {
    pub fn new(raw_query_term: impl Into<String>, is_autocomplete: bool) -> Self {
        Self {
            raw_query_term: raw_query_term.into(),
            is_autocomplete,
        }
    }

    /// The term exactly as the caller sent it (no trimming)
    pub fn raw_query_term(&self) -> &str {
        &self.raw_query_term
    }

    /// True when the request came in through the `query` field
    pub fn is_autocomplete(&self) -> bool {
        self.is_autocomplete
    }
}

/// A single postal-code hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub zip: String,
    pub name: String,
}

/// Serialized response as held by the response cache.
///
/// CORS headers are deliberately absent: they depend on the caller's origin
/// and are applied when the entry is turned back into a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Outcome of the origin check for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allowed: bool,
    pub headers: BTreeMap<&'static str, String>,
}

impl CorsDecision {
    /// A decision that attaches nothing to the response
    pub fn none() -> Self {
        Self {
            allowed: false,
            headers: BTreeMap::new(),
        }
    }
}
