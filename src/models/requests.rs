use std::collections::HashMap;

/// Raw search parameters pulled off the query string.
///
/// Values are kept verbatim, so `?query=` yields `Some("")`. The validator
/// decides what an empty value means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub search: Option<String>,
}

impl SearchParams {
    pub fn from_map(mut map: HashMap<String, String>) -> Self {
        Self {
            query: map.remove("query"),
            search: map.remove("search"),
        }
    }
}
