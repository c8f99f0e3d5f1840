use crate::models::SearchRequest;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Namespace shared by every search entry
    pub const PREFIX: &'static str = "search:";

    /// Build the cache key for a search.
    ///
    /// The autocomplete flag is not part of the key, so `?query=x` and
    /// `?search=x` share one entry.
    pub fn search(request: &SearchRequest) -> String {
        format!("{}{}", Self::PREFIX, request.raw_query_term())
    }
}
