use crate::error::ProxyError;
use crate::models::{SearchParams, SearchRequest};

/// Terms shorter than this never reach the backend
pub const MIN_TERM_LENGTH: usize = 3;

/// Outcome of validating the search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Respond with an empty result set without touching cache or backend
    ShortCircuitEmpty,
    Search(SearchRequest),
}

/// Validate the `query` / `search` pair.
///
/// Exactly one of the two must carry a value; an empty value counts as
/// absent. Length is checked on the raw value in UTF-16 code units, matching
/// browser string length. No trimming happens anywhere.
pub fn validate(params: &SearchParams) -> Result<Validation, ProxyError> {
    let query = params.query.as_deref().filter(|value| !value.is_empty());
    let search = params.search.as_deref().filter(|value| !value.is_empty());

    let (entry, is_autocomplete) = match (query, search) {
        (Some(query), None) => (query, true),
        (None, Some(search)) => (search, false),
        (None, None) => {
            return Err(ProxyError::BadRequest(
                "Missing search parameter: supply either `query` or `search`".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(ProxyError::BadRequest(
                "Ambiguous search: supply only one of `query` or `search`".to_string(),
            ))
        }
    };

    if entry.encode_utf16().count() < MIN_TERM_LENGTH {
        return Ok(Validation::ShortCircuitEmpty);
    }

    Ok(Validation::Search(SearchRequest::new(entry, is_autocomplete)))
}
