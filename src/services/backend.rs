use async_trait::async_trait;
use thiserror::Error;

use crate::models::{SearchRequest, SearchResult};

/// Errors raised while talking to the backend store
#[derive(Debug, Error)]
pub enum BackendError {
    /// The parser was handed no response at all
    #[error("Unexpected call: no response to parse")]
    UnexpectedCall,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Trait for search backends
///
/// Both the HTTP data API and the direct database driver implement this, so
/// the request handler never knows which one it is talking to.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short name used in logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Run a search. Result order is whatever the store returned.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, BackendError>;

    /// Check that the store is reachable
    async fn health_check(&self) -> Result<bool, BackendError>;
}

/// Maximum rows returned for a search
pub fn result_limit(request: &SearchRequest) -> usize {
    if request.is_autocomplete() {
        10
    } else {
        50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_limit() {
        assert_eq!(result_limit(&SearchRequest::new("spring", true)), 10);
        assert_eq!(result_limit(&SearchRequest::new("spring", false)), 50);
    }
}
