use serde::{Deserialize, Serialize};
use crate::models::domain::SearchResult;

/// Body of every successful search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
