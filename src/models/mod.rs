// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CacheEntry, CorsDecision, SearchRequest, SearchResult};
pub use requests::SearchParams;
pub use responses::{HealthResponse, SearchResponse};
