//! Zip Search Proxy - edge search proxy for postal-code and city lookups
//!
//! Validates `query`/`search` lookups, gates them on a single allowed CORS
//! origin, serves repeats from a response cache and forwards misses to either
//! an HTTP data API or PostgreSQL.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CacheKey, CorsGate, ResponseBuilder};
pub use error::ProxyError;
pub use models::{CacheEntry, CorsDecision, SearchRequest, SearchResult};
pub use routes::search::AppState;
