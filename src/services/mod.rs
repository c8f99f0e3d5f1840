// Service exports
pub mod backend;
pub mod background;
pub mod cache;
pub mod data_api;
pub mod postgres;

pub use backend::{BackendError, SearchBackend};
pub use background::BackgroundTasks;
pub use cache::{CacheError, MemoryCache, RedisCache, ResponseCache, TieredCache};
pub use data_api::DataApiClient;
pub use postgres::PostgresClient;
