// Request pipeline stages
pub mod cache_key;
pub mod cors;
pub mod response;
pub mod validator;

pub use cache_key::CacheKey;
pub use cors::{CorsGate, GateOutcome};
pub use response::ResponseBuilder;
pub use validator::{validate, Validation, MIN_TERM_LENGTH};
