use actix_web::http::Method;
use std::collections::BTreeMap;

use crate::error::ProxyError;
use crate::models::CorsDecision;

/// Request classification produced by the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// OPTIONS: answer with CORS headers and no body
    Preflight(CorsDecision),
    /// HEAD: answer 200 with CORS headers and no body
    Head(CorsDecision),
    /// GET: continue to validation. Headers are only present when the
    /// caller's origin matched.
    Get(CorsDecision),
}

/// Single-origin CORS gate
#[derive(Debug, Clone)]
pub struct CorsGate {
    allowed_origin: String,
}

impl CorsGate {
    pub fn new(allowed_origin: impl Into<String>) -> Self {
        Self {
            allowed_origin: allowed_origin.into(),
        }
    }

    /// Classify a request by method and `Origin` header
    pub fn classify(&self, method: &Method, origin: Option<&str>) -> Result<GateOutcome, ProxyError> {
        let matched = origin == Some(self.allowed_origin.as_str());

        match *method {
            // Matched and unmatched preflights get the same answer; the
            // header always names the configured origin, never the caller's.
            Method::OPTIONS => Ok(GateOutcome::Preflight(CorsDecision {
                allowed: matched,
                headers: self.headers(),
            })),
            Method::HEAD => Ok(GateOutcome::Head(CorsDecision {
                allowed: matched,
                headers: self.headers(),
            })),
            Method::GET if matched => Ok(GateOutcome::Get(CorsDecision {
                allowed: true,
                headers: self.headers(),
            })),
            Method::GET => Ok(GateOutcome::Get(CorsDecision::none())),
            _ => Err(ProxyError::MethodNotAllowed(method.to_string())),
        }
    }

    fn headers(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("access-control-allow-origin", self.allowed_origin.clone()),
            ("access-control-allow-methods", "GET, HEAD, OPTIONS".to_string()),
            ("access-control-allow-headers", "Content-Type".to_string()),
            ("access-control-max-age", "86400".to_string()),
            ("vary", "Origin".to_string()),
        ])
    }
}
