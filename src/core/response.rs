use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, HttpResponseBuilder};
use std::collections::BTreeMap;

use crate::models::{CacheEntry, CorsDecision, SearchResponse, SearchResult};

/// Assembles outward responses for the search route
#[derive(Debug, Clone, Copy)]
pub struct ResponseBuilder {
    ttl_secs: u64,
}

impl ResponseBuilder {
    pub fn new(ttl_secs: u64) -> Self {
        Self { ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// `maxage` (without the dash) matches what deployed clients already cache against
    pub fn cache_control(&self) -> String {
        format!("public, maxage={}, immutable", self.ttl_secs)
    }

    /// Serialize a result list into a cacheable entry
    pub fn entry(&self, results: Vec<SearchResult>) -> Result<CacheEntry, serde_json::Error> {
        let body = serde_json::to_string(&SearchResponse { results })?;

        let headers = BTreeMap::from([
            (header::CONTENT_TYPE.to_string(), "application/json".to_string()),
            (header::CACHE_CONTROL.to_string(), self.cache_control()),
        ]);

        Ok(CacheEntry {
            status: StatusCode::OK.as_u16(),
            headers,
            body,
        })
    }

    /// Entry used for terms too short to search
    pub fn empty_entry(&self) -> Result<CacheEntry, serde_json::Error> {
        self.entry(Vec::new())
    }

    /// Turn an entry (fresh or cached) into a response
    pub fn from_entry(&self, entry: &CacheEntry, cors: &CorsDecision) -> HttpResponse {
        let status = StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK);
        let mut builder = HttpResponse::build(status);

        for (name, value) in &entry.headers {
            builder.insert_header((name.as_str(), value.as_str()));
        }
        apply_cors(&mut builder, cors);

        builder.body(entry.body.clone())
    }

    /// 200 with no body
    pub fn head(&self, cors: &CorsDecision) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        apply_cors(&mut builder, cors);
        builder.finish()
    }

    /// 204 with no body
    pub fn preflight(&self, cors: &CorsDecision) -> HttpResponse {
        let mut builder = HttpResponse::NoContent();
        apply_cors(&mut builder, cors);
        builder.finish()
    }
}

fn apply_cors(builder: &mut HttpResponseBuilder, cors: &CorsDecision) {
    for (name, value) in &cors.headers {
        builder.insert_header((*name, value.as_str()));
    }
}
