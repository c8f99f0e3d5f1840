use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{validate, CacheKey, CorsGate, GateOutcome, ResponseBuilder, Validation};
use crate::error::ProxyError;
use crate::models::{CacheEntry, HealthResponse, SearchParams, SearchRequest};
use crate::services::{BackendError, BackgroundTasks, ResponseCache, SearchBackend};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SearchBackend>,
    pub cache: Arc<dyn ResponseCache>,
    pub background: BackgroundTasks,
    pub cors: CorsGate,
    pub responses: ResponseBuilder,
}

/// Configure the search route and the health check
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .service(web::resource("/").route(web::route().to(search)));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match state.backend.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Backend health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        backend: state.backend.name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Search endpoint
///
/// `GET /?query=<term>` runs an autocomplete search, `GET /?search=<term>` a
/// full one. HEAD and OPTIONS are answered without touching the backend.
async fn search(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ProxyError> {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    let cors = match state.cors.classify(req.method(), origin) {
        Ok(GateOutcome::Preflight(decision)) => {
            tracing::debug!("Preflight from {:?} (allowed: {})", origin, decision.allowed);
            return Ok(state.responses.preflight(&decision));
        }
        Ok(GateOutcome::Head(decision)) => return Ok(state.responses.head(&decision)),
        Ok(GateOutcome::Get(decision)) => decision,
        Err(e) => {
            tracing::info!("Rejected {} {}", req.method(), req.path());
            return Err(e);
        }
    };

    let params = web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .map_err(|e| ProxyError::BadRequest(format!("Invalid query string: {}", e)))?
        .into_inner();

    let request = match validate(&SearchParams::from_map(params))? {
        Validation::ShortCircuitEmpty => {
            let entry = state.responses.empty_entry().map_err(serialization_error)?;
            return Ok(state.responses.from_entry(&entry, &cors));
        }
        Validation::Search(request) => request,
    };

    let entry = cached_or_fetch(&state, &request).await?;
    Ok(state.responses.from_entry(&entry, &cors))
}

/// Serve from the cache, or call the backend and populate the cache in the
/// background
async fn cached_or_fetch(
    state: &AppState,
    request: &SearchRequest,
) -> Result<CacheEntry, ProxyError> {
    let key = CacheKey::search(request);

    match state.cache.lookup(&key).await {
        Ok(Some(entry)) => {
            tracing::debug!("Cache hit: {}", key);
            return Ok(entry);
        }
        Ok(None) => tracing::debug!("Cache miss: {}", key),
        Err(e) => tracing::warn!("Cache lookup failed for {}, treating as miss: {}", key, e),
    }

    let results = state.backend.search(request).await.map_err(|e| {
        tracing::error!(
            "{} backend failed for {:?}: {}",
            state.backend.name(),
            request.raw_query_term(),
            e
        );
        ProxyError::from(e)
    })?;

    tracing::info!(
        "Backend returned {} results for {:?} (autocomplete: {})",
        results.len(),
        request.raw_query_term(),
        request.is_autocomplete()
    );

    let entry = state.responses.entry(results).map_err(serialization_error)?;
    store_in_background(state, key, entry.clone());

    Ok(entry)
}

fn store_in_background(state: &AppState, key: String, entry: CacheEntry) {
    // A zero TTL still dispatches; the cache decides to keep nothing
    let ttl = Duration::from_secs(state.responses.ttl_secs());
    let cache = Arc::clone(&state.cache);
    state.background.spawn(async move {
        match cache.store(&key, &entry, ttl).await {
            Ok(()) => tracing::trace!("Cache set: {}", key),
            Err(e) => tracing::warn!("Failed to populate cache for {}: {}", key, e),
        }
    });
}

fn serialization_error(e: serde_json::Error) -> ProxyError {
    ProxyError::Backend(BackendError::InvalidResponse(format!(
        "Failed to serialize results: {}",
        e
    )))
}
