use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use zip_search_proxy::config::{BackendMode, CacheSettings, Settings};
use zip_search_proxy::routes;
use zip_search_proxy::services::{
    BackendError, BackgroundTasks, CacheError, DataApiClient, MemoryCache, PostgresClient,
    RedisCache, ResponseCache, SearchBackend, TieredCache,
};
use zip_search_proxy::{AppState, CorsGate, ResponseBuilder};

const DEFAULT_L1_CAPACITY: u64 = 10_000;

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn build_backend(settings: &Settings) -> Result<Arc<dyn SearchBackend>, BackendError> {
    match settings.backend.mode {
        BackendMode::DataApi => {
            let api = settings.backend.data_api.clone().ok_or_else(|| {
                BackendError::InvalidConfig("missing [backend.data_api]".to_string())
            })?;
            Ok(Arc::new(DataApiClient::new(
                api.endpoint,
                api.api_key,
                api.api_key_header,
            )?))
        }
        BackendMode::Database => {
            let db = settings.backend.database.clone().ok_or_else(|| {
                BackendError::InvalidConfig("missing [backend.database]".to_string())
            })?;
            Ok(Arc::new(PostgresClient::new(
                db.url,
                &db.table,
                &db.zip_column,
                &db.name_column,
            )?))
        }
    }
}

async fn build_cache(settings: &CacheSettings) -> Result<Arc<dyn ResponseCache>, CacheError> {
    let l1 = MemoryCache::new(settings.l1_capacity.unwrap_or(DEFAULT_L1_CAPACITY));

    match &settings.redis_url {
        Some(url) => {
            let l2 = RedisCache::new(url).await?;
            Ok(Arc::new(TieredCache::new(l1, l2)))
        }
        None => Ok(Arc::new(l1)),
    }
}

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load()
        .and_then(|settings| settings.validate().map(|_| settings))
        .map_err(|e| startup_error(format!("Configuration error: {}", e)))?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting zip search proxy...");

    let backend = build_backend(&settings).map_err(|e| {
        error!("Failed to initialize backend: {}", e);
        startup_error(e)
    })?;

    info!("Backend initialized ({})", backend.name());

    let cache = build_cache(&settings.cache).await.map_err(|e| {
        error!("Failed to connect to Redis: {}", e);
        startup_error(e)
    })?;

    let ttl = settings.cache.ttl();
    info!(
        "Response cache initialized (TTL: {}s, shared: {})",
        ttl,
        settings.cache.redis_url.is_some()
    );

    let background = BackgroundTasks::new();

    let app_state = AppState {
        backend,
        cache,
        background: background.clone(),
        cors: CorsGate::new(settings.cors.allowed_origin.clone()),
        responses: ResponseBuilder::new(ttl),
    };

    info!("Allowed CORS origin: {}", settings.cors.allowed_origin);

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await?;

    info!("HTTP server stopped, flushing {} pending cache writes", background.pending());
    background.flush().await;

    Ok(())
}
