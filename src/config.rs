use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// TTL used when the configured value is missing or not a non-negative integer
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub cors: CorsSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origin: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Kept as text: anything that does not parse falls back to the default
    pub ttl_secs: Option<String>,
    pub l1_capacity: Option<u64>,
    pub redis_url: Option<String>,
}

impl CacheSettings {
    /// Effective TTL in seconds
    pub fn ttl(&self) -> u64 {
        parse_ttl(self.ttl_secs.as_deref())
    }
}

/// Which backend strategy serves searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    DataApi,
    Database,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub mode: BackendMode,
    pub data_api: Option<DataApiSettings>,
    pub database: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataApiSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_key_header: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_zip_column")]
    pub zip_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
}

fn default_table() -> String { "zipcodes".to_string() }
fn default_zip_column() -> String { "zip".to_string() }
fn default_name_column() -> String { "name".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with ZIPSEARCH__)
    /// 4. Shortcut variables such as DATABASE_URL and CACHE_TTL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ZIPSEARCH__CORS__ALLOWED_ORIGIN -> cors.allowed_origin
            .add_source(environment())
            .build()?;

        let settings = apply_env_shortcuts(settings, |name| std::env::var(name).ok())?;

        settings.try_deserialize()
    }

    /// Check that the selected backend has its section filled in
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend.mode {
            BackendMode::DataApi if self.backend.data_api.is_none() => Err(ConfigError::Message(
                "backend.mode is data_api but [backend.data_api] is missing".to_string(),
            )),
            BackendMode::Database if self.backend.database.is_none() => Err(ConfigError::Message(
                "backend.mode is database but [backend.database] is missing".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ZIPSEARCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Map well-known deployment variables onto their config keys
fn apply_env_shortcuts<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    const SHORTCUTS: [(&str, &str); 5] = [
        ("DATABASE_URL", "backend.database.url"),
        ("DATA_API_ENDPOINT", "backend.data_api.endpoint"),
        ("DATA_API_KEY", "backend.data_api.api_key"),
        ("ALLOWED_ORIGIN", "cors.allowed_origin"),
        ("CACHE_TTL", "cache.ttl_secs"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in SHORTCUTS {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

/// Parse a TTL; only non-negative integers are accepted
pub fn parse_ttl(raw: Option<&str>) -> u64 {
    match raw.map(str::parse::<u64>) {
        Some(Ok(ttl)) => ttl,
        Some(Err(_)) => {
            tracing::warn!(
                "Invalid cache TTL {:?}, using {}s",
                raw.unwrap_or_default(),
                DEFAULT_CACHE_TTL_SECS
            );
            DEFAULT_CACHE_TTL_SECS
        }
        None => DEFAULT_CACHE_TTL_SECS,
    }
}
