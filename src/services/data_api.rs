use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::models::{SearchRequest, SearchResult};
use crate::services::backend::{BackendError, SearchBackend};

/// Header carrying the API key when none is configured
pub const DEFAULT_API_KEY_HEADER: &str = "api-key";

/// HTTP data-API backend
///
/// Issues `GET <endpoint>?search=<term>&autocomplete=<bool>` with the API key
/// in a request header and reads the `results` array from the JSON reply.
pub struct DataApiClient {
    endpoint: String,
    api_key: String,
    api_key_header: String,
    client: Client,
}

impl DataApiClient {
    /// Create a new data-API client
    pub fn new(
        endpoint: String,
        api_key: String,
        api_key_header: Option<String>,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().build()?;

        Ok(Self {
            endpoint,
            api_key,
            api_key_header: api_key_header.unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            client,
        })
    }

    fn search_url(&self, request: &SearchRequest) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.endpoint, separator, query_string(request))
    }
}

#[async_trait]
impl SearchBackend for DataApiClient {
    fn name(&self) -> &'static str {
        "data_api"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, BackendError> {
        let url = self.search_url(request);

        tracing::debug!("Querying data API: {}", url);

        let response = self
            .client
            .get(&url)
            .header(self.api_key_header.as_str(), &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Data API search failed: {} - {}", status, body);
            return Err(BackendError::ApiError(format!("Search failed: {}", status)));
        }

        let body = response.text().await?;
        let results = parse_results(Some(body.as_str()))?;

        tracing::debug!("Data API returned {} results", results.len());

        Ok(results)
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        let response = self
            .client
            .head(&self.endpoint)
            .header(self.api_key_header.as_str(), &self.api_key)
            .send()
            .await?;

        Ok(!response.status().is_server_error())
    }
}

/// Serialize `{search, autocomplete}` as percent-encoded `key=value` pairs
pub fn query_string(request: &SearchRequest) -> String {
    let autocomplete = request.is_autocomplete().to_string();
    [("search", request.raw_query_term()), ("autocomplete", autocomplete.as_str())]
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a data-API reply body.
///
/// A missing or null `results` field is an empty result set. A bare JSON array
/// is read as the result list itself.
pub fn parse_results(body: Option<&str>) -> Result<Vec<SearchResult>, BackendError> {
    let body = body.ok_or(BackendError::UnexpectedCall)?;

    let json: Value = serde_json::from_str(body)
        .map_err(|e| BackendError::InvalidResponse(format!("Body is not JSON: {}", e)))?;

    let results = match json {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("results") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(results) => results,
        },
        other => {
            return Err(BackendError::InvalidResponse(format!(
                "Expected an object or array, got {}",
                other
            )))
        }
    };

    serde_json::from_value(results)
        .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse results: {}", e)))
}
