// Unit tests for the pipeline stages and the data-API backend

use actix_web::http::Method;
use mockito::Matcher;

use zip_search_proxy::core::{validate, GateOutcome, Validation};
use zip_search_proxy::models::SearchParams;
use zip_search_proxy::services::{BackendError, DataApiClient, SearchBackend};
use zip_search_proxy::{CacheKey, CorsGate, SearchRequest, SearchResult};

fn search_params(query: Option<&str>, search: Option<&str>) -> SearchParams {
    SearchParams {
        query: query.map(str::to_string),
        search: search.map(str::to_string),
    }
}

#[test]
fn test_validated_requests_share_cache_key() {
    let autocomplete = match validate(&search_params(Some("springfield"), None)).unwrap() {
        Validation::Search(req) => req,
        other => panic!("unexpected {:?}", other),
    };
    let full = match validate(&search_params(None, Some("springfield"))).unwrap() {
        Validation::Search(req) => req,
        other => panic!("unexpected {:?}", other),
    };

    assert!(autocomplete.is_autocomplete());
    assert!(!full.is_autocomplete());
    assert_eq!(CacheKey::search(&autocomplete), CacheKey::search(&full));
}

#[test]
fn test_exactly_three_characters_is_searched() {
    assert!(matches!(
        validate(&search_params(None, Some("abc"))).unwrap(),
        Validation::Search(_)
    ));
}

#[test]
fn test_gate_then_validate() {
    let gate = CorsGate::new("https://zips.example.com");
    assert!(matches!(
        gate.classify(&Method::GET, None).unwrap(),
        GateOutcome::Get(_)
    ));
    assert!(gate.classify(&Method::POST, None).is_err());
}

#[tokio::test]
async fn test_data_api_sends_query_and_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "springfield".into()),
            Matcher::UrlEncoded("autocomplete".into(), "false".into()),
        ]))
        .match_header("api-key", "secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results":[{"zip":"01001","name":"Springfield"}]}"#)
        .create_async()
        .await;

    let client =
        DataApiClient::new(format!("{}/search", server.url()), "secret".to_string(), None).unwrap();
    let results = client
        .search(&SearchRequest::new("springfield", false))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        results,
        vec![SearchResult {
            zip: "01001".to_string(),
            name: "Springfield".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_data_api_custom_header_and_autocomplete() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "new york".into()),
            Matcher::UrlEncoded("autocomplete".into(), "true".into()),
        ]))
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = DataApiClient::new(
        format!("{}/search", server.url()),
        "secret".to_string(),
        Some("x-api-key".to_string()),
    )
    .unwrap();
    let results = client
        .search(&SearchRequest::new("new york", true))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_data_api_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let client =
        DataApiClient::new(format!("{}/search", server.url()), "secret".to_string(), None).unwrap();
    let err = client
        .search(&SearchRequest::new("springfield", false))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::ApiError(_)));
}

#[tokio::test]
async fn test_data_api_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let client =
        DataApiClient::new(format!("{}/search", server.url()), "secret".to_string(), None).unwrap();
    let err = client
        .search(&SearchRequest::new("springfield", false))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_data_api_unreachable() {
    let client =
        DataApiClient::new("http://127.0.0.1:1/search".to_string(), "secret".to_string(), None)
            .unwrap();
    let err = client
        .search(&SearchRequest::new("springfield", false))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::RequestError(_)));
}
