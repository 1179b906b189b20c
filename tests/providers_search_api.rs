// tests/providers_search_api.rs
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use opportunity_digest::config::{AppConfig, SearchApiSource, SourceSpec, MAX_CANDIDATES};
use opportunity_digest::error::SourceError;
use opportunity_digest::ingest::providers::search_api::SearchApiProvider;
use opportunity_digest::ingest::types::SourceProvider;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS_JSON: &str = include_str!("fixtures/search_api.json");

fn source(server: &MockServer) -> SearchApiSource {
    SearchApiSource {
        endpoint: format!("{}/customsearch/v1", server.uri()),
        query: "AI medical imaging course".into(),
        query_param: "q".into(),
        count_param: Some("num".into()),
        max_count: 10,
        api_key_param: Some("key".into()),
        api_key_header: None,
        extra_params: BTreeMap::from([("cx".to_string(), "engine-1".to_string())]),
        results_path: "items".into(),
        title_field: "title".into(),
        link_field: "link".into(),
        snippet_field: "snippet".into(),
        api_key: Some("test-key".into()),
    }
}

#[tokio::test]
async fn sends_query_count_key_and_extras() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("q", "AI medical imaging course"))
        .and(query_param("num", "10"))
        .and(query_param("key", "test-key"))
        .and(query_param("cx", "engine-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let provider = SearchApiProvider::new(&source(&server), 10, Duration::from_secs(5)).unwrap();
    let out = provider.fetch_candidates().await.expect("api ok");

    assert_eq!(out.len(), 3);
    assert_eq!(out[0].title.as_deref(), Some("AI in Medical Imaging Specialization"));
    assert_eq!(out[1].snippet, None);
    assert_eq!(out[2].title, None);
    assert_eq!(out[2].link.as_deref(), Some("https://learn.example.test/untitled"));
}

#[tokio::test]
async fn key_can_travel_in_a_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = source(&server);
    cfg.api_key_param = None;
    cfg.api_key_header = Some("Ocp-Apim-Subscription-Key".into());
    let provider = SearchApiProvider::new(&cfg, 30, Duration::from_secs(5)).unwrap();
    assert_eq!(provider.fetch_candidates().await.unwrap().len(), 3);
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .expect(0)
        .mount(&server)
        .await;

    let mut cfg = source(&server);
    cfg.api_key = None;
    let provider = SearchApiProvider::new(&cfg, 30, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        provider.fetch_candidates().await,
        Err(SourceError::MissingCredential(_))
    ));
}

#[tokio::test]
async fn html_error_page_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>quota exceeded</html>"))
        .mount(&server)
        .await;

    let provider = SearchApiProvider::new(&source(&server), 30, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        provider.fetch_candidates().await,
        Err(SourceError::Malformed(_))
    ));
}

#[tokio::test]
async fn forbidden_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = SearchApiProvider::new(&source(&server), 30, Duration::from_secs(5)).unwrap();
    assert_eq!(provider.fetch_candidates().await.unwrap_err(), SourceError::Status(403));
}

#[tokio::test]
async fn default_source_never_asks_for_more_than_ten() {
    let server = MockServer::start().await;
    // Google CSE rejects num > 10.
    Mock::given(method("GET"))
        .and(query_param("num", "30"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let toml = format!(
        r#"
        [[sources]]
        kind = "search_api"
        endpoint = "{}/customsearch/v1"
        query = "AI in medical imaging course"
        api_key_param = "key"
        "#,
        server.uri()
    );
    let cfg = AppConfig::from_toml_str(&toml, Path::new("inline.toml")).unwrap();
    assert_eq!(cfg.max_candidates, MAX_CANDIDATES);
    let SourceSpec::SearchApi(mut api) = cfg.sources[0].clone() else {
        panic!("expected a search_api source");
    };
    api.api_key = Some("test-key".into());

    let provider = SearchApiProvider::new(&api, cfg.max_candidates, Duration::from_secs(5)).unwrap();
    assert_eq!(provider.fetch_candidates().await.unwrap().len(), 3);
}
