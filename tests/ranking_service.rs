// tests/ranking_service.rs
use std::time::Duration;

use opportunity_digest::config::RankingConfig;
use opportunity_digest::ingest::types::RawCandidate;
use opportunity_digest::normalize::Opportunity;
use opportunity_digest::rank::{build_ranker, Digest};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS: &str = "/v1/chat/completions";

fn opportunities(n: usize) -> Vec<Opportunity> {
    (0..n)
        .map(|i| {
            Opportunity::from(RawCandidate {
                title: Some(format!("Course {i}")),
                link: Some(format!("https://learn.example.test/{i}")),
                snippet: Some(format!("About course {i}.")),
                ..RawCandidate::new("test")
            })
        })
        .collect()
}

fn cfg(server: &MockServer) -> RankingConfig {
    RankingConfig {
        endpoint: format!("{}{COMPLETIONS}", server.uri()),
        timeout_secs: 1,
        system_prompt: "You rank courses.".into(),
        instructions: "Rank the following.".into(),
        api_key: Some("sk-test".into()),
        ..RankingConfig::default()
    }
}

fn completion(content: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn narrative_is_returned_verbatim() {
    let server = MockServer::start().await;
    let text = "1. Course 2 - strongest fit\n2. Course 0 - solid basics\n";
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini", "max_tokens": 1000 })))
        .respond_with(completion(json!(text)))
        .expect(1)
        .mount(&server)
        .await;

    let ranker = build_ranker(&cfg(&server));
    let digest = ranker.rank(&opportunities(6)).await;
    assert_eq!(digest, Digest::Narrative(text.to_string()));
}

#[tokio::test]
async fn server_error_falls_back_after_exactly_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let input = opportunities(8);
    let digest = build_ranker(&cfg(&server)).rank(&input).await;
    assert_eq!(digest, Digest::Fallback(input[..5].to_vec()));
}

#[tokio::test]
async fn slow_service_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(completion(json!("late")).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let input = opportunities(3);
    let digest = build_ranker(&cfg(&server)).rank(&input).await;
    assert_eq!(digest, Digest::Fallback(input.clone()));
}

#[tokio::test]
async fn empty_or_missing_content_falls_back() {
    for content in [json!(""), json!(null)] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETIONS))
            .respond_with(completion(content))
            .mount(&server)
            .await;

        let digest = build_ranker(&cfg(&server)).rank(&opportunities(2)).await;
        assert!(digest.is_fallback());
    }
}

#[tokio::test]
async fn garbage_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    assert!(build_ranker(&cfg(&server)).rank(&opportunities(2)).await.is_fallback());
}

#[tokio::test]
async fn without_a_key_the_service_is_never_called() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(json!("should not be used")))
        .expect(0)
        .mount(&server)
        .await;

    let mut c = cfg(&server);
    c.api_key = None;
    let input = opportunities(7);
    let ranker = build_ranker(&c);
    assert_eq!(ranker.name(), "fallback");
    assert_eq!(ranker.rank(&input).await, Digest::Fallback(input[..5].to_vec()));
}

#[test]
fn fallback_render_keeps_discovery_order() {
    let input = opportunities(7);
    let text = Digest::fallback_for(&input).render();
    assert_eq!(text.matches("Title: ").count(), 5);
    let positions: Vec<usize> = (0..5)
        .map(|i| text.find(&format!("Title: Course {i}\n")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!text.contains("Course 5"));
    assert!(text.contains("Cost: Varies (Check link)\nPrerequisites: Check link for details\n"));
}
