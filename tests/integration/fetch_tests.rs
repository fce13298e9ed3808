//! Integration tests for the review fetcher
//!
//! These tests use wiremock to stand in for the scraper provider and check the
//! full fetch cycle: cache, provider call, retry, moderation, and merging.

use review_harvest::cache::{MemoryStore, ReviewCache, SqliteStore};
use review_harvest::config::{parse_config, Config};
use review_harvest::review::Source;
use review_harvest::{HarvestError, ProviderError, ReviewFetcher};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GOOGLE_PATH: &str = "/v2/acts/google-actor/run-sync-get-dataset-items";
const FACEBOOK_PATH: &str = "/v2/acts/facebook-actor/run-sync-get-dataset-items";

/// Creates a test configuration pointing at the mock server, with short retry delays
fn create_test_config(api_base: &str, extra: &str) -> Config {
    parse_config(&format!(
        r#"
{extra}

[provider]
api-base = "{api_base}"

[google]
actor-id = "google-actor"
api-token = "g-token"

[facebook]
actor-id = "facebook-actor"
api-token = "f-token"

[retry]
max-retries = 3
initial-delay-ms = 10
max-delay-ms = 50
backoff-factor = 2.0
"#
    ))
    .expect("Failed to parse test config")
}

fn memory_cache() -> ReviewCache {
    ReviewCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(3600))
}

fn create_fetcher(server: &MockServer) -> Arc<ReviewFetcher> {
    let config = create_test_config(&server.uri(), "");
    Arc::new(ReviewFetcher::new(&config, memory_cache()).expect("Failed to create fetcher"))
}

fn google_record(id: &str, date: &str) -> serde_json::Value {
    json!({
        "reviewId": id,
        "reviewerName": "Jane",
        "rating": 5,
        "text": "Great service, highly recommend!",
        "publishedAtDate": date
    })
}

fn facebook_record(id: &str, date: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user": { "name": "Sam", "profilePic": "https://example.com/sam.png" },
        "isRecommended": true,
        "text": "Lovely people and quick replies",
        "date": date
    })
}

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let first = fetcher.fetch_google_reviews("place123").await.unwrap();
    let second = fetcher.fetch_google_reviews("place123").await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_provider_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .and(header("authorization", "Bearer g-token"))
        .and(body_json(json!({
            "startUrls": [{ "url": "https://www.google.com/maps/place/?q=place_id:place123" }],
            "maxReviews": 100,
            "language": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .and(header("authorization", "Bearer f-token"))
        .and(body_json(json!({
            "startUrls": [{ "url": "https://facebook.com/biz" }],
            "maxReviews": 100,
            "language": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let reviews = fetcher
        .fetch_all_reviews(Some("place123"), Some("https://facebook.com/biz"))
        .await
        .unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_fetch_all_merges_newest_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([facebook_record("f1", "2024-01-03")])),
        )
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let reviews = fetcher
        .fetch_all_reviews(Some("place123"), Some("https://facebook.com/biz"))
        .await
        .unwrap();

    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["f1", "g1"]);
    assert_eq!(reviews[0].source, Source::Facebook);
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(reviews[1].source, Source::Google);
}

#[tokio::test]
async fn test_equal_dates_keep_source_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            google_record("g1", "2024-01-02T00:00:00Z"),
            google_record("g2", "2024-01-02T00:00:00Z")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([facebook_record("f1", "2024-01-02T00:00:00Z")])),
        )
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let reviews = fetcher
        .fetch_all_reviews(Some("place123"), Some("https://facebook.com/biz"))
        .await
        .unwrap();

    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g2", "f1"]);
}

#[tokio::test]
async fn test_unconfigured_source_contributes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let reviews = fetcher
        .fetch_all_reviews(Some("place123"), None)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id, "g1");
}

#[tokio::test]
async fn test_retries_then_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let reviews = fetcher.fetch_google_reviews("place123").await.unwrap();
    assert_eq!(reviews.len(), 1);
}

#[tokio::test]
async fn test_exhausted_retries_return_last_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let result = fetcher.fetch_google_reviews("place123").await;
    assert!(matches!(
        result,
        Err(HarvestError::Provider(ProviderError::Status {
            provider: Source::Google,
            status: 503
        }))
    ));
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    assert!(fetcher.fetch_google_reviews("place123").await.is_err());
    assert_eq!(fetcher.fetch_google_reviews("place123").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_one_failing_source_fails_whole_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let result = fetcher
        .fetch_all_reviews(Some("place123"), Some("https://facebook.com/biz"))
        .await;
    assert!(matches!(
        result,
        Err(HarvestError::Provider(ProviderError::Status {
            provider: Source::Facebook,
            status: 404
        }))
    ));
}

#[tokio::test]
async fn test_moderation_applied_before_caching() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            google_record("g1", "2024-01-02"),
            {
                "reviewId": "spam",
                "reviewerName": "Bot",
                "rating": 5,
                "text": "Visit http://spam.example.com now!",
                "publishedAtDate": "2024-01-05"
            },
            {
                "reviewId": "short",
                "reviewerName": "Terse",
                "rating": 4,
                "text": "Good",
                "publishedAtDate": "2024-01-04"
            },
            {
                "reviewId": "unrated",
                "text": "No rating was captured for this one"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cache = ReviewCache::new(store.clone(), Duration::from_secs(3600));
    let config = create_test_config(&mock_server.uri(), "");
    let fetcher = ReviewFetcher::new(&config, cache.clone()).unwrap();

    let reviews = fetcher.fetch_google_reviews("place123").await.unwrap();
    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["g1"]);

    let cached = cache.get(Source::Google, "place123").await.unwrap();
    assert_eq!(cached, reviews);
}

#[tokio::test]
async fn test_malformed_payload_degrades_to_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "unexpected" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let reviews = fetcher
        .fetch_facebook_reviews("https://facebook.com/biz")
        .await
        .unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_retried_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FACEBOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    let result = fetcher.fetch_facebook_reviews("https://facebook.com/biz").await;
    assert!(matches!(
        result,
        Err(HarvestError::Provider(ProviderError::Decode {
            provider: Source::Facebook,
            ..
        }))
    ));
}

#[tokio::test]
async fn test_empty_identifier_makes_no_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    assert!(matches!(
        fetcher.fetch_google_reviews("").await,
        Err(HarvestError::Validation { .. })
    ));
    assert!(matches!(
        fetcher.fetch_facebook_reviews("").await,
        Err(HarvestError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_refresh_bypasses_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);

    fetcher.fetch_google_reviews("place123").await.unwrap();
    fetcher.fetch_google_reviews("place123").await.unwrap();
    fetcher
        .refresh_source(Source::Google, "place123")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sqlite_cache_shared_between_fetchers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([google_record("g1", "2024-01-02")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("reviews.db");
    let config = create_test_config(&mock_server.uri(), "");

    let first = ReviewFetcher::new(
        &config,
        ReviewCache::new(Arc::new(SqliteStore::new(&db_path).unwrap()), Duration::from_secs(3600)),
    )
    .unwrap();
    let from_provider = first.fetch_google_reviews("place123").await.unwrap();

    let second = ReviewFetcher::new(
        &config,
        ReviewCache::new(Arc::new(SqliteStore::new(&db_path).unwrap()), Duration::from_secs(3600)),
    )
    .unwrap();
    let from_cache = second.fetch_google_reviews("place123").await.unwrap();

    assert_eq!(from_provider, from_cache);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "fetch-timeout-secs = 1");
    let fetcher = Arc::new(ReviewFetcher::new(&config, memory_cache()).unwrap());

    let result = fetcher.fetch_all_reviews(Some("place123"), None).await;
    assert!(matches!(result, Err(HarvestError::Timeout { seconds: 1 })));
}
