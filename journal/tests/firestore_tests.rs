//! Firestore REST backend against a mock server.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app, body_json, json_post};
use journal::classifier::ClassifierProvider;
use journal::db::{
    EntryStore, FirestoreBackend, ServiceAccountKey, ServiceAccountTokenSource, StaticToken,
    TokenSource,
};
use journal::error::{JournalError, Result};
use journal::models::JournalEntry;

const DOCUMENTS_PATH: &str = "/v1/projects/journal-app/databases/(default)/documents/entries";
const TOKEN_PATH: &str = "/token";
const TEST_PRIVATE_KEY: &str = include_str!("fixtures/test_service_account_key.pem");
const TEST_PUBLIC_KEY: &str = include_str!("fixtures/test_service_account_key.pub.pem");
const SERVICE_ACCOUNT_EMAIL: &str = "journal-writer@journal-app.iam.gserviceaccount.com";

fn backend_with(server: &MockServer, source: Option<Arc<dyn TokenSource>>) -> FirestoreBackend {
    FirestoreBackend::new(
        &format!("{}/v1", server.uri()),
        "journal-app",
        "(default)",
        "entries",
        source,
        5,
    )
    .unwrap()
}

fn backend(server: &MockServer, token: Option<&str>) -> FirestoreBackend {
    let source = token.map(|t| Arc::new(StaticToken::new(t)) as Arc<dyn TokenSource>);
    backend_with(server, source)
}

fn service_account(server: &MockServer) -> ServiceAccountKey {
    ServiceAccountKey {
        client_email: SERVICE_ACCOUNT_EMAIL.to_string(),
        private_key: TEST_PRIVATE_KEY.to_string(),
        private_key_id: Some("test-key-1".to_string()),
        token_uri: format!("{}{TOKEN_PATH}", server.uri()),
    }
}

fn token_response(token: &str, expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "expires_in": expires_in,
        "token_type": "Bearer"
    }))
}

/// Hands out `token-1`, `token-2`, ... and counts how often it was asked.
#[derive(Default)]
struct RotatingTokens {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenSource for RotatingTokens {
    async fn access_token(&self) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{n}"))
    }
}

fn created_document(id: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/journal-app/databases/(default)/documents/entries/{id}"),
        "fields": {
            "text": {"stringValue": "Rainy day"},
            "userId": {"stringValue": "u42"}
        },
        "createTime": "2026-10-18T09:00:00.000000Z",
        "updateTime": "2026-10-18T09:00:00.000000Z"
    })
}

#[tokio::test]
async fn add_entry_posts_typed_fields_and_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .and(header("Authorization", "Bearer ya29.test-token"))
        .and(body_partial_json(json!({
            "fields": {
                "text": {"stringValue": "Rainy day"},
                "userId": {"stringValue": "u42"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_document("AbC123xyz")))
        .expect(1)
        .mount(&server)
        .await;

    let store = backend(&server, Some("ya29.test-token"));
    let id = store
        .add_entry(&JournalEntry::new("Rainy day", "u42"))
        .await
        .unwrap();

    assert_eq!(id, "AbC123xyz");
}

#[tokio::test]
async fn add_entry_sends_created_at_timestamp() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_document("doc1")))
        .mount(&server)
        .await;

    let store = backend(&server, None);
    store
        .add_entry(&JournalEntry::new("Rainy day", "u42"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let created_at = body["fields"]["createdAt"]["timestampValue"]
        .as_str()
        .unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    assert!(created_at.ends_with('Z'));
}

#[tokio::test]
async fn rejected_write_is_storage_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let store = backend(&server, Some("expired"));
    let err = store
        .add_entry(&JournalEntry::new("Rainy day", "u42"))
        .await
        .unwrap_err();

    match err {
        JournalError::StorageUnavailable(msg) => {
            assert!(msg.contains("403"));
            assert!(msg.contains("PERMISSION_DENIED"));
        }
        other => panic!("expected StorageUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn response_without_name_is_storage_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fields": {}})))
        .mount(&server)
        .await;

    let store = backend(&server, None);
    let err = store
        .add_entry(&JournalEntry::new("Rainy day", "u42"))
        .await
        .unwrap_err();
    assert!(matches!(err, JournalError::StorageUnavailable(_)));
}

#[tokio::test]
async fn unreachable_store_is_storage_unavailable() {
    let store = FirestoreBackend::new(
        "http://127.0.0.1:1/v1",
        "journal-app",
        "(default)",
        "entries",
        None,
        2,
    )
    .unwrap();

    let err = store
        .add_entry(&JournalEntry::new("Rainy day", "u42"))
        .await
        .unwrap_err();
    assert!(matches!(err, JournalError::StorageUnavailable(_)));
}

#[tokio::test]
async fn save_endpoint_writes_one_document() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .and(body_partial_json(json!({
            "fields": {"userId": {"stringValue": "u1"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_document("doc1")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(
        ClassifierProvider::unavailable("not needed"),
        Arc::new(backend(&server, None)),
    );

    let response = app
        .oneshot(json_post(
            "/save_journal_entry",
            r#"{"text":"Rainy day","userId":"u1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Saved entry to Firebase");
}

#[tokio::test]
async fn save_endpoint_maps_firestore_outage_to_503() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = app(
        ClassifierProvider::unavailable("not needed"),
        Arc::new(backend(&server, None)),
    );

    let response = app
        .oneshot(json_post(
            "/save_journal_entry",
            r#"{"text":"Rainy day","userId":"u1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn every_write_asks_the_token_source() {
    let server = MockServer::start().await;

    for token in ["token-1", "token-2"] {
        Mock::given(method("POST"))
            .and(path(DOCUMENTS_PATH))
            .and(header("Authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(created_document(token)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let tokens = Arc::new(RotatingTokens::default());
    let store = backend_with(&server, Some(tokens.clone()));

    let first = store
        .add_entry(&JournalEntry::new("Morning", "u1"))
        .await
        .unwrap();
    let second = store
        .add_entry(&JournalEntry::new("Evening", "u1"))
        .await
        .unwrap();

    assert_eq!(first, "token-1");
    assert_eq!(second, "token-2");
    assert_eq!(tokens.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_account_token_is_cached_between_writes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .respond_with(token_response("ya29.minted", 3600))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .and(header("Authorization", "Bearer ya29.minted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_document("doc1")))
        .expect(2)
        .mount(&server)
        .await;

    let source = ServiceAccountTokenSource::new(service_account(&server), 5).unwrap();
    let store = backend_with(&server, Some(Arc::new(source)));

    for text in ["one", "two"] {
        store
            .add_entry(&JournalEntry::new(text, "u1"))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn expiring_service_account_token_is_refreshed() {
    let server = MockServer::start().await;

    // Shorter than the refresh margin, so every write mints a new token.
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("ya29.short-lived", 30))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_document("doc1")))
        .expect(2)
        .mount(&server)
        .await;

    let source = ServiceAccountTokenSource::new(service_account(&server), 5).unwrap();
    let store = backend_with(&server, Some(Arc::new(source)));

    for text in ["one", "two"] {
        store
            .add_entry(&JournalEntry::new(text, "u1"))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn token_request_carries_signed_assertion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("ya29.minted", 3600))
        .mount(&server)
        .await;

    let key = service_account(&server);
    let token_uri = key.token_uri.clone();
    let source = ServiceAccountTokenSource::new(key, 5).unwrap();
    assert_eq!(source.access_token().await.unwrap(), "ya29.minted");

    let requests = server.received_requests().await.unwrap();
    let form = String::from_utf8(requests[0].body.clone()).unwrap();
    let assertion = form
        .split('&')
        .find_map(|pair| pair.strip_prefix("assertion="))
        .expect("assertion parameter");

    let public_key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri.as_str()]);
    let decoded = decode::<serde_json::Value>(assertion, &public_key, &validation).unwrap();
    let claims = decoded.claims;

    assert_eq!(decoded.header.kid.as_deref(), Some("test-key-1"));

    assert_eq!(claims["iss"], SERVICE_ACCOUNT_EMAIL);
    assert_eq!(claims["aud"], token_uri.as_str());
    assert_eq!(claims["scope"], "https://www.googleapis.com/auth/datastore");
}

#[tokio::test]
async fn rejected_token_exchange_is_storage_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(DOCUMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_document("doc1")))
        .expect(0)
        .mount(&server)
        .await;

    let source = ServiceAccountTokenSource::new(service_account(&server), 5).unwrap();
    let app = app(
        ClassifierProvider::unavailable("not needed"),
        Arc::new(backend_with(&server, Some(Arc::new(source)))),
    );

    let response = app
        .oneshot(json_post(
            "/save_journal_entry",
            r#"{"text":"Rainy day","userId":"u1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn key_file_from_disk_mints_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("ya29.from-file", 3600))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let key_path = dir.path().join("service-account.json");
    let key = json!({
        "type": "service_account",
        "project_id": "journal-app",
        "private_key_id": "test-key-1",
        "private_key": TEST_PRIVATE_KEY,
        "client_email": SERVICE_ACCOUNT_EMAIL,
        "token_uri": format!("{}{TOKEN_PATH}", server.uri()),
    });
    std::fs::write(&key_path, key.to_string()).unwrap();

    let source = ServiceAccountTokenSource::from_file(&key_path, 5).unwrap();
    assert_eq!(source.access_token().await.unwrap(), "ya29.from-file");
}
