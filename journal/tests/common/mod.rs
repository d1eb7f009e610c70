// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;

use journal::api::{create_router, AppState};
use journal::classifier::ClassifierProvider;
use journal::config::{ClassifierConfig, Config, ServerConfig, StoreConfig};
use journal::db::EntryStore;
use journal::error::{JournalError, Result};
use journal::models::{EmotionScore, JournalEntry};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        },
        classifier: ClassifierConfig {
            model: "mock/joy".to_string(),
            ..ClassifierConfig::default()
        },
        store: StoreConfig::default(),
    }
}

pub fn app(classifier: ClassifierProvider, store: Arc<dyn EntryStore>) -> Router {
    init_test_logger();
    create_router(AppState::new(test_config(), classifier, store))
}

pub fn scores(pairs: &[(&str, f32)]) -> Vec<EmotionScore> {
    pairs
        .iter()
        .map(|(label, score)| EmotionScore::new(*label, *score))
        .collect()
}

pub fn json_post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Store that keeps every entry in memory.
#[derive(Default)]
pub struct RecordingStore {
    entries: Mutex<Vec<JournalEntry>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntryStore for RecordingStore {
    async fn add_entry(&self, entry: &JournalEntry) -> Result<String> {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
        Ok(format!("entry-{}", entries.len()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Store whose every call fails as if the backend were down.
pub struct FailingStore;

#[async_trait]
impl EntryStore for FailingStore {
    async fn add_entry(&self, _entry: &JournalEntry) -> Result<String> {
        Err(JournalError::StorageUnavailable(
            "connection refused".to_string(),
        ))
    }

    async fn ping(&self) -> Result<()> {
        Err(JournalError::StorageUnavailable(
            "connection refused".to_string(),
        ))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use tempfile;
pub use wiremock;
