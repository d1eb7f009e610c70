//! Firestore document store over the REST API.
//!
//! Entries are created with `POST .../documents/{collection}` and a typed
//! field map; Firestore assigns the document id. Each write asks the token
//! source for a bearer token, so refreshed credentials take effect without a
//! restart.

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::config::StoreConfig;
use super::google_auth::{ServiceAccountTokenSource, StaticToken, TokenSource};
use crate::db::traits::EntryStore;
use crate::error::{JournalError, Result};
use crate::models::{JournalEntry, StoredEntry};

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
const URL_SCHEME: &str = "firestore://";

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
}

#[derive(Clone)]
pub struct FirestoreBackend {
    client: Client,
    documents_url: String,
    collection: String,
    token_source: Option<Arc<dyn TokenSource>>,
}

impl FirestoreBackend {
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let (project, database) = parse_firestore_url(&config.url).ok_or_else(|| {
            JournalError::StorageUnavailable(format!(
                "Invalid Firestore URL '{}': expected firestore://<project>[/<database>]",
                config.url
            ))
        })?;

        let base_url = match config.firestore_emulator_host.as_deref() {
            Some(host) if !host.trim().is_empty() => format!("http://{}/v1", host.trim()),
            _ => FIRESTORE_BASE_URL.to_string(),
        };

        tracing::info!(
            project = %project,
            database = %database,
            collection = %config.collection,
            base_url = %base_url,
            "Using Firestore entry store"
        );

        Self::new(
            &base_url,
            &project,
            &database,
            &config.collection,
            token_source_for(config)?,
            config.timeout_secs,
        )
    }

    pub fn new(
        base_url: &str,
        project: &str,
        database: &str,
        collection: &str,
        token_source: Option<Arc<dyn TokenSource>>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                JournalError::StorageUnavailable(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            documents_url: format!(
                "{}/projects/{project}/databases/{database}/documents",
                base_url.trim_end_matches('/')
            ),
            collection: collection.to_string(),
            token_source,
        })
    }

    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    async fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref source) = self.token_source {
            let token = source.access_token().await?;
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    JournalError::StorageUnavailable(format!("Invalid access token header: {e}"))
                })?,
            );
        }

        Ok(headers)
    }
}

#[async_trait]
impl EntryStore for FirestoreBackend {
    async fn add_entry(&self, entry: &JournalEntry) -> Result<String> {
        let stored = StoredEntry::new(String::new(), entry);
        let body = json!({
            "fields": {
                "text": { "stringValue": stored.text },
                "userId": { "stringValue": stored.user_id },
                "createdAt": {
                    "timestampValue": stored.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
                }
            }
        });

        let resp = self
            .client
            .post(self.collection_url())
            .headers(self.headers().await?)
            .json(&body)
            .send()
            .await
            .map_err(|e| JournalError::StorageUnavailable(format!("Firestore request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(JournalError::StorageUnavailable(format!(
                "Firestore returned {status}: {body}"
            )));
        }

        let document: FirestoreDocument = resp.json().await.map_err(|e| {
            JournalError::StorageUnavailable(format!("Failed to parse Firestore response: {e}"))
        })?;

        document_id(&document.name)
            .map(str::to_string)
            .ok_or_else(|| {
                JournalError::StorageUnavailable(format!(
                    "Firestore returned a document without an id: '{}'",
                    document.name
                ))
            })
    }

    async fn ping(&self) -> Result<()> {
        // Firestore has no cheap unauthenticated probe; a built client is as
        // far as health goes.
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}

/// A static token wins over a key file; with neither, requests go out
/// unauthenticated, which is what the emulator expects.
fn token_source_for(config: &StoreConfig) -> Result<Option<Arc<dyn TokenSource>>> {
    if let Some(token) = non_empty(config.firestore_access_token.as_deref()) {
        return Ok(Some(Arc::new(StaticToken::new(token))));
    }
    if let Some(path) = non_empty(config.google_credentials.as_deref()) {
        let source = ServiceAccountTokenSource::from_file(path, config.timeout_secs)?;
        return Ok(Some(Arc::new(source)));
    }
    if config.firestore_emulator_host.is_none() {
        tracing::warn!("No Firestore credentials configured; writes will be unauthenticated");
    }
    Ok(None)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `firestore://project` or `firestore://project/database`.
pub fn parse_firestore_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix(URL_SCHEME)?.trim_matches('/');
    let (project, database) = match rest.split_once('/') {
        Some((project, database)) => (project, database),
        None => (rest, DEFAULT_DATABASE),
    };

    if project.is_empty() || database.is_empty() || database.contains('/') {
        return None;
    }

    Some((project.to_string(), database.to_string()))
}

/// Last segment of a Firestore resource name.
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}
