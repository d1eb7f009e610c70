use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{JournalError, Result};
use crate::models::EmotionScore;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

/// Text-classification pipelines answer with one list per input; some
/// deployments unwrap the single-input case.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Batched(Vec<Vec<EmotionScore>>),
    Single(Vec<EmotionScore>),
}

impl ClassificationResponse {
    fn into_scores(self) -> Vec<EmotionScore> {
        match self {
            ClassificationResponse::Batched(batches) => {
                batches.into_iter().next().unwrap_or_default()
            }
            ClassificationResponse::Single(scores) => scores,
        }
    }
}

/// Client for a HuggingFace-inference-compatible text-classification
/// endpoint (`POST {base_url}/{model}` with `{"inputs": text}`).
#[derive(Clone)]
pub struct ClassifierApiClient {
    client: Client,
    config: ApiConfig,
}

impl ClassifierApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JournalError::Classifier(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// One request per call. Any transport, status or decode failure is
    /// reported as `ModelUnavailable`.
    pub async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>> {
        let request = ClassificationRequest { inputs: text };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = self.config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| {
                        JournalError::ModelUnavailable(format!("Invalid API key header: {e}"))
                    })?,
            );
        }

        let response = self
            .client
            .post(self.url())
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                JournalError::ModelUnavailable(format!("Classifier request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Classifier endpoint rejected request");
            return Err(JournalError::ModelUnavailable(format!(
                "Classifier endpoint returned {status}: {body}"
            )));
        }

        let body: ClassificationResponse = response.json().await.map_err(|e| {
            JournalError::ModelUnavailable(format!("Failed to parse classifier response: {e}"))
        })?;
        Ok(body.into_scores())
    }
}
