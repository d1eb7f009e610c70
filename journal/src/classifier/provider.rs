use std::path::Path;
use std::sync::{Arc, Mutex};

use super::api::{ApiConfig, ClassifierApiClient};
use super::onnx::{ModelFiles, OnnxClassifier};
use crate::config::{parse_classifier_provider_model, ClassifierConfig, DEFAULT_CLASSIFIER_BASE_URL};
use crate::error::{JournalError, Result};
use crate::models::{Emotion, EmotionScore};

/// Score given to the dominant label by `mock/<label>` models.
const MOCK_DOMINANT_SCORE: f32 = 0.9;

#[derive(Clone)]
enum ClassifierBackend {
    Local(Arc<Mutex<OnnxClassifier>>),
    Api(ClassifierApiClient),
    Mock(Arc<Vec<EmotionScore>>),
    Unavailable { reason: String },
}

/// Text-to-emotion classifier shared by every request.
///
/// Built once at startup. A model that fails to load leaves the provider in
/// the unavailable state so the rest of the service keeps serving.
#[derive(Clone)]
pub struct ClassifierProvider {
    backend: ClassifierBackend,
    model: String,
}

impl ClassifierProvider {
    /// Blocking: the `local` provider downloads and loads the model here.
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let (provider, model_name) = parse_classifier_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "local" => {
                let model = load_local(config, model_name)?;
                ClassifierBackend::Local(Arc::new(Mutex::new(model)))
            }
            "huggingface" => {
                let api_config = ApiConfig {
                    base_url: config
                        .base_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CLASSIFIER_BASE_URL.to_string()),
                    api_key: config.api_key.clone(),
                    model: model_name.to_string(),
                    timeout_secs: config.timeout_secs,
                };
                ClassifierBackend::Api(ClassifierApiClient::new(api_config)?)
            }
            "mock" => ClassifierBackend::Mock(Arc::new(mock_scores_for(model_name))),
            other => {
                return Err(JournalError::Classifier(format!(
                    "Unsupported classifier provider: {other}"
                )))
            }
        };

        tracing::info!(provider, model = model_name, "Emotion classifier configured");

        Ok(Self {
            backend,
            model: config.model.clone(),
        })
    }

    /// Provider that always answers with `scores`.
    pub fn new_mock(scores: Vec<EmotionScore>) -> Self {
        Self {
            backend: ClassifierBackend::Mock(Arc::new(scores)),
            model: "mock".to_string(),
        }
    }

    /// Provider that fails every request with `ModelUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: ClassifierBackend::Unavailable {
                reason: reason.into(),
            },
            model: String::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, ClassifierBackend::Unavailable { .. })
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            ClassifierBackend::Local(_) => "local",
            ClassifierBackend::Api(_) => "huggingface",
            ClassifierBackend::Mock(_) => "mock",
            ClassifierBackend::Unavailable { .. } => "unavailable",
        }
    }

    pub fn model(&self) -> Option<&str> {
        if self.model.is_empty() {
            None
        } else {
            Some(&self.model)
        }
    }

    /// Scores for every label the model knows, in model order.
    pub async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>> {
        let scores = match &self.backend {
            ClassifierBackend::Local(model) => {
                let model = Arc::clone(model);
                let text = text.to_string();
                tokio::task::spawn_blocking(move || {
                    let mut model = model.lock().map_err(|e| {
                        JournalError::ModelUnavailable(format!("Emotion model lock poisoned: {e}"))
                    })?;
                    model.classify(&text)
                })
                .await
                .map_err(|e| {
                    JournalError::ModelUnavailable(format!("Classifier worker failed: {e}"))
                })??
            }
            ClassifierBackend::Api(client) => client.classify(text).await?,
            ClassifierBackend::Mock(scores) => scores.as_ref().clone(),
            ClassifierBackend::Unavailable { reason } => {
                return Err(JournalError::ModelUnavailable(reason.clone()))
            }
        };

        validate_scores(&scores)?;
        Ok(scores)
    }
}

fn load_local(config: &ClassifierConfig, repo_id: &str) -> Result<OnnxClassifier> {
    let files = match config.model_dir.as_deref() {
        Some(dir) => ModelFiles::in_dir(Path::new(dir)),
        None => ModelFiles::download(repo_id, &config.onnx_file)?,
    };
    OnnxClassifier::load(&files, config.max_length)
}

/// Reject output the ranking step cannot work with.
pub(crate) fn validate_scores(scores: &[EmotionScore]) -> Result<()> {
    if scores.is_empty() {
        return Err(JournalError::ModelUnavailable(
            "Classifier returned no scores".to_string(),
        ));
    }
    if let Some(bad) = scores
        .iter()
        .find(|s| !s.score.is_finite() || !(0.0..=1.0).contains(&s.score))
    {
        return Err(JournalError::ModelUnavailable(format!(
            "Classifier returned invalid score {} for '{}'",
            bad.score, bad.label
        )));
    }
    Ok(())
}

/// Fixed distribution for `mock/<label>`: the named label dominates, the
/// remaining mass is split across the other known emotions.
fn mock_scores_for(dominant: &str) -> Vec<EmotionScore> {
    let dominant = dominant.trim();
    let dominant = if dominant.is_empty() {
        Emotion::Joy.as_str()
    } else {
        dominant
    };

    let others: Vec<&str> = Emotion::ALL
        .iter()
        .map(|e| e.as_str())
        .filter(|label| !label.eq_ignore_ascii_case(dominant))
        .collect();
    let rest = (1.0 - MOCK_DOMINANT_SCORE) / others.len() as f32;

    std::iter::once(EmotionScore::new(dominant, MOCK_DOMINANT_SCORE))
        .chain(others.into_iter().map(|label| EmotionScore::new(label, rest)))
        .collect()
}
