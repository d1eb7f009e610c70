//! Local emotion classifier running a sequence-classification model through
//! ONNX Runtime.
//!
//! ```text
//! text → tokenizer → ONNX model → logits → softmax → (label, score)*
//! ```
//!
//! Labels are read from the model's `config.json` (`id2label`), so any
//! HuggingFace text-classification export with an ONNX graph works.

use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::Tensor;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{JournalError, Result};
use crate::models::EmotionScore;

const TOKENIZER_FILE: &str = "tokenizer.json";
const CONFIG_FILE: &str = "config.json";
const LOCAL_MODEL_FILE: &str = "model.onnx";

/// Architectures whose ONNX exports take no `token_type_ids` input.
const NO_TOKEN_TYPE_MODELS: &[&str] = &["distilbert", "roberta", "xlm-roberta", "camembert"];

#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    model_type: Option<String>,
    id2label: HashMap<String, String>,
}

/// Paths to the three files a classifier needs.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub config: PathBuf,
}

impl ModelFiles {
    /// Files laid out flat in a local directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(LOCAL_MODEL_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            config: dir.join(CONFIG_FILE),
        }
    }

    /// Fetch the files from the HuggingFace Hub. Cached by `hf-hub` after the
    /// first download.
    pub fn download(repo_id: &str, onnx_file: &str) -> Result<Self> {
        tracing::info!("Downloading emotion model: {repo_id}");
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| JournalError::Classifier(format!("HF Hub API init failed: {e}")))?;
        let repo = api.model(repo_id.to_owned());

        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| JournalError::Classifier(format!("Failed to download {file}: {e}")))
        };

        Ok(Self {
            model: fetch(onnx_file)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
            config: fetch(CONFIG_FILE)?,
        })
    }
}

pub struct OnnxClassifier {
    session: Session,
    tokenizer: tokenizers::Tokenizer,
    labels: Vec<String>,
    feeds_token_type_ids: bool,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    pub fn load(files: &ModelFiles, max_length: usize) -> Result<Self> {
        tracing::info!("Loading emotion model config: {}", files.config.display());
        let raw = std::fs::read_to_string(&files.config)?;
        let config: ModelConfig = serde_json::from_str(&raw)
            .map_err(|e| JournalError::Classifier(format!("Invalid model config: {e}")))?;
        let labels = labels_from_config(&config.id2label)?;
        let feeds_token_type_ids = config
            .model_type
            .as_deref()
            .map_or(true, |model_type| !NO_TOKEN_TYPE_MODELS.contains(&model_type));

        tracing::info!("Loading emotion ONNX model: {}", files.model.display());
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(&files.model))
            .map_err(|e| JournalError::Classifier(format!("Emotion model load failed: {e}")))?;

        let mut tokenizer = tokenizers::Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| JournalError::Classifier(format!("Tokenizer load failed: {e}")))?;
        let truncation = tokenizers::TruncationParams {
            max_length,
            ..Default::default()
        };
        tokenizer
            .with_truncation(Some(truncation))
            .map_err(|e| JournalError::Classifier(format!("Tokenizer truncation failed: {e}")))?;
        tokenizer.with_padding(None);

        tracing::info!(labels = ?labels, "Emotion classifier ready");

        Ok(Self {
            session,
            tokenizer,
            labels,
            feeds_token_type_ids,
        })
    }

    /// Score `text` against every label. Output is in model label order.
    pub fn classify(&mut self, text: &str) -> Result<Vec<EmotionScore>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| JournalError::ModelUnavailable(format!("Tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = input_ids.len();

        let mut feed: HashMap<String, SessionInputValue> = HashMap::new();
        feed.insert("input_ids".to_owned(), tensor(seq_len, input_ids)?.into());
        feed.insert(
            "attention_mask".to_owned(),
            tensor(seq_len, attention_mask)?.into(),
        );
        if self.feeds_token_type_ids {
            let token_type_ids: Vec<i64> =
                encoding.get_type_ids().iter().map(|&t| t as i64).collect();
            feed.insert(
                "token_type_ids".to_owned(),
                tensor(seq_len, token_type_ids)?.into(),
            );
        }

        let outputs = self
            .session
            .run(SessionInputs::from(feed))
            .map_err(|e| JournalError::ModelUnavailable(format!("ONNX inference failed: {e}")))?;

        // Output shape: [1, num_labels]
        let (_shape, logits) = outputs[0_usize]
            .try_extract_tensor::<f32>()
            .map_err(|e| JournalError::ModelUnavailable(format!("Failed to read logits: {e}")))?;

        if logits.len() != self.labels.len() {
            return Err(JournalError::ModelUnavailable(format!(
                "Model produced {} logits for {} labels",
                logits.len(),
                self.labels.len()
            )));
        }

        Ok(self
            .labels
            .iter()
            .zip(softmax(logits))
            .map(|(label, score)| EmotionScore::new(label.clone(), score))
            .collect())
    }
}

fn tensor(seq_len: usize, data: Vec<i64>) -> Result<Tensor<i64>> {
    Tensor::from_array(([1, seq_len], data))
        .map_err(|e| JournalError::ModelUnavailable(format!("Failed to build input tensor: {e}")))
}

/// Order `id2label` by its numeric keys.
fn labels_from_config(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    if id2label.is_empty() {
        return Err(JournalError::Classifier(
            "Model config has no id2label mapping".to_string(),
        ));
    }

    let mut labels = vec![None; id2label.len()];
    for (id, label) in id2label {
        let index: usize = id
            .parse()
            .map_err(|_| JournalError::Classifier(format!("Non-numeric label id: {id}")))?;
        let slot = labels.get_mut(index).ok_or_else(|| {
            JournalError::Classifier(format!("Label id {index} out of range"))
        })?;
        *slot = Some(label.clone());
    }

    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            label.ok_or_else(|| JournalError::Classifier(format!("Missing label for id {i}")))
        })
        .collect()
}

/// Numerically stable softmax.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
