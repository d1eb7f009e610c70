use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Split a comma separated env var into trimmed, non-empty items.
fn parse_env_list(var: &str, default: &str) -> Vec<String> {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub const DEFAULT_CLASSIFIER_MODEL: &str = "local/bhadresh-savani/distilbert-base-uncased-emotion";
pub const DEFAULT_CLASSIFIER_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub classifier: ClassifierConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Emotion classifier configuration.
///
/// `model` uses the `provider/model` form; see [`parse_classifier_provider_model`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub model: String,
    pub model_dir: Option<String>,
    pub onnx_file: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_length: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            model_dir: None,
            onnx_file: "onnx/model.onnx".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_length: 512,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub collection: String,
    pub firestore_access_token: Option<String>,
    /// Path to a service-account JSON key used to mint Firestore tokens.
    pub google_credentials: Option<String>,
    pub firestore_emulator_host: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "file:journal.db".to_string(),
            auth_token: None,
            collection: "entries".to_string(),
            firestore_access_token: None,
            google_credentials: None,
            firestore_emulator_host: None,
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("JOURNAL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("JOURNAL_PORT", 8000),
                cors_origins: parse_env_list("CORS_ALLOWED_ORIGINS", "http://localhost:5173"),
            },
            classifier: ClassifierConfig {
                model: env::var("CLASSIFIER_MODEL")
                    .unwrap_or_else(|_| DEFAULT_CLASSIFIER_MODEL.to_string()),
                model_dir: env::var("CLASSIFIER_MODEL_DIR").ok(),
                onnx_file: env::var("CLASSIFIER_ONNX_FILE")
                    .unwrap_or_else(|_| "onnx/model.onnx".to_string()),
                api_key: env::var("CLASSIFIER_API_KEY").ok(),
                base_url: env::var("CLASSIFIER_BASE_URL").ok(),
                timeout_secs: parse_env_or("CLASSIFIER_TIMEOUT", 30),
                max_length: parse_env_or("CLASSIFIER_MAX_LENGTH", 512),
            },
            store: StoreConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:journal.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                collection: env::var("STORE_COLLECTION").unwrap_or_else(|_| "entries".to_string()),
                firestore_access_token: env::var("FIRESTORE_ACCESS_TOKEN").ok(),
                google_credentials: env::var("GOOGLE_APPLICATION_CREDENTIALS").ok(),
                firestore_emulator_host: env::var("FIRESTORE_EMULATOR_HOST").ok(),
                timeout_secs: parse_env_or("STORE_TIMEOUT", 30),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known classifier providers.
pub const KNOWN_CLASSIFIER_PROVIDERS: &[&str] = &["local", "huggingface", "mock"];

/// Parse a classifier model id into a (provider, model) tuple.
///
/// HuggingFace repo ids contain a slash themselves (`org/name`), so only a
/// recognised provider prefix is split off.
pub fn parse_classifier_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_CLASSIFIER_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}
