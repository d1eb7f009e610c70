mod api;
mod onnx;
mod provider;


pub use api::{ApiConfig, ClassifierApiClient};
pub use onnx::{ModelFiles, OnnxClassifier};
pub use provider::ClassifierProvider;
