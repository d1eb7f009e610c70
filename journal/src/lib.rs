//! Journal backend: classifies the emotional tone of journal entries,
//! suggests coping activities and writing prompts, and stores entries.

pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod recommendations;
pub mod services;

pub use error::{JournalError, Result};
