pub mod emotion;
pub mod health;
pub mod journal;

pub use emotion::analyze_emotion;
pub use health::health_check;
pub use journal::save_journal_entry;
