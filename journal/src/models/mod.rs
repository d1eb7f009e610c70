mod emotion;
mod entry;

pub use emotion::*;
pub use entry::*;
