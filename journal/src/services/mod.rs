mod analysis;
mod journal;

pub use analysis::{build_analysis, AnalysisService};
pub use journal::{JournalService, SAVED_MESSAGE};

use validator::ValidationErrors;

use crate::error::JournalError;

/// Flatten validator output into one client-facing message.
fn validation_error(errors: ValidationErrors) -> JournalError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();

    JournalError::Validation(messages.join("; "))
}
