//! Custom request extractors.
//!
//! Both extractors deserialize with the matching axum extractor, then run
//! `validator` rules. Either failure becomes a 422.

mod validated_form;
mod validated_json;

pub use validated_form::ValidatedForm;
pub use validated_json::ValidatedJson;

use validator::{Validate, ValidationErrors};

use crate::errors::{AppError, AppResult};

fn check<T: Validate>(value: T) -> AppResult<T> {
    value
        .validate()
        .map_err(|e| AppError::validation(describe(&e)))?;
    Ok(value)
}

/// Join field messages into one detail string, falling back to
/// "<field> is invalid" for rules without a message.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
