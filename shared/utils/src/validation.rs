use crate::error::{AdcError, AdcResult};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> AdcResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(AdcError::configuration(error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("page_range") => {
                    "first_page must not be greater than last_page".to_string()
                }
                std::borrow::Cow::Borrowed("first_page")
                | std::borrow::Cow::Borrowed("max_words")
                | std::borrow::Cow::Borrowed("max_file_size") => {
                    format!("{} must be at least 1", error.code)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    if messages.is_empty() {
        return errors.to_string();
    }

    messages.join(", ")
}

pub fn validate_mime_type(mime_type: &str, accepted: &[String]) -> AdcResult<()> {
    if !accepted.iter().any(|m| m == mime_type) {
        return Err(AdcError::invalid_mime_type(mime_type, accepted));
    }

    Ok(())
}

/// An absent output type is always fine; the caller falls back to its default.
pub fn validate_output_type(output: Option<&str>, accepted: &[String]) -> AdcResult<()> {
    match output {
        Some(output) if !accepted.iter().any(|o| o == output) => {
            Err(AdcError::invalid_output_type(output, accepted))
        }
        _ => Ok(()),
    }
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> AdcResult<()> {
    if file_size > max_size {
        return Err(file_too_large(max_size));
    }

    Ok(())
}

pub fn file_too_large(max_size: u64) -> AdcError {
    AdcError::validation(format!(
        "file exceeds limit of {}mb",
        max_size / (1000 * 1000)
    ))
}
