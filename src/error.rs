// #![deny(clippy::unwrap_used, clippy::expect_used)]

use serde::{Deserialize, Serialize};

/// The broad category of a failure, so that callers can branch on it without parsing messages.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The requested template identifier is not registered.
    TemplateNotFound,
    /// The input is not a JSON object at all.
    InvalidInput,
    /// The render configuration could not be read or is inconsistent.
    Configuration,
    /// The PDF document could not be assembled or serialized.
    Pdf,
    /// Reading or writing a file failed.
    Io,
}

/// A struct that represents an error with a context and possibly the propagated source error.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContextError {
    pub kind: ErrorKind,
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => write!(
                formatter,
                "{}: {}",
                self.context,
                minimize_first_letter(source_error.to_string()),
            ),
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ContextError {}

impl ContextError {
    /// Create a new `ContextError` of the given kind with the given context.
    pub fn with_context<S: Into<String>>(kind: ErrorKind, context: S) -> ContextError {
        ContextError {
            kind,
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ContextError` of the given kind with the given context and source error.
    pub fn with_error<S: Into<String>>(
        kind: ErrorKind,
        context: S,
        error: &dyn std::error::Error,
    ) -> ContextError {
        ContextError {
            kind,
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }

    /// The error returned when a template identifier cannot be resolved.
    pub fn template_not_found(template_id: &str) -> ContextError {
        ContextError::with_context(
            ErrorKind::TemplateNotFound,
            format!("Template {:?} not found", template_id),
        )
    }
}

/// Minimizes the first letter of a string, it is used for standardizing the error message.
fn minimize_first_letter(string: String) -> String {
    let mut characters = string.chars();
    match characters.next() {
        None => String::new(),
        Some(character) => character.to_lowercase().chain(characters).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_is_appended_in_lowercase() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let error = ContextError::with_error(ErrorKind::Io, "Failed to read the record", &source);

        assert_eq!(error.to_string(), "Failed to read the record: no such file");
        assert_eq!(error.kind, ErrorKind::Io);
    }

    #[test]
    fn template_not_found_names_the_identifier() {
        let error = ContextError::template_not_found("does-not-exist");

        assert_eq!(error.kind, ErrorKind::TemplateNotFound);
        assert!(error.to_string().contains("\"does-not-exist\""));
    }
}
