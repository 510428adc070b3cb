//! Error types for forms.

use std::collections::BTreeMap;

use thiserror::Error;

/// Key under which a whole-form delivery failure is reported.
pub const SUBMIT_ERROR_KEY: &str = "submit";

/// Message shown to the user when the submit handler fails.
pub const SUBMIT_FAILURE_MESSAGE: &str = "Failed to submit form. Please try again.";

/// A problem with a single field, found while validating a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field is absent, empty, or whitespace only.
    #[error("{field} is required")]
    Required { field: String },

    /// The field has a value, but not one of the expected shape.
    #[error("{message}")]
    InvalidFormat { field: String, message: String },
}

impl FieldError {
    /// Creates a required-field error.
    pub fn required(field: impl Into<String>) -> Self {
        Self::Required {
            field: field.into(),
        }
    }

    /// Creates a format error with the message shown to the user.
    pub fn invalid_format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field } | Self::InvalidFormat { field, .. } => field,
        }
    }
}

/// Failure reported by a submit handler.
///
/// The message is meant for operators. Users only ever see
/// [`SUBMIT_FAILURE_MESSAGE`].
#[derive(Debug, Error)]
#[error("delivery failed: {message}")]
pub struct DeliveryError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DeliveryError {
    /// Creates a delivery error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a delivery error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the operator-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Library-level errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// A field kind name was not recognised.
    #[error("unknown field kind: {0}")]
    UnknownFieldKind(String),

    /// A `key=value` pair could not be parsed.
    #[error("failed to parse field assignment: {0}")]
    ParseError(String),
}

/// Current error message per field.
///
/// A key is present only while its field holds an error; clearing an error
/// removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    errors: BTreeMap<String, String>,
}

impl ErrorState {
    /// Creates a new empty error state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error for a field, replacing any earlier message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    /// Records a field error under its field name.
    pub fn record(&mut self, error: &FieldError) {
        self.insert(error.field(), error.to_string());
    }

    /// Clears the error for a field. Returns the removed message.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.errors.remove(field)
    }

    /// Removes every error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Returns the error for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns whether a field currently holds an error.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Returns the whole-form delivery error, if any.
    pub fn submit_error(&self) -> Option<&str> {
        self.get(SUBMIT_ERROR_KEY)
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for ErrorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, message) in &self.errors {
            writeln!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ErrorState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            errors: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
