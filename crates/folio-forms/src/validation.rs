//! Shape validation for raw form input.
//!
//! The predicates here check syntax only. An email address that passes
//! [`validate_email`] may still bounce and a URL that passes
//! [`validate_url`] is never fetched.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{ErrorState, FieldError};
use crate::form::FormState;

/// Field that always gets a format check when it has a value.
pub const EMAIL_FIELD: &str = "email";

/// Message recorded when the `email` field has the wrong shape.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email format";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

// ASCII digits only; `\d` would also admit other scripts' digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]{10,}$").expect("Invalid phone regex"));

/// Returns whether `input` looks like `local@domain.tld`.
///
/// Each part must be non-empty and free of whitespace and `@`.
pub fn validate_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

/// Returns whether `input` is at least ten characters of digits,
/// whitespace, `-`, `+`, `(` and `)`.
pub fn validate_phone_number(input: &str) -> bool {
    PHONE_RE.is_match(input)
}

/// Returns whether `input` parses as an absolute URL.
pub fn validate_url(input: &str) -> bool {
    Url::parse(input).is_ok()
}

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Error message per offending field.
    pub errors: ErrorState,
}

impl ValidationResult {
    fn from_errors(errors: ErrorState) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Converts into a `Result`, yielding the errors on failure.
    ///
    /// # Errors
    ///
    /// Returns the error map when validation failed.
    pub fn into_result(self) -> Result<(), ErrorState> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Checks required fields and the shape of the `email` field.
///
/// Every name in `required` must map to a value that is non-empty after
/// trimming; absent and blank fields get the same `"{name} is required"`
/// message. A non-empty `email` value is always shape-checked, required or
/// not, and its format error replaces any required-field error on `email`.
pub fn validate_form_data<S: AsRef<str>>(data: &FormState, required: &[S]) -> ValidationResult {
    let mut errors = ErrorState::new();

    for field in required {
        let field = field.as_ref();
        let value = data.get(field).map_or("", String::as_str);
        if let Err(message) = RequiredValidator::for_field(field).validate(value) {
            errors.insert(field, message);
        }
    }

    if let Some(email) = data.get(EMAIL_FIELD).filter(|v| !v.is_empty()) {
        if !validate_email(email) {
            errors.record(&FieldError::invalid_format(
                EMAIL_FIELD,
                INVALID_EMAIL_MESSAGE,
            ));
        }
    }

    ValidationResult::from_errors(errors)
}

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    ///
    /// # Errors
    ///
    /// Returns the message to show next to the field.
    fn validate(&self, value: &str) -> Result<(), String>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

macro_rules! predicate_validator {
    ($(#[$doc:meta])* $name:ident, $predicate:path, $default:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            message: String,
        }

        impl $name {
            /// Creates the validator with its default message.
            pub fn new() -> Self {
                Self {
                    message: $default.to_string(),
                }
            }

            /// Creates the validator with a custom message.
            pub fn with_message(message: impl Into<String>) -> Self {
                Self {
                    message: message.into(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Validator for $name {
            fn validate(&self, value: &str) -> Result<(), String> {
                if $predicate(value) {
                    Ok(())
                } else {
                    Err(self.message.clone())
                }
            }

            fn message(&self) -> &str {
                &self.message
            }
        }
    };
}

predicate_validator!(
    /// Validator for email addresses.
    EmailValidator,
    validate_email,
    "Invalid email format"
);

predicate_validator!(
    /// Validator for phone numbers.
    PhoneValidator,
    validate_phone_number,
    "Invalid phone number format"
);

predicate_validator!(
    /// Validator for absolute URLs.
    UrlValidator,
    validate_url,
    "Invalid URL format"
);

/// Validator that requires a value that is non-empty after trimming.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new `RequiredValidator` with default message.
    pub fn new() -> Self {
        Self {
            message: "This field is required.".to_string(),
        }
    }

    /// Creates a validator reporting `"{field} is required"`.
    pub fn for_field(field: &str) -> Self {
        Self {
            message: FieldError::required(field).to_string(),
        }
    }

    /// Creates a new `RequiredValidator` with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator that enforces a maximum length in characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    max_length: usize,
    message: String,
}

impl MaxLengthValidator {
    /// Creates a new `MaxLengthValidator`.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Ensure this value has at most {max_length} characters."),
        }
    }

    /// Creates a new `MaxLengthValidator` with custom message.
    pub fn with_message(max_length: usize, message: impl Into<String>) -> Self {
        Self {
            max_length,
            message: message.into(),
        }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.chars().count() > self.max_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormState {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com"));
        assert!(validate_email("user.name@domain.co.uk"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a.b.com"));
        assert!(!validate_email("a@@b.com"));
        assert!(!validate_email("a b@c.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("123-456-7890"));
        assert!(validate_phone_number("(123) 456-7890"));
        assert!(validate_phone_number("+63 994 483 7461"));
        assert!(!validate_phone_number("12345"));
        assert!(!validate_phone_number("123-456-789x"));
        assert!(!validate_phone_number("١٢٣٤٥٦٧٨٩٠"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com"));
        assert!(validate_url("http://localhost:8080/path?q=1"));
        assert!(validate_url("mailto:someone@example.com"));
        assert!(!validate_url("not a url"));
        assert!(!validate_url("example.com"));
        assert!(!validate_url(""));
    }

    #[test]
    fn test_required_and_email_errors() {
        let result = validate_form_data(&data(&[("name", ""), ("email", "bad")]), &["name"]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors.get("name"), Some("name is required"));
        assert_eq!(result.errors.get("email"), Some("Invalid email format"));
    }

    #[test]
    fn test_optional_valid_email() {
        let result = validate_form_data::<&str>(&data(&[("email", "x@y.com")]), &[]);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_whitespace_is_blank() {
        let result = validate_form_data(&data(&[("name", "   ")]), &["name"]);
        assert_eq!(result.errors.get("name"), Some("name is required"));
    }

    #[test]
    fn test_absent_and_empty_worded_alike() {
        let absent = validate_form_data(&FormState::new(), &["message"]);
        let empty = validate_form_data(&data(&[("message", "")]), &["message"]);
        assert_eq!(absent.errors, empty.errors);
        assert_eq!(absent.errors.get("message"), Some("message is required"));
    }

    #[test]
    fn test_format_error_wins_over_required() {
        let result = validate_form_data(&data(&[("email", "  ")]), &["email"]);
        assert_eq!(result.errors.get("email"), Some("Invalid email format"));
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_empty_email_not_format_checked() {
        let result = validate_form_data(&data(&[("email", "")]), &["email"]);
        assert_eq!(result.errors.get("email"), Some("email is required"));

        let optional = validate_form_data::<&str>(&data(&[("email", "")]), &[]);
        assert!(optional.is_valid);
    }

    #[test]
    fn test_into_result() {
        let ok = validate_form_data(&data(&[("name", "Ann")]), &["name"]);
        assert!(ok.into_result().is_ok());
        let err = validate_form_data(&FormState::new(), &["name"]);
        assert_eq!(
            err.into_result().unwrap_err().get("name"),
            Some("name is required")
        );
    }

    #[test]
    fn test_predicate_validators() {
        assert!(EmailValidator::new().validate("user@example.com").is_ok());
        assert_eq!(
            PhoneValidator::new().validate("555"),
            Err("Invalid phone number format".to_string())
        );
        assert_eq!(
            UrlValidator::with_message("Enter a valid URL.").validate("nope"),
            Err("Enter a valid URL.".to_string())
        );
    }

    #[test]
    fn test_required_validator() {
        let v = RequiredValidator::new();
        assert!(v.validate("hello").is_ok());
        assert_eq!(v.validate(""), Err("This field is required.".to_string()));
        assert!(v.validate(" \t ").is_err());

        let named = RequiredValidator::for_field("message");
        assert_eq!(named.message(), "message is required");
        assert_eq!(named.validate("  "), Err("message is required".to_string()));
    }

    #[test]
    fn test_max_length_validator() {
        let v = MaxLengthValidator::new(5);
        assert!(v.validate("hello").is_ok());
        assert!(v.validate("héllo").is_ok());
        assert!(v.validate("hello world").is_err());
    }
}
