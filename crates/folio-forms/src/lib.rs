//! # folio-forms
//!
//! Form state and validation for the portfolio site's contact form.
//!
//! This crate provides:
//! - Shape validation for emails, phone numbers and URLs
//! - Required-field checking with per-field error messages
//! - A form controller that owns field values, errors and the submit
//!   lifecycle
//! - An injectable submit handler and diagnostics sink
//!
//! ## Quick Start
//!
//! ```rust
//! use folio_forms::{DeliveryError, FormController, FormState, SubmitOutcome};
//!
//! let controller = FormController::contact(|data: FormState| async move {
//!     // Hand the message to a mail relay here.
//!     let _ = data;
//!     Ok::<_, DeliveryError>(())
//! });
//!
//! controller.handle_change("name", "Ann");
//! controller.handle_change("email", "ann@example.com");
//! controller.handle_change("message", "Hi!");
//!
//! let outcome = futures::executor::block_on(controller.handle_submit());
//! assert_eq!(outcome, SubmitOutcome::Submitted);
//! assert!(controller.form_data().is_empty());
//! ```
//!
//! ## Validation
//!
//! ```rust
//! use folio_forms::{validate_email, validate_form_data, FormState};
//!
//! assert!(validate_email("a@b.com"));
//!
//! let data = FormState::from([
//!     ("name".to_string(), String::new()),
//!     ("email".to_string(), "bad".to_string()),
//! ]);
//! let result = validate_form_data(&data, &["name"]);
//! assert!(!result.is_valid);
//! assert_eq!(result.errors.get("name"), Some("name is required"));
//! assert_eq!(result.errors.get("email"), Some("Invalid email format"));
//! ```
//!
//! ## Errors
//!
//! Field errors are cleared as soon as the field is edited. When the submit
//! handler fails, the input is kept and the error state gets a single
//! [`SUBMIT_ERROR_KEY`] entry holding [`SUBMIT_FAILURE_MESSAGE`]; the
//! underlying cause goes to the controller's [`DiagnosticsSink`].

mod controller;
pub mod diagnostics;
mod error;
mod form;
pub mod submit;
pub mod validation;

pub use controller::{FormConfig, FormController, RequiredFields, SubmitOutcome};
pub use diagnostics::{Diagnostic, DiagnosticsSink, Level, MemorySink, TracingSink};
pub use error::{
    DeliveryError, ErrorState, FieldError, FormError, Result, SUBMIT_ERROR_KEY,
    SUBMIT_FAILURE_MESSAGE,
};
pub use form::{parse_assignment, FieldDef, FieldKind, FormSchema, FormState};
pub use submit::{BoxFuture, LoggingSubmitHandler, SubmitHandler, SubmitResult};
pub use validation::{
    validate_email, validate_form_data, validate_phone_number, validate_url, ValidationResult,
};
