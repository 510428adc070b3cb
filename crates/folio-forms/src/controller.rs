//! Form state controller.
//!
//! Owns the field values, the per-field errors and the submitting flag of
//! one mounted form, and turns change and submit events into state
//! transitions:
//!
//! ```text
//! Idle -> Validating -> Idle (with errors)
//!                    -> Submitting -> Idle (cleared)
//!                                  -> Idle (submit error)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::diagnostics::{DiagnosticsSink, TracingSink};
use crate::error::{ErrorState, SUBMIT_ERROR_KEY, SUBMIT_FAILURE_MESSAGE};
use crate::form::{FormSchema, FormState};
use crate::submit::SubmitHandler;
use crate::validation::{validate_form_data, ValidationResult};

/// Which fields must be filled in before a submit is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequiredFields {
    /// Every field that currently has a key in the form state. Fields the
    /// user never touched are never required.
    #[default]
    PresentKeys,
    /// A fixed list of field names.
    Fields(Vec<String>),
    /// The required fields and format rules of a schema.
    Schema(FormSchema),
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// How required fields are determined.
    pub required: RequiredFields,
    /// Whether editing a field clears its error straight away.
    pub clear_errors_on_change: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            required: RequiredFields::PresentKeys,
            clear_errors_on_change: true,
        }
    }
}

impl FormConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires exactly the named fields.
    #[must_use]
    pub fn required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = RequiredFields::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Validates against a schema.
    #[must_use]
    pub fn schema(mut self, schema: FormSchema) -> Self {
        self.required = RequiredFields::Schema(schema);
        self
    }

    /// Toggles clearing a field's error when it is edited.
    #[must_use]
    pub fn clear_errors_on_change(mut self, enabled: bool) -> Self {
        self.clear_errors_on_change = enabled;
        self
    }
}

/// What a call to [`FormController::handle_submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; these errors replaced the error state.
    Invalid(ErrorState),
    /// The handler succeeded and the form was cleared.
    Submitted,
    /// The handler failed; the input was kept and a submit error recorded.
    Failed,
    /// Another submit was still in flight, so nothing happened.
    AlreadySubmitting,
}

#[derive(Debug, Default)]
struct FormInner {
    data: FormState,
    errors: ErrorState,
    submitting: bool,
}

/// Controller for a single form instance.
///
/// All operations take `&self`; the controller can be shared between the
/// code that forwards change events and the code awaiting a submit.
pub struct FormController {
    handler: Box<dyn SubmitHandler>,
    config: FormConfig,
    diagnostics: Arc<dyn DiagnosticsSink>,
    inner: Mutex<FormInner>,
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("FormController")
            .field("config", &self.config)
            .field("data", &inner.data)
            .field("errors", &inner.errors)
            .field("submitting", &inner.submitting)
            .finish_non_exhaustive()
    }
}

impl FormController {
    /// Creates a controller that delivers valid submissions to `handler`.
    pub fn new(handler: impl SubmitHandler + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            config: FormConfig::default(),
            diagnostics: Arc::new(TracingSink::new()),
            inner: Mutex::new(FormInner::default()),
        }
    }

    /// Creates a controller for the contact form schema.
    pub fn contact(handler: impl SubmitHandler + 'static) -> Self {
        Self::new(handler).with_config(FormConfig::new().schema(FormSchema::contact()))
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the sink that receives delivery failures.
    #[must_use]
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current field values.
    pub fn form_data(&self) -> FormState {
        self.lock().data.clone()
    }

    /// Returns the current value of one field.
    pub fn value(&self, field: &str) -> Option<String> {
        self.lock().data.get(field).cloned()
    }

    /// Returns a copy of the current errors.
    pub fn errors(&self) -> ErrorState {
        self.lock().errors.clone()
    }

    /// Returns the current error for one field.
    pub fn error(&self, field: &str) -> Option<String> {
        self.lock().errors.get(field).map(str::to_string)
    }

    /// Returns whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Records a new value for `field`.
    ///
    /// Unless disabled in the config, any error on the field is cleared
    /// without re-validating it.
    pub fn handle_change(&self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        debug!(field = %field, "field changed");
        let mut inner = self.lock();
        if self.config.clear_errors_on_change {
            inner.errors.remove(&field);
        }
        inner.data.insert(field, value.into());
    }

    /// Replaces every field value at once and clears all errors.
    pub fn set_form_data(&self, data: FormState) {
        let mut inner = self.lock();
        inner.data = data;
        inner.errors.clear();
    }

    /// Clears values and errors. Does nothing while submitting and
    /// returns whether the form was reset.
    pub fn reset(&self) -> bool {
        let mut inner = self.lock();
        if inner.submitting {
            return false;
        }
        inner.data.clear();
        inner.errors.clear();
        true
    }

    fn validate(&self, data: &FormState) -> ValidationResult {
        match &self.config.required {
            RequiredFields::PresentKeys => {
                let required: Vec<&str> = data.keys().map(String::as_str).collect();
                validate_form_data(data, required.as_slice())
            }
            RequiredFields::Fields(fields) => validate_form_data(data, fields.as_slice()),
            RequiredFields::Schema(schema) => schema.validate(data),
        }
    }

    /// Validates the form and, if valid, hands it to the submit handler.
    ///
    /// Never fails: validation errors and delivery failures end up in the
    /// error state. A call made while another submit is in flight is
    /// ignored.
    pub async fn handle_submit(&self) -> SubmitOutcome {
        let data = {
            let mut inner = self.lock();
            if inner.submitting {
                debug!("submit ignored, another submission is in flight");
                return SubmitOutcome::AlreadySubmitting;
            }

            let result = self.validate(&inner.data);
            if !result.is_valid {
                warn!(fields = result.errors.len(), "form validation failed");
                inner.errors = result.errors.clone();
                return SubmitOutcome::Invalid(result.errors);
            }

            inner.submitting = true;
            inner.data.clone()
        };

        info!(fields = data.len(), "submitting form");
        let in_flight = InFlight { inner: &self.inner };
        let delivery = self.handler.submit(data).await;

        let outcome = {
            let mut inner = self.lock();
            inner.submitting = false;
            match &delivery {
                Ok(()) => {
                    inner.data.clear();
                    inner.errors.clear();
                    SubmitOutcome::Submitted
                }
                Err(_) => {
                    inner.errors.clear();
                    inner.errors.insert(SUBMIT_ERROR_KEY, SUBMIT_FAILURE_MESSAGE);
                    SubmitOutcome::Failed
                }
            }
        };
        drop(in_flight);

        match delivery {
            Ok(()) => info!("form submitted"),
            Err(e) => {
                error!(error = %e, "form submission failed");
                let cause = std::error::Error::source(&e).map(ToString::to_string);
                self.diagnostics.error(
                    "Form submission error",
                    Some(json!({ "error": e.message(), "cause": cause })),
                );
            }
        }
        outcome
    }
}

/// Clears the submitting flag if a submit future is dropped mid-flight.
struct InFlight<'a> {
    inner: &'a Mutex<FormInner>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .submitting = false;
    }
}
