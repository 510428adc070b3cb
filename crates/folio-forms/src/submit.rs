//! The seam between the controller and whatever delivers a submission.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::diagnostics::DiagnosticsSink;
use crate::error::DeliveryError;
use crate::form::FormState;

/// A boxed future for async submit operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of one delivery attempt.
pub type SubmitResult = std::result::Result<(), DeliveryError>;

/// Delivers a validated submission.
///
/// Called once per valid submit with a copy of the form data. Resolving to
/// `Err` marks the delivery as failed; the controller keeps the user's
/// input so they can try again.
///
/// Any `Fn(FormState) -> impl Future<Output = SubmitResult>` closure is a
/// handler:
///
/// ```
/// use folio_forms::{DeliveryError, FormController, FormState};
///
/// let controller = FormController::new(|data: FormState| async move {
///     println!("sending {} fields", data.len());
///     Ok::<_, DeliveryError>(())
/// });
/// assert!(!controller.is_submitting());
/// ```
pub trait SubmitHandler: Send + Sync {
    /// Starts delivering `data`.
    fn submit(&self, data: FormState) -> BoxFuture<'static, SubmitResult>;
}

impl<F, Fut> SubmitHandler for F
where
    F: Fn(FormState) -> Fut + Send + Sync,
    Fut: Future<Output = SubmitResult> + Send + 'static,
{
    fn submit(&self, data: FormState) -> BoxFuture<'static, SubmitResult> {
        Box::pin(self(data))
    }
}

/// Handler that records the payload on a diagnostics sink and succeeds.
///
/// Stands in for a real mail or messaging integration.
pub struct LoggingSubmitHandler {
    sink: Arc<dyn DiagnosticsSink>,
}

impl LoggingSubmitHandler {
    /// Creates a handler writing to `sink`.
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for LoggingSubmitHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingSubmitHandler").finish_non_exhaustive()
    }
}

impl SubmitHandler for LoggingSubmitHandler {
    fn submit(&self, data: FormState) -> BoxFuture<'static, SubmitResult> {
        let result = serde_json::to_value(&data)
            .map(|payload| self.sink.info("Form submitted", Some(payload)))
            .map_err(|e| DeliveryError::with_source("payload is not serializable", e));
        Box::pin(async move { result })
    }
}
