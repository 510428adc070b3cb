#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use folio_forms::{BoxFuture, DeliveryError, FormState, SubmitHandler, SubmitResult};

/// Submit handler that remembers every payload and yields once before
/// resolving, so a second submit can observe the in-flight state.
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<FormState>>>,
    fail: bool,
}

impl RecordingHandler {
    pub fn accepting() -> Self {
        Self {
            calls: Arc::default(),
            fail: false,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            calls: Arc::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<FormState>>> {
        Arc::clone(&self.calls)
    }
}

impl SubmitHandler for RecordingHandler {
    fn submit(&self, data: FormState) -> BoxFuture<'static, SubmitResult> {
        let calls = Arc::clone(&self.calls);
        let fail = self.fail;
        Box::pin(async move {
            calls.lock().unwrap().push(data);
            tokio::task::yield_now().await;
            if fail {
                Err(DeliveryError::new("mail relay rejected the message"))
            } else {
                Ok(())
            }
        })
    }
}

pub fn form(pairs: &[(&str, &str)]) -> FormState {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
