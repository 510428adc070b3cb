//! Operator-facing diagnostics.
//!
//! A [`DiagnosticsSink`] is handed to the controller explicitly. The caller
//! creates it at startup and calls [`DiagnosticsSink::close`] at shutdown;
//! records arriving after that are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Diagnostic {
    /// Creates a record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] [{}] {}",
            self.timestamp.to_rfc3339(),
            self.level,
            self.message
        )?;
        if let Some(data) = &self.data {
            write!(f, " {data}")?;
        }
        Ok(())
    }
}

/// Destination for diagnostic records.
pub trait DiagnosticsSink: Send + Sync {
    /// Records a diagnostic. Ignored once the sink is closed.
    fn record(&self, diagnostic: Diagnostic);

    /// Flushes buffered records.
    fn flush(&self) {}

    /// Flushes and stops accepting records.
    fn close(&self);

    /// Returns whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;

    /// Records an info-level message with data.
    fn info(&self, message: &str, data: Option<Value>) {
        self.record(with_optional_data(Diagnostic::new(Level::Info, message), data));
    }

    /// Records an error-level message with data.
    fn error(&self, message: &str, data: Option<Value>) {
        self.record(with_optional_data(Diagnostic::new(Level::Error, message), data));
    }
}

fn with_optional_data(diagnostic: Diagnostic, data: Option<Value>) -> Diagnostic {
    match data {
        Some(data) => diagnostic.with_data(data),
        None => diagnostic,
    }
}

/// Sink that forwards records to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink {
    closed: AtomicBool,
}

impl TracingSink {
    /// Creates an open sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticsSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        if self.is_closed() {
            return;
        }
        let data = diagnostic.data.map(|d| d.to_string()).unwrap_or_default();
        let message = diagnostic.message;
        match diagnostic.level {
            Level::Debug => tracing::debug!(data = %data, "{message}"),
            Level::Info => tracing::info!(data = %data, "{message}"),
            Level::Warn => tracing::warn!(data = %data, "{message}"),
            Level::Error => tracing::error!(data = %data, "{message}"),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Sink that keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
    closed: AtomicBool,
}

impl MemorySink {
    /// Creates an empty, open sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the records at `level`.
    pub fn entries_at(&self, level: Level) -> Vec<Diagnostic> {
        self.entries()
            .into_iter()
            .filter(|d| d.level == level)
            .collect()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        if self.is_closed() {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
