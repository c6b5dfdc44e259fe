//! Error logging and telemetry forwarding.
//!
//! `log_error` sits at the system boundary: it emits a truncated structured
//! log line for developers and forwards a full event to an external
//! analytics sink. Sink failures are swallowed; logging must never crash
//! the feature it is instrumenting.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{AppError, ErrorCategory, LOG_MESSAGE_TRUNCATION};

/// Structured event forwarded to the analytics collaborator.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorEvent {
    pub category: ErrorCategory,
    pub message: String,
    pub feature: String,
    pub domain: Option<String>,
    pub retryable: bool,
    pub error_code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorEvent {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            category: error.category,
            message: error.message.clone(),
            feature: error.feature.clone(),
            domain: error.domain.clone(),
            retryable: error.retryable(),
            error_code: error.code.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Narrow forwarding interface to an external analytics collector.
pub trait TelemetrySink: Send + Sync {
    fn capture(&self, event: &ErrorEvent) -> Result<()>;
}

/// Sink that drops every event. Useful for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn capture(&self, _event: &ErrorEvent) -> Result<()> {
        Ok(())
    }
}

/// Log a classified error to the dev channel and forward it to telemetry.
///
/// Fire-and-forget: a failing sink is reported at `warn` and otherwise
/// ignored.
pub fn log_error(error: &AppError, sink: &dyn TelemetrySink) {
    tracing::debug!(
        category = error.category.as_str(),
        message = %truncate(&error.message, LOG_MESSAGE_TRUNCATION),
        feature = %error.feature,
        domain = error.domain.as_deref().unwrap_or("unknown"),
        retryable = error.retryable(),
        "classified error"
    );

    let event = ErrorEvent::from_app_error(error);
    if let Err(sink_error) = sink.capture(&event) {
        tracing::warn!(error = %sink_error, "failed to forward error event to telemetry sink");
    }
}

fn truncate(message: &str, max_length: usize) -> String {
    if message.len() <= max_length {
        message.to_string()
    } else {
        let cut = message
            .char_indices()
            .take_while(|(index, _)| *index < max_length)
            .last()
            .map(|(index, ch)| index + ch.len_utf8())
            .unwrap_or(0);
        format!("{}...", &message[..cut])
    }
}
