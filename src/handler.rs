//! Feature-level error handling driver.
//!
//! Glues the core together for one feature: runs an operation, classifies
//! its failure, resolves a retry plan, re-runs through the executor when
//! the plan says so, and logs the final outcome. UI-facing state (the
//! retained error, the retrying flag) mirrors the lifecycle described in
//! the data model: an error lives until dismissed or until a new run
//! begins.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::classifier::RawFailure;
use crate::retry::{execute_with_retry, RetryOptions, RetryStrategy};
use crate::telemetry::{log_error, TelemetrySink};
use crate::types::AppError;

/// Per-feature orchestration of classify → plan → retry → log.
///
/// Owns no shared state across features; each handler instance guards one
/// feature's in-flight state. Concurrent runs for the same subject are the
/// caller's responsibility (see [`crate::session::DedupCache`]).
pub struct ErrorHandler<S> {
    feature: String,
    sink: S,
    last_error: Option<AppError>,
    retrying: Arc<AtomicBool>,
}

impl<S: TelemetrySink> ErrorHandler<S> {
    pub fn new(feature: impl Into<String>, sink: S) -> Self {
        Self {
            feature: feature.into(),
            sink,
            last_error: None,
            retrying: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The error retained from the most recent failed run, if any.
    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    /// Whether a retry sequence is currently in flight.
    pub fn is_retrying(&self) -> bool {
        self.retrying.load(Ordering::SeqCst)
    }

    /// Dismiss the retained error.
    pub fn clear(&mut self) {
        self.last_error = None;
    }

    /// Run `operation` with full error handling.
    ///
    /// The first invocation classifies any failure; if the resolved
    /// strategy allows retrying, the operation is re-run through the
    /// bounded executor. The final failure is logged, retained, and
    /// returned as a classified [`AppError`].
    pub async fn run<T, F, Fut>(
        &mut self,
        mut operation: F,
        subject: Option<&str>,
    ) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RawFailure>>,
    {
        // A new run implicitly clears the previous error.
        self.clear();

        let raw = match operation().await {
            Ok(value) => return Ok(value),
            Err(raw) => raw,
        };

        let error = AppError::from_failure(&raw, &self.feature, subject);
        let strategy = RetryStrategy::for_error(&error);
        if !strategy.should_retry {
            return Err(self.finish(error));
        }

        tracing::debug!(
            category = error.category.as_str(),
            max_attempts = strategy.max_attempts,
            delay_ms = strategy.delay_ms,
            "retrying after classified failure"
        );

        self.retrying.store(true, Ordering::SeqCst);
        let retrying = Arc::clone(&self.retrying);
        let feature = self.feature.clone();
        let options =
            RetryOptions::from_strategy(&strategy).with_on_retry(move |attempt, delay_ms| {
                retrying.store(true, Ordering::SeqCst);
                tracing::debug!(feature = %feature, attempt, delay_ms, "retry scheduled");
            });

        let result = execute_with_retry(&mut operation, options).await;
        self.retrying.store(false, Ordering::SeqCst);

        match result {
            Ok(value) => Ok(value),
            Err(raw) => {
                let error = AppError::from_failure(&raw, &self.feature, subject);
                Err(self.finish(error))
            }
        }
    }

    fn finish(&mut self, error: AppError) -> AppError {
        log_error(&error, &self.sink);
        self.last_error = Some(error.clone());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{CapturedResponse, NetworkCode};
    use crate::telemetry::NoopSink;
    use crate::types::ErrorCategory;
    use std::sync::atomic::AtomicU32;

    #[tokio::test(start_paused = true)]
    async fn test_success_passes_value_through() {
        let mut handler = ErrorHandler::new("API Analysis", NoopSink);
        let result: Result<u32, AppError> =
            handler.run(|| async { Ok(7) }, Some("example.com")).await;
        assert_eq!(result.unwrap(), 7);
        assert!(handler.last_error().is_none());
        assert!(!handler.is_retrying());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut handler = ErrorHandler::new("API Analysis", NoopSink);

        let calls_in = calls.clone();
        let result: Result<(), AppError> = handler
            .run(
                move || {
                    let calls = calls_in.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(RawFailure::from_status(404))
                    }
                },
                Some("example.com"),
            )
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.category, ErrorCategory::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            handler.last_error().map(|e| e.category),
            Some(ErrorCategory::NotFound)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_server_error_recovers() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut handler = ErrorHandler::new("API Analysis", NoopSink);

        let calls_in = calls.clone();
        let result: Result<&str, AppError> = handler
            .run(
                move || {
                    let calls = calls_in.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(RawFailure::from_response(CapturedResponse::new(503)))
                        } else {
                            Ok("recovered")
                        }
                    }
                },
                Some("example.com"),
            )
            .await;

        assert_eq!(result.unwrap(), "recovered");
        // One classifying failure, then recovery on the first executor attempt.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(handler.last_error().is_none());
        assert!(!handler.is_retrying());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_retain_classified_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut handler = ErrorHandler::new("Performance Analysis", NoopSink);

        let calls_in = calls.clone();
        let result: Result<(), AppError> = handler
            .run(
                move || {
                    let calls = calls_in.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(RawFailure::from_code(NetworkCode::TimedOut))
                    }
                },
                Some("slow.example.com"),
            )
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.category, ErrorCategory::Timeout);
        assert!(error.retryable());
        // Initial classifying call plus the timeout strategy's two attempts.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(error.domain.as_deref(), Some("slow.example.com"));
        assert!(!handler.is_retrying());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_run_clears_previous_error() {
        let mut handler = ErrorHandler::new("API Analysis", NoopSink);
        let _: Result<(), AppError> = handler
            .run(|| async { Err(RawFailure::from_status(403)) }, None)
            .await;
        assert!(handler.last_error().is_some());

        let result: Result<u32, AppError> = handler.run(|| async { Ok(1) }, None).await;
        assert_eq!(result.unwrap(), 1);
        assert!(handler.last_error().is_none());
    }
}
