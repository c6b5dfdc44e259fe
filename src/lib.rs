//! PageRodeo core - error classification and retry engine
//!
//! This crate provides the resilience layer of the PageRodeo site-analysis
//! platform: it classifies failures from outbound probes into a closed
//! taxonomy, resolves bounded retry strategies, executes retries with
//! backoff, and forwards structured error events to telemetry. Feature
//! drivers (such as the API endpoint analyzer) sit on top and expose
//! classified, user-presentable errors.

// Core modules
pub mod classifier;
pub mod error;
pub mod types;

// Policy and execution
pub mod retry;

// Presentation and boundary collaborators
pub mod messages;
pub mod telemetry;

// Feature orchestration
pub mod analysis;
pub mod handler;
pub mod session;

// Re-export main types for convenience
pub use analysis::{ApiAnalysisReport, ApiAnalyzer, EndpointResult, ProbeClient, ProbeConfig};
pub use classifier::{classify, CapturedResponse, NetworkCode, RawFailure};
pub use error::{CoreError, Result};
pub use handler::ErrorHandler;
pub use retry::{
    backoff_delay_ms, execute_with_retry, RetryOptions, RetryStrategy, MAX_BACKOFF_DELAY_MS,
    MAX_RETRY_ATTEMPTS,
};
pub use session::{canonical_base_url, normalize_subject, DedupCache};
pub use telemetry::{log_error, ErrorEvent, NoopSink, TelemetrySink};
pub use types::{AppError, DisplayOptions, ErrorCategory, Severity, TechnicalDetails};

/// Run an API analysis for a domain with default configuration and no
/// telemetry forwarding.
pub async fn run_api_analysis(domain: &str) -> Result<Option<ApiAnalysisReport>> {
    let mut analyzer = ApiAnalyzer::new(ProbeConfig::default(), NoopSink)?;
    Ok(analyzer.run(domain).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classification, policy and display stay consistent end to end.
    #[test]
    fn test_core_pipeline_consistency() {
        let raw = RawFailure::from_response(CapturedResponse::new(503));
        let error = AppError::from_failure(&raw, "Performance Analysis", Some("example.com"));

        assert_eq!(error.category, ErrorCategory::ServerError);
        assert!(error.retryable());

        let strategy = RetryStrategy::for_error(&error);
        assert!(strategy.should_retry);
        assert_eq!(strategy.max_attempts, 3);

        let options = DisplayOptions::for_error(&error);
        assert!(options.auto_retry);
        assert!(options.show_retry_button);

        assert!(!error.user_message().is_empty());
        assert!(!error.troubleshooting_steps().is_empty());
    }

    /// Every category yields a complete user-facing bundle.
    #[test]
    fn test_taxonomy_is_total() {
        for category in ErrorCategory::all() {
            let _ = category.severity();
            let _ = category.is_retryable();
            assert!(!category.as_str().is_empty());
        }
    }

    #[test]
    fn test_error_types() {
        let error = CoreError::invalid_config("test error");
        assert!(error.to_string().contains("Invalid probe configuration"));
    }
}
