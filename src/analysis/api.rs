//! API endpoint testing feature.
//!
//! Discovers a site's API endpoints and probes each with a `GET`, recording
//! status, latency and decoded body. The whole run goes through the
//! [`ErrorHandler`] so failures come back classified, and a per-session
//! [`DedupCache`] prevents duplicate concurrent runs for the same subject.

use std::time::Instant;

use crate::classifier::RawFailure;
use crate::error::Result;
use crate::handler::ErrorHandler;
use crate::session::{canonical_base_url, normalize_subject, DedupCache};
use crate::telemetry::TelemetrySink;
use crate::types::AppError;

use super::discovery::discover_endpoints;
use super::probe::{ProbeClient, ProbeConfig};

/// Feature label attached to classified errors from this analyzer.
pub const FEATURE_LABEL: &str = "API Analysis";

/// Outcome of probing a single endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EndpointResult {
    pub endpoint: String,
    pub status: Option<u16>,
    pub latency_ms: Option<u64>,
    pub pass: bool,
    pub body: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Full report for one analysis run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiAnalysisReport {
    /// Base URL the run probed.
    pub base_url: String,
    pub discovered: Vec<String>,
    pub results: Vec<EndpointResult>,
    pub passed: usize,
    /// Endpoints answering 401/403: alive but credentialed.
    pub auth_required: usize,
    pub failed: usize,
}

impl ApiAnalysisReport {
    fn new(base_url: &str, discovered: Vec<String>, results: Vec<EndpointResult>) -> Self {
        let passed = results.iter().filter(|r| r.pass).count();
        let auth_required = results
            .iter()
            .filter(|r| !r.pass && matches!(r.status, Some(401) | Some(403)))
            .count();
        let failed = results.len() - passed - auth_required;
        Self {
            base_url: base_url.to_string(),
            discovered,
            results,
            passed,
            auth_required,
            failed,
        }
    }
}

/// Driver for the "test API endpoints" feature.
pub struct ApiAnalyzer<S> {
    client: ProbeClient,
    handler: ErrorHandler<S>,
    cache: DedupCache,
    custom_endpoints: Vec<String>,
}

impl<S: TelemetrySink> ApiAnalyzer<S> {
    pub fn new(config: ProbeConfig, sink: S) -> Result<Self> {
        Ok(Self {
            client: ProbeClient::new(config)?,
            handler: ErrorHandler::new(FEATURE_LABEL, sink),
            cache: DedupCache::new(),
            custom_endpoints: Vec::new(),
        })
    }

    /// Restrict testing to a caller-supplied endpoint list instead of
    /// discovering one.
    pub fn with_custom_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.custom_endpoints = endpoints;
        self
    }

    /// The classified error retained from the most recent failed run.
    pub fn last_error(&self) -> Option<&AppError> {
        self.handler.last_error()
    }

    pub fn is_retrying(&self) -> bool {
        self.handler.is_retrying()
    }

    /// Dismiss the retained error.
    pub fn clear_error(&mut self) {
        self.handler.clear()
    }

    /// Forget which subjects were already checked this session.
    pub fn reset_session(&mut self) {
        self.cache.clear()
    }

    /// Analyze the API surface of a user-entered domain.
    ///
    /// The domain is normalized to a canonical `https://` base URL.
    /// Returns `Ok(None)` when the subject was already checked this
    /// session (the duplicate-run guard).
    pub async fn run(&mut self, domain: &str) -> std::result::Result<Option<ApiAnalysisReport>, AppError> {
        if domain.trim().is_empty() {
            return self
                .handler
                .run(
                    || async {
                        Err::<ApiAnalysisReport, _>(RawFailure::from_message(
                            "invalid domain: no domain provided",
                        ))
                    },
                    None,
                )
                .await
                .map(Some);
        }

        let subject = normalize_subject(domain);
        // Mark the subject as checked before any request goes out, so an
        // overlapping invocation cannot start a second run.
        if !self.cache.insert(&subject) {
            tracing::debug!(subject = %subject, "subject already checked this session, skipping");
            return Ok(None);
        }

        let base = canonical_base_url(domain);
        self.analyze_base_url(&base, &subject).await.map(Some)
    }

    /// Analyze a base URL used verbatim, bypassing canonicalization.
    pub async fn analyze_base_url(
        &mut self,
        base: &str,
        subject: &str,
    ) -> std::result::Result<ApiAnalysisReport, AppError> {
        let client = &self.client;
        let custom = self.custom_endpoints.clone();
        let base_owned = base.to_string();

        self.handler
            .run(
                move || {
                    let base = base_owned.clone();
                    let custom = custom.clone();
                    async move { probe_endpoints(client, &base, &custom).await }
                },
                Some(subject),
            )
            .await
    }
}

/// Discover and test the endpoints of one base URL.
async fn probe_endpoints(
    client: &ProbeClient,
    base: &str,
    custom_endpoints: &[String],
) -> std::result::Result<ApiAnalysisReport, RawFailure> {
    tracing::debug!(base, "starting API discovery");
    let discovered = discover_endpoints(client, base, custom_endpoints).await;

    let mut results = Vec::with_capacity(discovered.len());
    for endpoint in &discovered {
        tracing::debug!(endpoint = %endpoint, "testing endpoint");
        let start = Instant::now();
        match client.get_json(endpoint).await {
            Ok((status, body)) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                results.push(EndpointResult {
                    endpoint: endpoint.clone(),
                    status: Some(status),
                    latency_ms: Some(latency_ms),
                    pass: (200..300).contains(&status),
                    body,
                    error: None,
                });
            }
            Err(failure) => {
                results.push(EndpointResult {
                    endpoint: endpoint.clone(),
                    status: None,
                    latency_ms: None,
                    pass: false,
                    body: None,
                    error: failure.message,
                });
            }
        }
    }

    let report = ApiAnalysisReport::new(base, discovered, results);
    tracing::debug!(
        passed = report.passed,
        auth_required = report.auth_required,
        failed = report.failed,
        "API testing complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NoopSink;
    use crate::types::ErrorCategory;

    fn analyzer() -> ApiAnalyzer<NoopSink> {
        ApiAnalyzer::new(ProbeConfig::default(), NoopSink).expect("default config is valid")
    }

    #[tokio::test]
    async fn test_empty_domain_is_invalid_input() {
        let mut analyzer = analyzer();
        let error = analyzer.run("  ").await.unwrap_err();
        assert_eq!(error.category, ErrorCategory::InvalidInput);
        assert!(!error.retryable());
        assert_eq!(analyzer.last_error().map(|e| e.category), Some(ErrorCategory::InvalidInput));
    }

    #[tokio::test]
    async fn test_duplicate_subject_is_skipped_without_probing() {
        let mut analyzer = analyzer();
        analyzer.cache.insert("example.com");
        // Alternate spellings of the same subject hit the guard.
        let report = analyzer.run("https://www.example.com/").await.unwrap();
        assert!(report.is_none());

        analyzer.reset_session();
        assert!(analyzer.cache.is_empty());
    }

    #[tokio::test]
    async fn test_report_counters() {
        let results = vec![
            EndpointResult {
                endpoint: "https://example.com/api/ok".into(),
                status: Some(200),
                latency_ms: Some(12),
                pass: true,
                body: None,
                error: None,
            },
            EndpointResult {
                endpoint: "https://example.com/api/auth".into(),
                status: Some(401),
                latency_ms: Some(9),
                pass: false,
                body: None,
                error: None,
            },
            EndpointResult {
                endpoint: "https://example.com/api/broken".into(),
                status: Some(500),
                latency_ms: Some(30),
                pass: false,
                body: None,
                error: None,
            },
        ];
        let report = ApiAnalysisReport::new("https://example.com", Vec::new(), results);
        assert_eq!(report.passed, 1);
        assert_eq!(report.auth_required, 1);
        assert_eq!(report.failed, 1);
    }
}
