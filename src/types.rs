use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::classifier::{classify, RawFailure};

/// Maximum message length forwarded to log output
pub const LOG_MESSAGE_TRUNCATION: usize = 100;

/// Closed taxonomy of failure causes observed while probing a site.
///
/// Every failure is assigned exactly one category; classification is total
/// and falls back to `Unknown` for anything unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    DnsError,
    Timeout,
    NetworkError,
    AuthError,
    Forbidden,
    NotFound,
    RateLimited,
    ServerError,
    ClientError,
    InvalidInput,
    SslError,
    CorsError,
    ParseError,
    Unknown,
}

impl ErrorCategory {
    /// Whether errors of this category are worth retrying.
    ///
    /// The retryable set is fixed: transient transport and server-side
    /// conditions only. Everything else requires caller intervention.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorCategory::Timeout
                | ErrorCategory::NetworkError
                | ErrorCategory::ServerError
                | ErrorCategory::RateLimited
        )
    }

    /// Display severity for this category.
    pub fn severity(self) -> Severity {
        match self {
            ErrorCategory::DnsError
            | ErrorCategory::AuthError
            | ErrorCategory::Forbidden
            | ErrorCategory::NotFound
            | ErrorCategory::SslError
            | ErrorCategory::ParseError
            | ErrorCategory::Unknown => Severity::Error,
            ErrorCategory::Timeout
            | ErrorCategory::NetworkError
            | ErrorCategory::ServerError
            | ErrorCategory::ClientError
            | ErrorCategory::InvalidInput => Severity::Warning,
            ErrorCategory::RateLimited | ErrorCategory::CorsError => Severity::Info,
        }
    }

    /// Stable wire/log name for the category (e.g. `DNS_ERROR`).
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::DnsError => "DNS_ERROR",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::NetworkError => "NETWORK_ERROR",
            ErrorCategory::AuthError => "AUTH_ERROR",
            ErrorCategory::Forbidden => "FORBIDDEN",
            ErrorCategory::NotFound => "NOT_FOUND",
            ErrorCategory::RateLimited => "RATE_LIMITED",
            ErrorCategory::ServerError => "SERVER_ERROR",
            ErrorCategory::ClientError => "CLIENT_ERROR",
            ErrorCategory::InvalidInput => "INVALID_INPUT",
            ErrorCategory::SslError => "SSL_ERROR",
            ErrorCategory::CorsError => "CORS_ERROR",
            ErrorCategory::ParseError => "PARSE_ERROR",
            ErrorCategory::Unknown => "UNKNOWN",
        }
    }

    /// All categories, for exhaustive table checks.
    pub fn all() -> [ErrorCategory; 14] {
        [
            ErrorCategory::DnsError,
            ErrorCategory::Timeout,
            ErrorCategory::NetworkError,
            ErrorCategory::AuthError,
            ErrorCategory::Forbidden,
            ErrorCategory::NotFound,
            ErrorCategory::RateLimited,
            ErrorCategory::ServerError,
            ErrorCategory::ClientError,
            ErrorCategory::InvalidInput,
            ErrorCategory::SslError,
            ErrorCategory::CorsError,
            ErrorCategory::ParseError,
            ErrorCategory::Unknown,
        ]
    }
}

/// How prominently an error should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Raw diagnostic payload captured alongside a failure.
///
/// Never shown to end users by default; reserved for privileged contexts
/// and for policy decisions such as honoring `retry-after`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TechnicalDetails {
    pub status: Option<u16>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<serde_json::Value>,
}

impl TechnicalDetails {
    /// Server-requested retry delay in milliseconds, parsed from the
    /// `retry-after` response header (seconds) when one was captured.
    pub fn retry_after_ms(&self) -> Option<u64> {
        let headers = self.headers.as_ref()?;
        let value = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
            .map(|(_, value)| value)?;
        value.trim().parse::<u64>().ok().map(|seconds| seconds * 1000)
    }
}

/// A classified, user-presentable error bound to the feature that raised it.
///
/// Immutable once constructed; `retryable` is derived from the category and
/// can never be set independently.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AppError {
    pub category: ErrorCategory,
    /// Underlying error code or HTTP status, `"UNKNOWN"` when absent.
    pub code: String,
    /// Raw underlying message.
    pub message: String,
    /// Feature that triggered the error, e.g. `"SSL Analysis"`.
    pub feature: String,
    /// Subject under test, typically the hostname being probed.
    pub domain: Option<String>,
    pub timestamp: DateTime<Utc>,
    retryable: bool,
    pub technical_details: Option<TechnicalDetails>,
}

impl AppError {
    /// Build an `AppError` from a structured raw failure.
    ///
    /// Total: any failure shape produces a value, defaulting to
    /// `Unknown`/non-retryable when nothing is recognized.
    pub fn from_failure(raw: &RawFailure, feature: impl Into<String>, domain: Option<&str>) -> Self {
        let category = classify(raw);

        let code = raw
            .code
            .map(|code| code.as_str().to_string())
            .or_else(|| raw.response.as_ref().map(|r| r.status.to_string()))
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let message = raw
            .message
            .clone()
            .unwrap_or_else(|| "An unexpected error occurred".to_string());

        let technical_details = raw.response.as_ref().map(|response| TechnicalDetails {
            status: Some(response.status),
            headers: Some(response.headers.clone()),
            body: response.body.clone(),
        });

        Self {
            category,
            code,
            message,
            feature: feature.into(),
            domain: domain.map(str::to_string),
            timestamp: Utc::now(),
            retryable: category.is_retryable(),
            technical_details,
        }
    }

    /// Whether this error is worth retrying. Always consistent with the
    /// category-to-retryable mapping.
    pub fn retryable(&self) -> bool {
        self.retryable
    }

    pub fn severity(&self) -> Severity {
        self.category.severity()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.category.as_str(), self.feature, self.message)
    }
}

impl std::error::Error for AppError {}

/// Rendering policy for a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayOptions {
    /// Technical details are admin-only; standard display withholds them.
    pub show_technical_details: bool,
    pub show_retry_button: bool,
    pub show_dismiss_button: bool,
    pub severity: Severity,
    /// Server errors and timeouts retry without waiting for the user.
    pub auto_retry: bool,
}

impl DisplayOptions {
    pub fn for_error(error: &AppError) -> Self {
        Self {
            show_technical_details: false,
            show_retry_button: error.retryable(),
            show_dismiss_button: true,
            severity: error.severity(),
            auto_retry: matches!(
                error.category,
                ErrorCategory::ServerError | ErrorCategory::Timeout
            ),
        }
    }
}
