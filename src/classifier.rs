//! Failure classification.
//!
//! The underlying HTTP client error is converted into a structured
//! [`RawFailure`] record at the place it is first caught, so the classifier
//! works on explicit fields instead of probing arbitrary error shapes.
//! Message substrings are matched before codes and status lines because the
//! text frequently disambiguates causes that share the same transport code.

use std::collections::HashMap;

use crate::types::ErrorCategory;

/// Low-level network error codes surfaced by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCode {
    /// Hostname could not be resolved (`ENOTFOUND`).
    HostNotFound,
    /// Connection timed out (`ETIMEDOUT`).
    TimedOut,
    /// Socket read timed out (`ESOCKETTIMEDOUT`).
    SocketTimedOut,
    /// Remote refused the connection (`ECONNREFUSED`).
    ConnectionRefused,
    /// Connection reset by peer (`ECONNRESET`).
    ConnectionReset,
}

impl NetworkCode {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkCode::HostNotFound => "ENOTFOUND",
            NetworkCode::TimedOut => "ETIMEDOUT",
            NetworkCode::SocketTimedOut => "ESOCKETTIMEDOUT",
            NetworkCode::ConnectionRefused => "ECONNREFUSED",
            NetworkCode::ConnectionReset => "ECONNRESET",
        }
    }
}

/// HTTP response captured when a request completed with an error status.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl CapturedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Structured pre-classification record for a caught failure.
///
/// Built at the boundary where the failure first appears: from a
/// `reqwest::Error`, from an error-status response, or directly by a caller
/// that only has a message. All fields are optional; an empty record
/// classifies as [`ErrorCategory::Unknown`].
#[derive(Debug, Clone, Default)]
pub struct RawFailure {
    pub message: Option<String>,
    pub code: Option<NetworkCode>,
    /// Status exposed directly on the failure, without a captured response.
    pub status: Option<u16>,
    pub response: Option<CapturedResponse>,
}

impl RawFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn from_code(code: NetworkCode) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn from_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn from_response(response: CapturedResponse) -> Self {
        Self {
            response: Some(response),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<reqwest::Error> for RawFailure {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_timeout() {
            Some(NetworkCode::TimedOut)
        } else if error.is_connect() {
            Some(NetworkCode::ConnectionRefused)
        } else {
            None
        };

        // Decode failures carry a "parse" marker so the message rules pick
        // them up as PARSE_ERROR rather than falling through to UNKNOWN.
        let message = if error.is_decode() {
            format!("failed to parse response body: {}", error)
        } else {
            error.to_string()
        };

        Self {
            message: Some(message),
            code,
            status: error.status().map(|status| status.as_u16()),
            response: None,
        }
    }
}

/// Assign a category to a raw failure.
///
/// Total and deterministic: the same input always yields the same category
/// and nothing falls outside the taxonomy. Precedence is message text, then
/// network code, then captured response status, then direct status.
pub fn classify(raw: &RawFailure) -> ErrorCategory {
    if let Some(message) = &raw.message {
        if message.contains("cannot be resolved")
            || message.contains("Domain not found")
            || message.contains("ENOTFOUND")
        {
            return ErrorCategory::DnsError;
        }
        if message.contains("invalid domain") {
            return ErrorCategory::InvalidInput;
        }
        if message.contains("certificate") || message.contains("SSL") {
            return ErrorCategory::SslError;
        }
        if message.contains("CORS") || message.contains("cross-origin") {
            return ErrorCategory::CorsError;
        }
        if message.contains("parse") || message.contains("JSON") {
            return ErrorCategory::ParseError;
        }
    }

    if let Some(code) = raw.code {
        return match code {
            NetworkCode::HostNotFound => ErrorCategory::DnsError,
            NetworkCode::TimedOut | NetworkCode::SocketTimedOut => ErrorCategory::Timeout,
            NetworkCode::ConnectionRefused | NetworkCode::ConnectionReset => {
                ErrorCategory::NetworkError
            }
        };
    }

    if let Some(response) = &raw.response {
        if let Some(category) = classify_status(response.status) {
            return category;
        }
    }

    if let Some(status) = raw.status {
        if let Some(category) = classify_status(status) {
            return category;
        }
    }

    ErrorCategory::Unknown
}

/// Status-line mapping, the least specific classification signal.
fn classify_status(status: u16) -> Option<ErrorCategory> {
    match status {
        401 => Some(ErrorCategory::AuthError),
        403 => Some(ErrorCategory::Forbidden),
        404 => Some(ErrorCategory::NotFound),
        408 => Some(ErrorCategory::Timeout),
        429 => Some(ErrorCategory::RateLimited),
        status if status >= 500 => Some(ErrorCategory::ServerError),
        status if status >= 400 => Some(ErrorCategory::ClientError),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_failure_is_unknown() {
        assert_eq!(classify(&RawFailure::default()), ErrorCategory::Unknown);
    }

    #[test]
    fn test_message_rules() {
        let cases = [
            ("getaddrinfo ENOTFOUND nope.example", ErrorCategory::DnsError),
            ("host cannot be resolved", ErrorCategory::DnsError),
            ("Domain not found", ErrorCategory::DnsError),
            ("invalid domain entered", ErrorCategory::InvalidInput),
            ("certificate has expired", ErrorCategory::SslError),
            ("SSL handshake failed", ErrorCategory::SslError),
            ("blocked by CORS policy", ErrorCategory::CorsError),
            ("cross-origin request denied", ErrorCategory::CorsError),
            ("failed to parse body", ErrorCategory::ParseError),
            ("unexpected JSON token", ErrorCategory::ParseError),
        ];
        for (message, expected) in cases {
            assert_eq!(classify(&RawFailure::from_message(message)), expected, "{message}");
        }
    }

    #[test]
    fn test_message_matching_is_case_sensitive() {
        // "ssl" in lowercase is not a recognized marker.
        assert_eq!(
            classify(&RawFailure::from_message("ssl went wrong")),
            ErrorCategory::Unknown
        );
    }

    #[test]
    fn test_message_takes_precedence_over_status() {
        let raw = RawFailure::from_response(CapturedResponse::new(500))
            .with_message("SSL certificate rejected");
        assert_eq!(classify(&raw), ErrorCategory::SslError);
    }

    #[test]
    fn test_network_code_rules() {
        let cases = [
            (NetworkCode::HostNotFound, ErrorCategory::DnsError),
            (NetworkCode::TimedOut, ErrorCategory::Timeout),
            (NetworkCode::SocketTimedOut, ErrorCategory::Timeout),
            (NetworkCode::ConnectionRefused, ErrorCategory::NetworkError),
            (NetworkCode::ConnectionReset, ErrorCategory::NetworkError),
        ];
        for (code, expected) in cases {
            assert_eq!(classify(&RawFailure::from_code(code)), expected);
        }
    }

    #[test]
    fn test_status_rules() {
        let cases = [
            (401, ErrorCategory::AuthError),
            (403, ErrorCategory::Forbidden),
            (404, ErrorCategory::NotFound),
            (408, ErrorCategory::Timeout),
            (429, ErrorCategory::RateLimited),
            (500, ErrorCategory::ServerError),
            (503, ErrorCategory::ServerError),
            (599, ErrorCategory::ServerError),
            (400, ErrorCategory::ClientError),
            (422, ErrorCategory::ClientError),
        ];
        for (status, expected) in cases {
            assert_eq!(classify(&RawFailure::from_status(status)), expected, "{status}");
            assert_eq!(
                classify(&RawFailure::from_response(CapturedResponse::new(status))),
                expected,
                "response {status}"
            );
        }
    }

    #[test]
    fn test_success_status_is_unknown() {
        assert_eq!(classify(&RawFailure::from_status(200)), ErrorCategory::Unknown);
        assert_eq!(classify(&RawFailure::from_status(302)), ErrorCategory::Unknown);
    }

    #[test]
    fn test_unmatched_response_status_falls_back_to_direct_status() {
        let raw = RawFailure {
            response: Some(CapturedResponse::new(200)),
            status: Some(503),
            ..RawFailure::default()
        };
        assert_eq!(classify(&raw), ErrorCategory::ServerError);
    }

    #[test]
    fn test_dns_scenario() {
        // A resolution failure surfaces as non-retryable DNS_ERROR.
        let category = classify(&RawFailure::from_message("cannot be resolved"));
        assert_eq!(category, ErrorCategory::DnsError);
        assert!(!category.is_retryable());
    }
}
