use thiserror::Error;

/// Result type alias for pagerodeo-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error types for the resilience core's own operations.
///
/// Note the split: failures of the *probed* site are classified into
/// [`crate::AppError`]; this enum covers failures of the core itself
/// (bad configuration, telemetry plumbing, URL handling).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid probe configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Telemetry forwarding failed: {message}")]
    Telemetry { message: String },

    #[error(transparent)]
    Analysis(#[from] crate::types::AppError),
}

impl CoreError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new telemetry forwarding error
    pub fn telemetry<S: Into<String>>(message: S) -> Self {
        Self::Telemetry {
            message: message.into(),
        }
    }
}
