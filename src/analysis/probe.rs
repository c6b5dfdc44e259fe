//! Outbound HTTP probe client.
//!
//! Thin wrapper over `reqwest` that converts transport failures and
//! error-status responses into structured [`RawFailure`] records at the
//! boundary, so everything above it works with classified data.

use reqwest::header::ACCEPT;
use std::collections::HashMap;
use std::time::Duration;

use crate::classifier::{CapturedResponse, RawFailure};
use crate::error::{CoreError, Result};

/// Configuration for the probe HTTP client.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub follow_redirects: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: "Mozilla/5.0 (compatible; PageRodeo-Probe/1.0)".to_string(),
            follow_redirects: true,
        }
    }
}

/// HTTP client used by the analysis features.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: reqwest::Client,
}

impl ProbeClient {
    /// Create a new probe client from configuration.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        if config.timeout_seconds == 0 {
            return Err(CoreError::invalid_config("timeout_seconds must be positive"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::default()
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        Ok(Self { client })
    }

    /// `GET` a URL, converting transport errors into raw failures.
    pub async fn get(&self, url: &str) -> std::result::Result<reqwest::Response, RawFailure> {
        self.client.get(url).send().await.map_err(RawFailure::from)
    }

    /// `GET` a URL and fail on error statuses too, capturing the response
    /// (status, headers, decoded body) for classification.
    pub async fn get_checked(&self, url: &str) -> std::result::Result<reqwest::Response, RawFailure> {
        let response = self.get(url).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RawFailure::from_response(capture_response(response).await))
        }
    }

    /// `GET` a URL expecting JSON; returns the status and the decoded body
    /// when the payload was valid JSON.
    pub async fn get_json(
        &self,
        url: &str,
    ) -> std::result::Result<(u16, Option<serde_json::Value>), RawFailure> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(RawFailure::from)?;
        let status = response.status().as_u16();
        let body = response.json::<serde_json::Value>().await.ok();
        Ok((status, body))
    }

    /// `GET` a URL and return status plus raw body text.
    pub async fn get_text(&self, url: &str) -> std::result::Result<(u16, String), RawFailure> {
        let response = self.get(url).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(RawFailure::from)?;
        Ok((status, body))
    }

    /// `HEAD` a URL and return the response status.
    pub async fn head_status(&self, url: &str) -> std::result::Result<u16, RawFailure> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(RawFailure::from)?;
        Ok(response.status().as_u16())
    }
}

/// Capture an error-status response into a classification record.
pub async fn capture_response(response: reqwest::Response) -> CapturedResponse {
    let status = response.status().as_u16();

    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.to_string(), value.to_string());
        }
    }

    let body = response.json::<serde_json::Value>().await.ok();

    CapturedResponse {
        status,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_with_defaults() {
        let client = ProbeClient::new(ProbeConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = ProbeConfig {
            timeout_seconds: 0,
            ..ProbeConfig::default()
        };
        let result = ProbeClient::new(config);
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }

    #[test]
    fn test_redirect_policy_configurable() {
        let config = ProbeConfig {
            follow_redirects: false,
            ..ProbeConfig::default()
        };
        assert!(ProbeClient::new(config).is_ok());
    }
}
