//! Retry policy and bounded retry execution.
//!
//! [`RetryStrategy::for_error`] is a pure decision table from a classified
//! error to a bounded retry plan; [`execute_with_retry`] applies such a plan
//! to an arbitrary async operation. Attempts are strictly sequential and
//! only the final attempt's error reaches the caller.

use std::future::Future;
use std::time::Duration;

use crate::types::{AppError, ErrorCategory};

/// Hard ceiling on operation invocations per retry run, regardless of the
/// caller-supplied attempt budget.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Exponential backoff never waits longer than this between attempts.
pub const MAX_BACKOFF_DELAY_MS: u64 = 10_000;

/// Fallback wait for rate-limited requests when the server did not say.
const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 5_000;

/// Bounded retry plan computed from a classified error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStrategy {
    pub should_retry: bool,
    pub max_attempts: u32,
    /// Base delay before the first retry.
    pub delay_ms: u64,
    pub use_exponential_backoff: bool,
}

impl RetryStrategy {
    /// The do-not-retry strategy. Invariant: all fields zeroed.
    pub fn none() -> Self {
        Self {
            should_retry: false,
            max_attempts: 0,
            delay_ms: 0,
            use_exponential_backoff: false,
        }
    }

    /// Resolve the retry plan for an error.
    ///
    /// Pure and deterministic; no jitter. Rate-limited requests honor a
    /// captured `retry-after` header, server errors retry aggressively,
    /// timeouts and network errors moderately, everything else not at all.
    pub fn for_error(error: &AppError) -> Self {
        if !error.retryable() {
            return Self::none();
        }

        match error.category {
            ErrorCategory::RateLimited => {
                let delay_ms = error
                    .technical_details
                    .as_ref()
                    .and_then(|details| details.retry_after_ms())
                    .unwrap_or(DEFAULT_RATE_LIMIT_DELAY_MS);
                Self {
                    should_retry: true,
                    max_attempts: 1,
                    delay_ms,
                    use_exponential_backoff: false,
                }
            }
            ErrorCategory::ServerError => Self {
                should_retry: true,
                max_attempts: 3,
                delay_ms: 1_000,
                use_exponential_backoff: true,
            },
            ErrorCategory::Timeout | ErrorCategory::NetworkError => Self {
                should_retry: true,
                max_attempts: 2,
                delay_ms: 2_000,
                use_exponential_backoff: true,
            },
            // The retryable set and this table are kept in sync; any
            // category reaching here without a plan does not retry.
            _ => Self::none(),
        }
    }
}

/// Exponential backoff delay for a 1-based attempt number, clamped to
/// [`MAX_BACKOFF_DELAY_MS`].
pub fn backoff_delay_ms(attempt: u32, base_delay_ms: u64) -> u64 {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    base_delay_ms.saturating_mul(factor).min(MAX_BACKOFF_DELAY_MS)
}

/// Options for [`execute_with_retry`].
pub struct RetryOptions {
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub use_exponential_backoff: bool,
    /// Invoked synchronously with `(attempt, delay_ms)` before each
    /// inter-attempt sleep. Notification only; cannot affect control flow.
    pub on_retry: Option<Box<dyn FnMut(u32, u64) + Send>>,
}

impl RetryOptions {
    pub fn new(max_attempts: u32, delay_ms: u64, use_exponential_backoff: bool) -> Self {
        Self {
            max_attempts,
            delay_ms,
            use_exponential_backoff,
            on_retry: None,
        }
    }

    pub fn from_strategy(strategy: &RetryStrategy) -> Self {
        Self::new(
            strategy.max_attempts,
            strategy.delay_ms,
            strategy.use_exponential_backoff,
        )
    }

    pub fn with_on_retry(mut self, on_retry: impl FnMut(u32, u64) + Send + 'static) -> Self {
        self.on_retry = Some(Box::new(on_retry));
        self
    }
}

impl std::fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("delay_ms", &self.delay_ms)
            .field("use_exponential_backoff", &self.use_exponential_backoff)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

/// Run `operation` up to the bounded number of attempts, sleeping between
/// failures according to the options.
///
/// The attempt budget is clamped to [`MAX_RETRY_ATTEMPTS`] and a budget of
/// zero still makes exactly one call: zero retries never means zero
/// attempts. Intermediate failures are observable only through `on_retry`.
pub async fn execute_with_retry<T, E, F, Fut>(
    mut operation: F,
    mut options: RetryOptions,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = options.max_attempts.clamp(1, MAX_RETRY_ATTEMPTS);

    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(error);
                }

                let delay_ms = if options.use_exponential_backoff {
                    backoff_delay_ms(attempt, options.delay_ms)
                } else {
                    options.delay_ms
                };

                if let Some(on_retry) = options.on_retry.as_mut() {
                    on_retry(attempt, delay_ms);
                }

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
