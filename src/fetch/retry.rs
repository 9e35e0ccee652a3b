//! Retry policy and failure classification for outbound calls

use rand::Rng;
use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Backoff configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles each retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Add up to 20% random delay on top of the exponential step
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry`, capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        let step = self.base_delay.saturating_mul(factor).min(self.max_delay);

        if self.jitter && !step.is_zero() {
            let extra = rand::thread_rng().gen_range(0.0..=0.2);
            step.mul_f64(1.0 + extra).min(self.max_delay)
        } else {
            step
        }
    }
}

/// Why a single attempt failed
#[derive(Debug)]
pub enum AttemptFailure {
    /// The request never produced a response
    Transport(reqwest::Error),
    /// The server answered with a non-success status
    Status { status: StatusCode, body: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Transport(e) if e.is_timeout() => write!(f, "request timed out: {}", e),
            AttemptFailure::Transport(e) if e.is_connect() => write!(f, "connection failed: {}", e),
            AttemptFailure::Transport(e) => write!(f, "transport error: {}", e),
            AttemptFailure::Status { status, body } if body.is_empty() => write!(f, "HTTP {}", status),
            AttemptFailure::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
        }
    }
}

/// Retry classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Connection, timeout or other request-level failure
    Network,
    /// Server-side failure of a request that is safe to repeat
    Idempotent,
    /// Anything else; surfaces immediately
    Terminal,
}

impl FailureClass {
    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureClass::Terminal)
    }
}

/// Methods that may be repeated without changing server state
pub fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE | Method::TRACE
    )
}

/// Classify a failed attempt
pub fn classify(method: &Method, failure: &AttemptFailure) -> FailureClass {
    match failure {
        AttemptFailure::Transport(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
            FailureClass::Network
        }
        AttemptFailure::Transport(_) => FailureClass::Terminal,
        AttemptFailure::Status { status, .. }
            if is_idempotent(method)
                && (status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS) =>
        {
            FailureClass::Idempotent
        }
        AttemptFailure::Status { .. } => FailureClass::Terminal,
    }
}

/// Bookkeeping for one logical call
#[derive(Debug, Default, Clone)]
pub struct RetryState {
    /// Attempts made so far
    pub attempts: u32,
    pub last_error: Option<String>,
    pub last_delay: Option<Duration>,
}

impl RetryState {
    /// Record a failed attempt
    pub fn record_failure(&mut self, error: String) {
        self.attempts += 1;
        self.last_error = Some(error);
    }

    /// Retries performed so far
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}
