//! HTTP client with bounded retries and source-attributed errors

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::retry::{classify, AttemptFailure, RetryPolicy, RetryState};
use crate::common::errors::{PlanError, Result, Source};

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Longest response body excerpt kept in error messages
const BODY_EXCERPT_LEN: usize = 200;

/// Outbound client shared by every upstream collaborator
///
/// Each attempt is bounded by the client timeout. Connection-level failures
/// are retried for any method; server errors only for idempotent methods.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    /// HTTP client
    client: Client,
    /// Backoff configuration
    policy: RetryPolicy,
}

impl ResilientClient {
    /// Create a client with the default timeout and retry policy
    pub fn new() -> Result<Self> {
        Self::with_policy(DEFAULT_TIMEOUT, RetryPolicy::default())
    }

    /// Create a client with a custom timeout and retry policy
    pub fn with_policy(timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlanError::Internal(e.to_string()))?;

        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send a request and decode its JSON body, retrying per the policy
    ///
    /// `build` is called once per attempt so every attempt is a fresh request.
    /// Exhausted or terminal failures are attributed to `origin`.
    #[instrument(skip(self, origin, build), fields(origin = %origin))]
    pub async fn send_json<T, F>(&self, origin: &Source, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut state = RetryState::default();

        loop {
            let request = build(&self.client).build().map_err(|e| {
                PlanError::upstream(origin.clone(), format!("invalid request: {}", e))
            })?;
            let method = request.method().clone();
            debug!("{} {} (attempt {})", method, request.url(), state.attempts + 1);

            let failure = match self.client.execute(request).await {
                Ok(response) if response.status().is_success() => {
                    return response.json::<T>().await.map_err(|e| {
                        PlanError::upstream(origin.clone(), format!("malformed response body: {}", e))
                    });
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    AttemptFailure::Status {
                        status,
                        body: excerpt(&body),
                    }
                }
                Err(e) => AttemptFailure::Transport(e),
            };

            let class = classify(&method, &failure);
            state.record_failure(failure.to_string());

            if !class.is_retryable() || state.retries() >= self.policy.max_retries {
                let reason = state.last_error.take().unwrap_or_default();
                let message = if state.attempts > 1 {
                    format!("{} (after {} attempts)", reason, state.attempts)
                } else {
                    reason
                };
                return Err(PlanError::upstream(origin.clone(), message));
            }

            let delay = self.policy.delay_for(state.retries());
            state.last_delay = Some(delay);
            warn!(
                attempt = state.attempts,
                delay_ms = delay.as_millis() as u64,
                class = ?class,
                error = state.last_error.as_deref().unwrap_or_default(),
                "retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
