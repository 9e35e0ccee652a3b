//! Resilient outbound fetching

pub mod client;
pub mod retry;

pub use client::{ResilientClient, DEFAULT_TIMEOUT};
pub use retry::{classify, AttemptFailure, FailureClass, RetryPolicy, RetryState};
