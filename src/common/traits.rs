//! Trait definitions for the plan's collaborators

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::errors::{Result, Source, TaskKind};
use super::types::{AnalysisRequest, MarketAnalysis};

/// Trait for the generative text service
///
/// Returns the raw analysis text; section parsing happens downstream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Produce a free-form analysis for the request
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String>;
}

/// Trait for a market-data provider (company database, statistics portal, etc.)
///
/// Payloads are provider-specific; the pipeline's normalize step is the only
/// place they are reconciled.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndustryDataProvider: Send + Sync {
    /// Search the provider for a category keyword
    ///
    /// # Arguments
    /// * `category` - The caller's category as entered, not the cache key
    async fn search(&self, category: &str) -> Result<Value>;

    /// Source identity used when attributing errors
    fn source(&self) -> Source;
}

/// Trait for anything that can produce normalized market data for a category
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn industry_stats(&self, category: &str) -> Result<Arc<MarketAnalysis>>;
}

/// Hook for observing orchestration outcomes
///
/// All methods default to no-ops.
pub trait PlanObserver: Send + Sync {
    /// Called once per task after it settles
    fn task_settled(&self, _task: TaskKind, _succeeded: bool) {}

    /// Called when successful task results are dropped because a sibling failed
    fn results_discarded(&self, _tasks: &[TaskKind]) {}
}
