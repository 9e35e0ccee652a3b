//! Plan Aggregator Library
//!
//! Builds a composite business plan from three independently failing sources:
//! a generative analysis service, a cached and deduplicated market-data
//! pipeline over two providers, and a local financial model.

pub mod analysis;
pub mod cache;
pub mod common;
pub mod config;
pub mod fetch;
pub mod finance;
pub mod market;
pub mod plan;

// Re-export commonly used types
pub use common::errors::{PlanError, Result, Source, TaskFailure, TaskKind, Violation};
pub use common::traits::{AnalysisProvider, IndustryDataProvider, MarketDataSource, PlanObserver};
pub use common::types::{
    AiSections, AnalysisRequest, AnalysisSections, BusinessIdea, Competitor, FinancialInputs,
    MarketAnalysis, PlanDraft, Projections, Statistic, YearProjection,
};
pub use config::types::AppConfig;

// Components
pub use analysis::OpenAiAnalysisClient;
pub use cache::{Claim, SingleFlight, TtlCache};
pub use fetch::{ResilientClient, RetryPolicy};
pub use market::{MarketCache, MarketDataPipeline, MarketFlights, ProviderClient};
pub use plan::{PlanOrchestrator, TracingObserver};
