//! Cache-aside market-data pipeline with in-flight deduplication

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::normalize::normalize_industry_stats;
use crate::cache::{Claim, SingleFlight, TtlCache};
use crate::common::errors::{PlanError, Result};
use crate::common::traits::{IndustryDataProvider, MarketDataSource};
use crate::common::types::MarketAnalysis;

/// Default lifetime of a cached industry snapshot
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Namespace of every pipeline cache key
pub const KEY_PREFIX: &str = "industryStats";

/// Cache of normalized snapshots, shared by reference
pub type MarketCache = TtlCache<Arc<MarketAnalysis>>;

/// Registry of in-flight snapshot fetches
pub type MarketFlights = SingleFlight<Arc<MarketAnalysis>>;

/// Collapse a category to its stable identity
///
/// Lower-cases, then turns every run of characters that are neither letters
/// nor digits (in any script) into a single `-`, with none leading or trailing. `" Fin-Tech!! "` and `"fintech"`
/// differ, but `"Health  Tech"` and `"health/tech"` share `health-tech`.
pub fn normalize_category(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Cache key for a category, rejecting categories with no identity
pub fn cache_key(category: &str) -> Result<String> {
    let normalized = normalize_category(category);
    if normalized.is_empty() {
        return Err(PlanError::invalid_field(
            "industry",
            "must contain at least one letter or digit",
        ));
    }
    Ok(format!("{}:{}", KEY_PREFIX, normalized))
}

/// Market-data pipeline: cache check, in-flight check, fetch, normalize, populate
///
/// The cache and registry are injected so several pipelines (or tests) can
/// share or isolate them explicitly.
pub struct MarketDataPipeline {
    cache: Arc<MarketCache>,
    flights: Arc<MarketFlights>,
    companies: Arc<dyn IndustryDataProvider>,
    statistics: Arc<dyn IndustryDataProvider>,
    ttl: Duration,
}

impl MarketDataPipeline {
    /// Create a pipeline over the two providers with the default TTL
    pub fn new(
        cache: Arc<MarketCache>,
        flights: Arc<MarketFlights>,
        companies: Arc<dyn IndustryDataProvider>,
        statistics: Arc<dyn IndustryDataProvider>,
    ) -> Self {
        Self {
            cache,
            flights,
            companies,
            statistics,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Override how long normalized snapshots stay cached
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    pub fn flights(&self) -> &MarketFlights {
        &self.flights
    }

    /// Fetch normalized market data for a category
    ///
    /// Concurrent callers for the same normalized category share one outbound
    /// fetch per provider and observe the same value or error.
    #[instrument(skip(self))]
    pub async fn fetch(&self, category: &str) -> Result<Arc<MarketAnalysis>> {
        let key = cache_key(category)?;

        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(hit);
        }

        let claim = self.flights.get_or_create_guarded(
            &key,
            || self.cache.get(&key),
            || self.fetch_and_populate(key.clone(), category.to_string()),
        );

        match &claim {
            Claim::Resolved(_) => debug!(key = %key, "cache populated while waiting for registry"),
            Claim::Joined(_) => debug!(key = %key, "awaiting in-flight fetch"),
            Claim::Started(_) => info!(key = %key, "fetching industry stats"),
        }

        claim.outcome().await
    }

    /// Build the work for one registry slot; runs detached from any caller
    fn fetch_and_populate(
        &self,
        key: String,
        category: String,
    ) -> impl std::future::Future<Output = Result<Arc<MarketAnalysis>>> + Send + 'static {
        let cache = Arc::clone(&self.cache);
        let companies = Arc::clone(&self.companies);
        let statistics = Arc::clone(&self.statistics);
        let ttl = self.ttl;

        async move {
            let (company_raw, stats_raw) =
                tokio::try_join!(companies.search(&category), statistics.search(&category))?;

            let label = key
                .strip_prefix(KEY_PREFIX)
                .and_then(|rest| rest.strip_prefix(':'))
                .unwrap_or(&key)
                .to_string();
            let analysis = Arc::new(normalize_industry_stats(
                &label,
                (companies.source(), company_raw),
                (statistics.source(), stats_raw),
            )?);

            cache.set(key.clone(), Arc::clone(&analysis), ttl);
            info!(
                key = %key,
                competitors = analysis.competitor_count,
                "industry stats cached"
            );
            Ok(analysis)
        }
    }
}

#[async_trait]
impl MarketDataSource for MarketDataPipeline {
    async fn industry_stats(&self, category: &str) -> Result<Arc<MarketAnalysis>> {
        self.fetch(category).await
    }
}
