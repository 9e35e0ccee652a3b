//! REST clients for the two market-data providers

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::common::errors::{PlanError, Result, Source};
use crate::common::traits::IndustryDataProvider;
use crate::config::types::ProviderConfig;
use crate::fetch::ResilientClient;

/// Provider name used for the company-database source
pub const CRUNCHBASE: &str = "crunchbase";
/// Provider name used for the statistics-portal source
pub const STATISTA: &str = "statista";

/// How a provider expects its API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyPlacement {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// A named header carrying the raw key
    Header(&'static str),
}

/// Keyword-search client for one market-data provider
#[derive(Debug, Clone)]
pub struct ProviderClient {
    /// Provider name, used for error attribution
    name: &'static str,
    /// Search endpoint
    url: Url,
    /// API key, if the provider requires one
    api_key: Option<String>,
    key_placement: KeyPlacement,
    /// Name of the query-string parameter carrying the keyword
    query_param: &'static str,
    http: ResilientClient,
}

impl ProviderClient {
    /// Company-database client (`?query=`, bearer auth)
    pub fn crunchbase(config: &ProviderConfig, http: ResilientClient) -> Result<Self> {
        Self::build(CRUNCHBASE, config, http, KeyPlacement::Bearer, "query")
    }

    /// Statistics-portal client (`?search=`, `x-api-key` header)
    pub fn statista(config: &ProviderConfig, http: ResilientClient) -> Result<Self> {
        Self::build(STATISTA, config, http, KeyPlacement::Header("x-api-key"), "search")
    }

    fn build(
        name: &'static str,
        config: &ProviderConfig,
        http: ResilientClient,
        key_placement: KeyPlacement,
        query_param: &'static str,
    ) -> Result<Self> {
        let url = Url::parse(&config.url).map_err(|e| {
            PlanError::Configuration(format!("invalid {} url '{}': {}", name, config.url, e))
        })?;

        Ok(Self {
            name,
            url,
            api_key: config.api_key.clone(),
            key_placement,
            query_param,
            http,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl IndustryDataProvider for ProviderClient {
    #[instrument(skip(self), fields(provider = self.name))]
    async fn search(&self, category: &str) -> Result<Value> {
        debug!("Searching {} for: {}", self.name, category);

        self.http
            .send_json(&self.source(), |client| {
                let request = client
                    .get(self.url.clone())
                    .query(&[(self.query_param, category)]);
                match (&self.api_key, self.key_placement) {
                    (Some(key), KeyPlacement::Bearer) => request.bearer_auth(key),
                    (Some(key), KeyPlacement::Header(header)) => request.header(header, key),
                    (None, _) => request,
                }
            })
            .await
    }

    fn source(&self) -> Source {
        Source::provider(self.name)
    }
}
