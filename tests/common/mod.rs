//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use plan_aggregator::config::{OpenAiConfig, ProviderConfig};
use plan_aggregator::{IndustryDataProvider, ResilientClient, Result, RetryPolicy, Source};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A valid business idea document
pub static SAMPLE_IDEA: Lazy<Value> = Lazy::new(|| {
    json!({
        "id": "9a7d4c1e-2b3f-4e5a-8c6d-7e8f9a0b1c2d",
        "name": "LedgerLeaf",
        "industry": "FinTech",
        "description": "Bookkeeping autopilot for independent shops",
        "market": "small businesses",
        "revenueModel": "subscription",
        "financialInputs": {
            "initialInvestment": 12000,
            "monthlyRevenue": 3000,
            "monthlyExpenses": 1000,
            "projectionYears": 2,
            "price": 10,
            "units": 5,
            "expenses": {"rent": 20, "supplies": 5}
        }
    })
});

/// Company-database search payload
pub static COMPANY_PAYLOAD: Lazy<Value> = Lazy::new(|| {
    json!({
        "entities": [
            {
                "properties": {
                    "identifier": {"value": "Brex"},
                    "short_description": "Corporate cards and spend management",
                    "funding_total": {"value_usd": 1500000000.0},
                    "num_employees_enum": "c_01001_5000"
                }
            },
            {
                "properties": {
                    "identifier": {"value": "Pilot"},
                    "short_description": "Bookkeeping for startups",
                    "funding_total": {"value_usd": 160000000.0}
                }
            }
        ]
    })
});

/// Statistics-portal search payload
pub static STATISTICS_PAYLOAD: Lazy<Value> = Lazy::new(|| {
    json!({
        "items": [
            {"title": "Global fintech revenue", "value": 245.0, "unit": "billion USD", "year": 2023}
        ],
        "marketSize": 245000000000.0,
        "cagr": 16.5
    })
});

/// Analysis text with every section the plan requires
pub const ANALYSIS_TEXT: &str = "Intro paragraph.\n\
### Summary\n\
LedgerLeaf automates bookkeeping for independent shops.\n\
### SWOT\n\
- Strength: low price point\n\
- Weakness: small team\n\
- Opportunity: underserved segment\n\
- Threat: bundled incumbents\n\
### Recommendations\n\
1. Launch with a free tier\n\
2. Partner with local accountants\n";

/// Chat-completions response wrapping `content`
pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

/// Retry policy with millisecond delays and no jitter
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        jitter: false,
        ..RetryPolicy::default()
    }
}

/// Client using [`fast_policy`] and a short timeout
pub fn fast_client() -> ResilientClient {
    ResilientClient::with_policy(Duration::from_millis(2000), fast_policy())
        .expect("Failed to create client")
}

pub fn provider_config(base: &str, path: &str, key: &str) -> ProviderConfig {
    ProviderConfig {
        url: format!("{}{}", base, path),
        api_key: Some(key.to_string()),
    }
}

pub fn openai_config(base: &str) -> OpenAiConfig {
    OpenAiConfig {
        api_url: format!("{}/v1", base),
        api_key: Some("sk-test".to_string()),
        ..OpenAiConfig::default()
    }
}

/// In-process provider that counts searches and answers with a fixed payload
pub struct CountingProvider {
    name: &'static str,
    payload: Value,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn new(name: &'static str, payload: Value) -> Self {
        Self {
            name,
            payload,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndustryDataProvider for CountingProvider {
    async fn search(&self, _category: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }

    fn source(&self) -> Source {
        Source::provider(self.name)
    }
}
