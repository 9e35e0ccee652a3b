//! Reconciles provider-specific payloads into one [`MarketAnalysis`]

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::common::errors::{PlanError, Result, Source, Violation};
use crate::common::types::{Competitor, MarketAnalysis, Statistic};

// ============================================================================
// Company-database payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct CompanySearchPayload {
    #[serde(default)]
    entities: Vec<CompanyEntity>,
}

#[derive(Debug, Deserialize)]
struct CompanyEntity {
    #[serde(default)]
    properties: CompanyProperties,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyProperties {
    #[serde(default)]
    identifier: Option<Identifier>,
    #[serde(default)]
    short_description: Option<String>,
    #[serde(default)]
    funding_total: Option<Money>,
    #[serde(default)]
    num_employees_enum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Identifier {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Money {
    #[serde(default)]
    value_usd: Option<f64>,
}

// ============================================================================
// Statistics-portal payload
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsPayload {
    #[serde(default)]
    items: Vec<StatisticItem>,
    #[serde(default)]
    market_size: Option<f64>,
    #[serde(default)]
    cagr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StatisticItem {
    title: String,
    value: f64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    year: Option<i32>,
}

fn decode<T: DeserializeOwned>(origin: &Source, raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|e| PlanError::Contract {
        origin: origin.clone(),
        violations: vec![Violation::new("payload", e.to_string())],
    })
}

/// Merge a company-search payload and a statistics payload
///
/// Entities without a name are dropped. Competitors are ordered by funding,
/// largest first, then by name, so equal inputs always normalize identically.
pub fn normalize_industry_stats(
    category: &str,
    companies: (Source, Value),
    statistics: (Source, Value),
) -> Result<MarketAnalysis> {
    let (company_source, company_raw) = companies;
    let (stats_source, stats_raw) = statistics;

    let company_payload: CompanySearchPayload = decode(&company_source, company_raw)?;
    let stats_payload: StatisticsPayload = decode(&stats_source, stats_raw)?;

    let mut competitors: Vec<Competitor> = company_payload
        .entities
        .into_iter()
        .filter_map(|entity| {
            let props = entity.properties;
            let name = props.identifier?.value.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(Competitor {
                name,
                description: props.short_description.filter(|d| !d.trim().is_empty()),
                funding_usd: props.funding_total.and_then(|m| m.value_usd),
                employees: props.num_employees_enum,
            })
        })
        .collect();

    competitors.sort_by(|a, b| {
        let fa = a.funding_usd.unwrap_or(0.0);
        let fb = b.funding_usd.unwrap_or(0.0);
        fb.partial_cmp(&fa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let total_funding_usd = competitors.iter().filter_map(|c| c.funding_usd).sum();

    let statistics = stats_payload
        .items
        .into_iter()
        .map(|item| Statistic {
            title: item.title,
            value: item.value,
            unit: item.unit,
            year: item.year,
        })
        .collect();

    Ok(MarketAnalysis {
        category: category.to_string(),
        competitor_count: competitors.len(),
        competitors,
        total_funding_usd,
        market_size_usd: stats_payload.market_size,
        growth_rate_pct: stats_payload.cagr,
        statistics,
        sources: vec![source_name(&company_source), source_name(&stats_source)],
        retrieved_at: Utc::now(),
    })
}

fn source_name(source: &Source) -> String {
    match source {
        Source::Provider(name) => name.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn companies() -> (Source, Value) {
        (
            Source::provider("crunchbase"),
            json!({
                "entities": [
                    {"properties": {"identifier": {"value": "Beta"}, "funding_total": {"value_usd": 5.0e6}}},
                    {"properties": {"identifier": {"value": "Alpha"}, "funding_total": {"value_usd": 5.0e6},
                                    "short_description": "Robo-advice", "num_employees_enum": "c_00011_00050"}},
                    {"properties": {"identifier": {"value": "Gamma"}, "funding_total": {"value_usd": 2.0e7}}},
                    {"properties": {"short_description": "nameless"}}
                ]
            }),
        )
    }

    fn statistics() -> (Source, Value) {
        (
            Source::provider("statista"),
            json!({
                "items": [{"title": "Revenue", "value": 1.2e9, "unit": "USD", "year": 2024}],
                "marketSize": 1.2e9,
                "cagr": 8.5
            }),
        )
    }

    #[test]
    fn test_merges_both_payloads() {
        let analysis = normalize_industry_stats("fintech", companies(), statistics()).unwrap();

        assert_eq!(analysis.category, "fintech");
        assert_eq!(analysis.competitor_count, 3);
        let names: Vec<_> = analysis.competitors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
        assert_eq!(analysis.total_funding_usd, 3.0e7);
        assert_eq!(analysis.market_size_usd, Some(1.2e9));
        assert_eq!(analysis.growth_rate_pct, Some(8.5));
        assert_eq!(analysis.statistics.len(), 1);
        assert_eq!(analysis.sources, vec!["crunchbase", "statista"]);
    }

    #[test]
    fn test_empty_payloads_normalize_to_empty_analysis() {
        let analysis = normalize_industry_stats(
            "niche",
            (Source::provider("crunchbase"), json!({})),
            (Source::provider("statista"), json!({})),
        )
        .unwrap();

        assert!(analysis.competitors.is_empty());
        assert_eq!(analysis.total_funding_usd, 0.0);
        assert_eq!(analysis.market_size_usd, None);
    }

    #[test]
    fn test_malformed_payload_is_contract_failure() {
        let err = normalize_industry_stats(
            "fintech",
            companies(),
            (Source::provider("statista"), json!({"items": [{"title": "no value"}]})),
        )
        .unwrap_err();

        match err {
            PlanError::Contract { origin, violations } => {
                assert_eq!(origin, Source::provider("statista"));
                assert_eq!(violations.len(), 1);
            }
            other => panic!("expected contract failure, got {:?}", other),
        }
    }
}
