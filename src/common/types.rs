//! Domain types shared across the pipeline, engine and orchestrator

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Business inputs consumed by the financial engine
///
/// The engine re-validates every field before any arithmetic runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInputs {
    pub initial_investment: f64,
    pub monthly_revenue: f64,
    pub monthly_expenses: f64,
    /// Projection horizon in years, 1 to 10
    pub projection_years: u32,
    /// Unit price
    pub price: f64,
    /// Units sold in the period
    pub units: f64,
    /// Named expense lines for the period
    #[serde(default)]
    pub expenses: BTreeMap<String, f64>,
}

impl FinancialInputs {
    /// Inputs for a one-year, single-period model with no monthly figures
    pub fn single_period(price: f64, units: f64, expenses: BTreeMap<String, f64>) -> Self {
        Self {
            initial_investment: 0.0,
            monthly_revenue: 0.0,
            monthly_expenses: 0.0,
            projection_years: 1,
            price,
            units,
            expenses,
        }
    }
}

/// A validated business idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdea {
    pub id: Uuid,
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub revenue_model: Option<String>,
    pub financial_inputs: FinancialInputs,
}

impl BusinessIdea {
    /// Build the request handed to the analysis collaborator
    pub fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            industry: self.industry.clone(),
            market: self
                .market
                .clone()
                .or_else(|| self.description.clone().filter(|d| !d.is_empty()))
                .unwrap_or_else(|| "general".to_string()),
            revenue_model: self
                .revenue_model
                .clone()
                .unwrap_or_else(|| "unspecified".to_string()),
        }
    }
}

/// Input to the generative analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub industry: String,
    pub market: String,
    pub revenue_model: String,
}

/// One projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub year: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net: Decimal,
    /// Cash position at year end, starting from `-initialInvestment`
    #[serde(with = "rust_decimal::serde::float")]
    pub cumulative_cash: Decimal,
}

/// Output of the financial engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projections {
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash_flow: Decimal,
    #[serde(default)]
    pub schedule: Vec<YearProjection>,
    /// First month where cumulative cash is non-negative, if within the horizon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_even_month: Option<u32>,
}

/// A competitor as reported by a company-database provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub funding_usd: Option<f64>,
    #[serde(default)]
    pub employees: Option<String>,
}

/// A statistic as reported by a statistics provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    pub title: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Canonical market-data shape, merged from every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    /// Normalized category the data was fetched for
    pub category: String,
    pub competitors: Vec<Competitor>,
    pub competitor_count: usize,
    pub total_funding_usd: f64,
    #[serde(default)]
    pub market_size_usd: Option<f64>,
    #[serde(default)]
    pub growth_rate_pct: Option<f64>,
    pub statistics: Vec<Statistic>,
    /// Provider names that contributed
    pub sources: Vec<String>,
    pub retrieved_at: DateTime<Utc>,
}

/// Section name to section body, as parsed from the analysis text
pub type AnalysisSections = BTreeMap<String, String>;

/// AI output after its sub-shape has been verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSections {
    pub summary: String,
    pub swot: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The composite plan handed to document/export generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub executive_summary: String,
    pub market_analysis: MarketAnalysis,
    pub swot: Vec<String>,
    pub projections: Projections,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_idea() -> BusinessIdea {
        BusinessIdea {
            id: Uuid::nil(),
            name: "Sprout".to_string(),
            industry: "AgTech".to_string(),
            description: Some("Indoor farming kits".to_string()),
            market: None,
            revenue_model: None,
            financial_inputs: FinancialInputs {
                initial_investment: 1000.0,
                monthly_revenue: 100.0,
                monthly_expenses: 50.0,
                projection_years: 1,
                price: 10.0,
                units: 5.0,
                expenses: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn test_analysis_request_falls_back_to_description() {
        let request = sample_idea().analysis_request();
        assert_eq!(request.industry, "AgTech");
        assert_eq!(request.market, "Indoor farming kits");
        assert_eq!(request.revenue_model, "unspecified");
    }

    #[test]
    fn test_projections_serialize_as_numbers() {
        let projections = Projections {
            revenue: dec!(50),
            expenses: dec!(25),
            cash_flow: dec!(25),
            schedule: Vec::new(),
            break_even_month: None,
        };
        let json = serde_json::to_value(&projections).unwrap();
        assert_eq!(json["revenue"], serde_json::json!(50.0));
        assert_eq!(json["cashFlow"], serde_json::json!(25.0));
        assert!(json.get("breakEvenMonth").is_none());
    }
}
