//! Strict shape checks for incoming ideas and for the AI output

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::analysis::sections::list_items;
use crate::common::errors::{PlanError, Result, Source, Violation};
use crate::common::types::{AiSections, AnalysisSections, BusinessIdea, FinancialInputs};
use crate::finance::MAX_PROJECTION_YEARS;

const IDEA_FIELDS: &[&str] = &[
    "id",
    "name",
    "industry",
    "description",
    "market",
    "revenueModel",
    "financialInputs",
];

const FINANCIAL_FIELDS: &[&str] = &[
    "initialInvestment",
    "monthlyRevenue",
    "monthlyExpenses",
    "projectionYears",
    "price",
    "units",
    "expenses",
];

/// Accumulates violations while walking a document
#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    fn reject_unknown(&mut self, obj: &Map<String, Value>, allowed: &[&str], prefix: &str) {
        for key in obj.keys() {
            if !allowed.contains(&key.as_str()) {
                self.fail(join_path(prefix, key), "is not allowed");
            }
        }
    }

    fn required_text(&mut self, obj: &Map<String, Value>, key: &str) -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.fail(key, "is required");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.fail(key, "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.fail(key, "must be a string");
                None
            }
        }
    }

    fn optional_text(&mut self, obj: &Map<String, Value>, key: &str) -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.fail(key, "must be a string");
                None
            }
        }
    }

    fn amount(&mut self, value: Option<&Value>, path: &str) -> Option<f64> {
        match value {
            None | Some(Value::Null) => {
                self.fail(path, "is required");
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() && v >= 0.0 => Some(v),
                _ => {
                    self.fail(path, "must be a non-negative number");
                    None
                }
            },
            Some(_) => {
                self.fail(path, "must be a number");
                None
            }
        }
    }

    fn horizon(&mut self, value: Option<&Value>, path: &str) -> Option<u32> {
        let range = format!("must be an integer between 1 and {}", MAX_PROJECTION_YEARS);
        match value {
            None | Some(Value::Null) => {
                self.fail(path, "is required");
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(years)
                    if years.fract() == 0.0
                        && (1.0..=f64::from(MAX_PROJECTION_YEARS)).contains(&years) =>
                {
                    Some(years as u32)
                }
                _ => {
                    self.fail(path, range);
                    None
                }
            },
            Some(_) => {
                self.fail(path, range);
                None
            }
        }
    }

    fn expenses(&mut self, value: Option<&Value>, path: &str) -> Option<BTreeMap<String, f64>> {
        let lines = match value {
            None | Some(Value::Null) => {
                self.fail(path, "is required");
                return None;
            }
            Some(Value::Object(lines)) => lines,
            Some(_) => {
                self.fail(path, "must be a flat mapping of names to numbers");
                return None;
            }
        };

        let mut expenses = BTreeMap::new();
        let mut complete = true;
        for (name, amount) in lines {
            match self.amount(Some(amount), &join_path(path, name)) {
                Some(v) => {
                    expenses.insert(name.clone(), v);
                }
                None => complete = false,
            }
        }
        complete.then_some(expenses)
    }

    fn financial_inputs(&mut self, value: Option<&Value>) -> Option<FinancialInputs> {
        const PATH: &str = "financialInputs";
        let obj = match value {
            None | Some(Value::Null) => {
                self.fail(PATH, "is required");
                return None;
            }
            Some(Value::Object(obj)) => obj,
            Some(_) => {
                self.fail(PATH, "must be an object");
                return None;
            }
        };

        self.reject_unknown(obj, FINANCIAL_FIELDS, PATH);
        let field = |key: &str| join_path(PATH, key);

        let initial_investment = self.amount(obj.get("initialInvestment"), &field("initialInvestment"));
        let monthly_revenue = self.amount(obj.get("monthlyRevenue"), &field("monthlyRevenue"));
        let monthly_expenses = self.amount(obj.get("monthlyExpenses"), &field("monthlyExpenses"));
        let projection_years = self.horizon(obj.get("projectionYears"), &field("projectionYears"));
        let price = self.amount(obj.get("price"), &field("price"));
        let units = self.amount(obj.get("units"), &field("units"));
        let expenses = self.expenses(obj.get("expenses"), &field("expenses"));

        Some(FinancialInputs {
            initial_investment: initial_investment?,
            monthly_revenue: monthly_revenue?,
            monthly_expenses: monthly_expenses?,
            projection_years: projection_years?,
            price: price?,
            units: units?,
            expenses: expenses?,
        })
    }

    fn finish<T>(self, message: &str, value: Option<T>) -> Result<T> {
        match value {
            Some(value) if self.violations.is_empty() => Ok(value),
            _ => Err(PlanError::Validation {
                message: message.to_string(),
                violations: self.violations,
            }),
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Validate a raw idea document
///
/// Walks the whole document; the error lists every violation found.
pub fn validate_idea(raw: &Value) -> Result<BusinessIdea> {
    let mut checker = Checker::default();

    let obj = match raw {
        Value::Object(obj) => obj,
        _ => {
            checker.fail("idea", "must be an object");
            return checker.finish("Invalid idea payload", None);
        }
    };

    checker.reject_unknown(obj, IDEA_FIELDS, "");

    let id = checker.required_text(obj, "id").and_then(|id| match Uuid::parse_str(&id) {
        Ok(id) => Some(id),
        Err(_) => {
            checker.fail("id", "must be a valid UUID");
            None
        }
    });
    let name = checker.required_text(obj, "name");
    let industry = checker.required_text(obj, "industry");
    let description = checker.optional_text(obj, "description");
    let market = checker.optional_text(obj, "market");
    let revenue_model = checker.optional_text(obj, "revenueModel");
    let financial_inputs = checker.financial_inputs(obj.get("financialInputs"));

    let idea = (|| {
        Some(BusinessIdea {
            id: id?,
            name: name?,
            industry: industry?,
            description,
            market,
            revenue_model,
            financial_inputs: financial_inputs?,
        })
    })();

    checker.finish("Invalid idea payload", idea)
}

/// Verify the AI output carries a summary, a SWOT list and recommendations
///
/// Accepts `executive_summary` as an alias of `summary` and any section whose
/// key starts with `swot`. Every missing piece is reported.
pub fn validate_ai_sections(sections: &AnalysisSections) -> Result<AiSections> {
    let mut violations = Vec::new();

    let summary = sections
        .get("summary")
        .or_else(|| sections.get("executive_summary"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if summary.is_none() {
        violations.push(Violation::new("summary", "is required"));
    }

    let swot = sections
        .iter()
        .find(|(key, _)| key.starts_with("swot"))
        .map(|(_, body)| list_items(body))
        .filter(|items| !items.is_empty());
    if swot.is_none() {
        violations.push(Violation::new("swot", "must be a non-empty list"));
    }

    let recommendations = sections
        .get("recommendations")
        .map(|body| list_items(body))
        .filter(|items| !items.is_empty());
    if recommendations.is_none() {
        violations.push(Violation::new("recommendations", "must be a non-empty list"));
    }

    match (summary, swot, recommendations) {
        (Some(summary), Some(swot), Some(recommendations)) => Ok(AiSections {
            summary,
            swot,
            recommendations,
        }),
        _ => Err(PlanError::Contract {
            origin: Source::Analysis,
            violations,
        }),
    }
}
