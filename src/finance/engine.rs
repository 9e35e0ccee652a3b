use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::common::errors::{PlanError, Result, Violation};
use crate::common::types::{FinancialInputs, Projections, YearProjection};

/// Longest supported projection horizon
pub const MAX_PROJECTION_YEARS: u32 = 10;

const MONTHS_PER_YEAR: u32 = 12;

/// Inputs after validation, converted to exact decimals
struct CheckedInputs {
    initial_investment: Decimal,
    monthly_revenue: Decimal,
    monthly_expenses: Decimal,
    projection_years: u32,
    price: Decimal,
    units: Decimal,
    expenses: BTreeMap<String, Decimal>,
}

fn checked_amount(value: f64, field: &str, violations: &mut Vec<Violation>) -> Decimal {
    if !value.is_finite() {
        violations.push(Violation::new(field, "must be a finite number"));
        return Decimal::ZERO;
    }
    if value < 0.0 {
        violations.push(Violation::new(field, "must be a non-negative number"));
        return Decimal::ZERO;
    }
    match Decimal::try_from(value) {
        Ok(amount) => amount,
        Err(_) => {
            violations.push(Violation::new(field, "is out of range"));
            Decimal::ZERO
        }
    }
}

/// Validate every field, reporting all violations at once
fn check(inputs: &FinancialInputs) -> Result<CheckedInputs> {
    let mut violations = Vec::new();

    let initial_investment =
        checked_amount(inputs.initial_investment, "initialInvestment", &mut violations);
    let monthly_revenue = checked_amount(inputs.monthly_revenue, "monthlyRevenue", &mut violations);
    let monthly_expenses =
        checked_amount(inputs.monthly_expenses, "monthlyExpenses", &mut violations);

    if !(1..=MAX_PROJECTION_YEARS).contains(&inputs.projection_years) {
        violations.push(Violation::new(
            "projectionYears",
            format!("must be between 1 and {}", MAX_PROJECTION_YEARS),
        ));
    }

    let price = checked_amount(inputs.price, "price", &mut violations);
    let units = checked_amount(inputs.units, "units", &mut violations);

    let expenses = inputs
        .expenses
        .iter()
        .map(|(name, value)| {
            let field = format!("expenses.{}", name);
            (name.clone(), checked_amount(*value, &field, &mut violations))
        })
        .collect();

    if !violations.is_empty() {
        return Err(PlanError::Validation {
            message: "Invalid financial inputs".to_string(),
            violations,
        });
    }

    Ok(CheckedInputs {
        initial_investment,
        monthly_revenue,
        monthly_expenses,
        projection_years: inputs.projection_years,
        price,
        units,
        expenses,
    })
}

fn overflow(what: &str) -> PlanError {
    PlanError::invalid_field(what, "overflows the supported numeric range")
}

/// Run the financial model
///
/// `revenue = price × units`, `expenses = Σ expenses`, `cashFlow = revenue − expenses`,
/// plus a yearly schedule from the monthly figures. Pure and deterministic.
pub fn compute(inputs: &FinancialInputs) -> Result<Projections> {
    let checked = check(inputs)?;

    let revenue = checked
        .price
        .checked_mul(checked.units)
        .ok_or_else(|| overflow("revenue"))?;
    let expenses = checked
        .expenses
        .values()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| overflow("expenses"))?;
    let cash_flow = revenue - expenses;

    let schedule = build_schedule(&checked)?;
    let break_even_month = break_even_month(&checked);

    Ok(Projections {
        revenue,
        expenses,
        cash_flow,
        schedule,
        break_even_month,
    })
}

fn build_schedule(checked: &CheckedInputs) -> Result<Vec<YearProjection>> {
    let months = Decimal::from(MONTHS_PER_YEAR);
    let revenue = checked
        .monthly_revenue
        .checked_mul(months)
        .ok_or_else(|| overflow("monthlyRevenue"))?;
    let expenses = checked
        .monthly_expenses
        .checked_mul(months)
        .ok_or_else(|| overflow("monthlyExpenses"))?;
    let net = revenue - expenses;

    let mut cumulative_cash = -checked.initial_investment;
    let mut schedule = Vec::with_capacity(checked.projection_years as usize);
    for year in 1..=checked.projection_years {
        cumulative_cash = cumulative_cash
            .checked_add(net)
            .ok_or_else(|| overflow("cumulativeCash"))?;
        schedule.push(YearProjection {
            year,
            revenue,
            expenses,
            net,
            cumulative_cash,
        });
    }
    Ok(schedule)
}

fn break_even_month(checked: &CheckedInputs) -> Option<u32> {
    let monthly_net = checked.monthly_revenue - checked.monthly_expenses;
    let horizon = checked.projection_years * MONTHS_PER_YEAR;

    let mut cash = -checked.initial_investment;
    for month in 1..=horizon {
        cash = cash.checked_add(monthly_net)?;
        if cash >= Decimal::ZERO {
            return Some(month);
        }
    }
    None
}
