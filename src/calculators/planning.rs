//! Planning helpers: ratios, health score, loan payments and debt payoff order
//!
//! Rates here are fractions (0.07 = 7%) unless a name says `percent`.

use crate::calculators::ensure_finite;
use crate::error::FinsightError;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EMERGENCY_MONTHS: f64 = 6.0;

pub fn net_worth(assets: f64, debts: f64) -> f64 {
    assets - debts
}

/// Portfolio needed to fund `annual_expenses` at `withdrawal_rate`
pub fn fire_number(annual_expenses: f64, withdrawal_rate: f64) -> Result<f64> {
    if withdrawal_rate <= 0.0 || !withdrawal_rate.is_finite() {
        return Err(FinsightError::InvalidInput(
            "withdrawal rate must be positive".to_string(),
        ));
    }
    Ok(annual_expenses / withdrawal_rate)
}

pub fn emergency_fund_target(monthly_expenses: f64, months: f64) -> f64 {
    monthly_expenses * months
}

/// Total debt over annual income, in percent; 0 without income
pub fn debt_to_income_ratio(total_debt: f64, monthly_income: f64) -> f64 {
    if monthly_income == 0.0 {
        return 0.0;
    }
    total_debt / (monthly_income * 12.0) * 100.0
}

/// Share of income left after expenses, in percent; 0 without income
pub fn savings_rate(monthly_income: f64, monthly_expenses: f64) -> f64 {
    if monthly_income == 0.0 {
        return 0.0;
    }
    (monthly_income - monthly_expenses) / monthly_income * 100.0
}

// ================= Health Score =================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthProfile {
    pub net_worth: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub total_debt: f64,
    pub emergency_fund: f64,
}

/// Financial health score in 0..=100.
///
/// Four components worth 25 points each:
/// - net worth relative to annual income (5 points per year of income)
/// - emergency fund coverage (6 months = full marks)
/// - debt-to-income (0% = 25, 50% or more = 0)
/// - savings rate (25% or more = full marks, negative rates subtract)
pub fn health_score(profile: &HealthProfile) -> u8 {
    let mut score = 0.0;

    if profile.net_worth > 0.0 {
        let annual_income = profile.monthly_income * 12.0;
        score += if annual_income > 0.0 {
            (profile.net_worth / annual_income * 5.0).min(25.0)
        } else {
            25.0
        };
    }

    score += if profile.monthly_expenses > 0.0 {
        (profile.emergency_fund / profile.monthly_expenses * 4.17).min(25.0)
    } else {
        25.0
    };

    let dti = debt_to_income_ratio(profile.total_debt, profile.monthly_income);
    score += (25.0 - dti / 2.0).max(0.0);

    score += savings_rate(profile.monthly_income, profile.monthly_expenses).min(25.0);

    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u8
}

// ================= Loans =================

/// Amortized monthly payment; straight-line when the rate is 0
pub fn loan_payment(principal: f64, annual_rate: f64, term_years: f64) -> Result<f64> {
    ensure_finite("principal", principal)?;
    ensure_finite("annual_rate", annual_rate)?;
    ensure_finite("term_years", term_years)?;
    if term_years <= 0.0 {
        return Err(FinsightError::InvalidInput(
            "loan term must be positive".to_string(),
        ));
    }

    let monthly_rate = annual_rate / 12.0;
    let payments = term_years * 12.0;

    if monthly_rate == 0.0 {
        return Ok(principal / payments);
    }
    if monthly_rate <= -1.0 {
        return Err(FinsightError::InvalidInput(
            "interest rate must be above -1200%".to_string(),
        ));
    }

    let growth_minus_one = (payments * monthly_rate.ln_1p()).exp_m1();
    if growth_minus_one.is_infinite() {
        // Interest alone; the principal share vanishes
        return Ok(principal * monthly_rate);
    }
    Ok(principal * monthly_rate * (growth_minus_one + 1.0) / growth_minus_one)
}

// ================= Debt Payoff =================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    pub id: String,
    pub balance: f64,
    /// Annual rate, as a fraction
    pub interest_rate: f64,
    #[serde(default)]
    pub minimum_payment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrioritizedDebt {
    #[serde(flatten)]
    pub debt: Debt,
    /// Payoff order, starting at 1
    pub priority: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStrategy {
    /// Highest interest rate first
    #[default]
    Avalanche,
    /// Smallest balance first
    Snowball,
}

fn prioritize(mut debts: Vec<Debt>, strategy: PayoffStrategy) -> Vec<PrioritizedDebt> {
    // sort_by is stable: ties keep their input order
    match strategy {
        PayoffStrategy::Avalanche => {
            debts.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate))
        }
        PayoffStrategy::Snowball => debts.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
    }

    debts
        .into_iter()
        .zip(1..)
        .map(|(debt, priority)| PrioritizedDebt { debt, priority })
        .collect()
}

pub fn debt_avalanche(debts: Vec<Debt>) -> Vec<PrioritizedDebt> {
    prioritize(debts, PayoffStrategy::Avalanche)
}

pub fn debt_snowball(debts: Vec<Debt>) -> Vec<PrioritizedDebt> {
    prioritize(debts, PayoffStrategy::Snowball)
}

pub fn debt_plan(debts: Vec<Debt>, strategy: PayoffStrategy) -> Vec<PrioritizedDebt> {
    prioritize(debts, strategy)
}
