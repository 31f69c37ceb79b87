//! FIRE (financial independence) projection
//!
//! Compounds current savings and a fixed monthly contribution at a monthly
//! rate until the retirement age, then compares the result with the
//! portfolio needed to fund annual expenses at the chosen withdrawal rate.

use crate::calculators::ensure_finite;
use crate::error::FinsightError;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Oldest age accepted for either end of the projection
pub const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FireInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub monthly_contribution: f64,
    /// Expected annual return in percent (7.0 = 7%)
    pub expected_return: f64,
    pub annual_expenses: f64,
    /// Safe withdrawal rate in percent (4.0 = 4%)
    pub withdrawal_rate: f64,
}

impl Default for FireInputs {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 50,
            current_savings: 100_000.0,
            monthly_contribution: 3_000.0,
            expected_return: 7.0,
            annual_expenses: 50_000.0,
            withdrawal_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FireProjection {
    pub years_to_retirement: u32,
    pub months_to_retirement: u32,
    pub fire_number: f64,
    pub projected_savings: f64,
    /// Projected savings as a share of the FIRE number, clamped to 0..=100
    pub progress_percent: f64,
    /// Monthly income the projected savings sustain at the withdrawal rate
    pub monthly_income: f64,
}

pub fn project(inputs: &FireInputs) -> Result<FireProjection> {
    if inputs.retirement_age > MAX_AGE {
        return Err(FinsightError::InvalidInput(format!(
            "retirement age ({}) must be at most {}",
            inputs.retirement_age, MAX_AGE
        )));
    }
    if inputs.retirement_age <= inputs.current_age {
        return Err(FinsightError::InvalidInput(format!(
            "retirement age ({}) must be greater than current age ({})",
            inputs.retirement_age, inputs.current_age
        )));
    }
    ensure_finite("current_savings", inputs.current_savings)?;
    ensure_finite("monthly_contribution", inputs.monthly_contribution)?;
    ensure_finite("expected_return", inputs.expected_return)?;
    ensure_finite("annual_expenses", inputs.annual_expenses)?;
    ensure_finite("withdrawal_rate", inputs.withdrawal_rate)?;
    if inputs.withdrawal_rate <= 0.0 {
        return Err(FinsightError::InvalidInput(
            "withdrawal rate must be positive".to_string(),
        ));
    }

    // Both ages are bounded by MAX_AGE, so the month count cannot overflow
    let years = inputs.retirement_age - inputs.current_age;
    let months = years * 12;
    let monthly_return = inputs.expected_return / 100.0 / 12.0;
    if monthly_return <= -1.0 {
        return Err(FinsightError::InvalidInput(
            "expected return must be above -1200%".to_string(),
        ));
    }

    let projected_savings = future_value(
        inputs.current_savings,
        inputs.monthly_contribution,
        monthly_return,
        months,
    );
    let fire_number = inputs.annual_expenses * (100.0 / inputs.withdrawal_rate);

    Ok(FireProjection {
        years_to_retirement: years,
        months_to_retirement: months,
        fire_number,
        projected_savings,
        progress_percent: progress(projected_savings, fire_number),
        monthly_income: projected_savings * inputs.withdrawal_rate / 100.0 / 12.0,
    })
}

/// Future value of a lump sum plus an ordinary annuity of monthly deposits.
///
/// Growth is taken in log space (`ln_1p`/`exp_m1`) so rates far below
/// `f64::EPSILON` still accrue instead of rounding `1 + r` to 1.
pub fn future_value(principal: f64, monthly_deposit: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return principal + monthly_deposit * months as f64;
    }
    let growth_minus_one = (months as f64 * monthly_rate.ln_1p()).exp_m1();
    principal * (growth_minus_one + 1.0) + monthly_deposit * (growth_minus_one / monthly_rate)
}

fn progress(projected: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 100.0;
    }
    let pct = projected / target * 100.0;
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Years until savings reach `fire_number` with monthly deposits.
///
/// `expected_return` is an annual fraction (0.07 = 7%). Returns `None` when
/// the target is never reached (no positive savings).
pub fn years_to_fire(
    current_savings: f64,
    fire_number: f64,
    monthly_savings: f64,
    expected_return: f64,
) -> Option<f64> {
    if current_savings >= fire_number {
        return Some(0.0);
    }
    if monthly_savings <= 0.0 {
        return None;
    }

    let remaining = fire_number - current_savings;
    let monthly_return = expected_return / 12.0;

    if monthly_return == 0.0 {
        return Some(remaining / (monthly_savings * 12.0));
    }

    let months =
        ((remaining * monthly_return) / monthly_savings).ln_1p() / monthly_return.ln_1p();
    months.is_finite().then_some(months / 12.0)
}
