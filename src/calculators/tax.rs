//! Progressive income tax estimator
//!
//! Simplified: one federal bracket table, pre-tax contributions and a
//! single deduction, flat credits, and a flat state rate.

use crate::calculators::ensure_finite;
use crate::error::FinsightError;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATE_RATE: f64 = 0.05;

/// One marginal bracket; `max == None` means unbounded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TaxBracket {
    pub min: f64,
    pub max: Option<f64>,
    /// Fractional rate (0.22 = 22%)
    pub rate: f64,
}

impl TaxBracket {
    fn width(&self) -> f64 {
        self.max.map_or(f64::INFINITY, |max| max - self.min)
    }

    fn contains(&self, amount: f64) -> bool {
        amount >= self.min && self.max.map_or(true, |max| amount <= max)
    }
}

const FEDERAL_2024_SINGLE: [TaxBracket; 7] = [
    TaxBracket { min: 0.0, max: Some(11_000.0), rate: 0.10 },
    TaxBracket { min: 11_000.0, max: Some(44_725.0), rate: 0.12 },
    TaxBracket { min: 44_725.0, max: Some(95_375.0), rate: 0.22 },
    TaxBracket { min: 95_375.0, max: Some(182_050.0), rate: 0.24 },
    TaxBracket { min: 182_050.0, max: Some(231_250.0), rate: 0.32 },
    TaxBracket { min: 231_250.0, max: Some(578_125.0), rate: 0.35 },
    TaxBracket { min: 578_125.0, max: None, rate: 0.37 },
];

/// Ascending, contiguous bracket table plus a flat state rate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxTable {
    brackets: Vec<TaxBracket>,
    state_rate: f64,
}

impl TaxTable {
    pub fn new(brackets: Vec<TaxBracket>, state_rate: f64) -> Result<Self> {
        validate_brackets(&brackets)?;
        if !(0.0..=1.0).contains(&state_rate) {
            return Err(FinsightError::InvalidInput(format!(
                "state rate must be within 0..=1, got {}",
                state_rate
            )));
        }
        Ok(Self {
            brackets,
            state_rate,
        })
    }

    /// 2024 federal single-filer brackets with a 5% state approximation
    pub fn federal_2024() -> Self {
        Self {
            brackets: FEDERAL_2024_SINGLE.to_vec(),
            state_rate: DEFAULT_STATE_RATE,
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn state_rate(&self) -> f64 {
        self.state_rate
    }

    /// Tax owed on `taxable` by walking brackets in ascending order
    pub fn bracket_tax(&self, taxable: f64) -> f64 {
        let mut tax = 0.0;
        let mut remaining = taxable;

        for bracket in &self.brackets {
            if remaining <= 0.0 {
                break;
            }
            let in_bracket = remaining.min(bracket.width());
            tax += in_bracket * bracket.rate;
            remaining -= in_bracket;
        }

        tax
    }

    /// Rate of the first bracket containing `taxable`, in percent
    pub fn marginal_rate(&self, taxable: f64) -> f64 {
        self.brackets
            .iter()
            .find(|b| b.contains(taxable))
            .map_or(0.0, |b| b.rate * 100.0)
    }
}

impl Default for TaxTable {
    fn default() -> Self {
        Self::federal_2024()
    }
}

fn validate_brackets(brackets: &[TaxBracket]) -> Result<()> {
    let invalid = |msg: String| Err(FinsightError::InvalidInput(msg));

    let Some(first) = brackets.first() else {
        return invalid("bracket table is empty".to_string());
    };
    if first.min != 0.0 {
        return invalid("first bracket must start at 0".to_string());
    }

    for (i, bracket) in brackets.iter().enumerate() {
        if !(0.0..=1.0).contains(&bracket.rate) {
            return invalid(format!("bracket {} has rate outside 0..=1", i));
        }
        match bracket.max {
            Some(max) if max <= bracket.min => {
                return invalid(format!("bracket {} has max <= min", i));
            }
            None if i + 1 != brackets.len() => {
                return invalid(format!("only the last bracket may be unbounded (bracket {})", i));
            }
            _ => {}
        }
        if let Some(next) = brackets.get(i + 1) {
            if bracket.max != Some(next.min) {
                return invalid(format!("brackets {} and {} are not contiguous", i, i + 1));
            }
        }
    }

    if brackets.last().is_some_and(|last| last.max.is_some()) {
        return invalid("last bracket must be unbounded".to_string());
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxInputs {
    pub income: f64,
    /// Standard or itemized deduction
    pub deductions: f64,
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub retirement_401k: f64,
    #[serde(default)]
    pub ira_contribution: f64,
    #[serde(default)]
    pub hsa_contribution: f64,
}

impl Default for TaxInputs {
    fn default() -> Self {
        Self {
            income: 85_000.0,
            deductions: 12_950.0,
            credits: 0.0,
            retirement_401k: 6_000.0,
            ira_contribution: 6_000.0,
            hsa_contribution: 3_650.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxEstimate {
    pub adjusted_income: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub total_tax: f64,
    /// Total tax over gross income, in percent; 0 for zero income
    pub effective_rate: f64,
    /// Rate of the bracket holding the last taxable dollar, in percent
    pub marginal_rate: f64,
    pub after_tax_income: f64,
}

pub fn estimate(inputs: &TaxInputs, table: &TaxTable) -> Result<TaxEstimate> {
    ensure_finite("income", inputs.income)?;
    ensure_finite("deductions", inputs.deductions)?;
    ensure_finite("credits", inputs.credits)?;
    ensure_finite("retirement_401k", inputs.retirement_401k)?;
    ensure_finite("ira_contribution", inputs.ira_contribution)?;
    ensure_finite("hsa_contribution", inputs.hsa_contribution)?;

    let adjusted_income = (inputs.income
        - inputs.retirement_401k
        - inputs.ira_contribution
        - inputs.hsa_contribution)
        .max(0.0);
    let taxable_income = (adjusted_income - inputs.deductions).max(0.0);

    let federal_tax = (table.bracket_tax(taxable_income) - inputs.credits).max(0.0);
    let state_tax = taxable_income * table.state_rate();
    let total_tax = federal_tax + state_tax;

    let effective_rate = if inputs.income > 0.0 {
        total_tax / inputs.income * 100.0
    } else {
        0.0
    };

    Ok(TaxEstimate {
        adjusted_income,
        taxable_income,
        federal_tax,
        state_tax,
        total_tax,
        effective_rate,
        marginal_rate: table.marginal_rate(taxable_income),
        after_tax_income: inputs.income - total_tax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_default_scenario() {
        let est = estimate(&TaxInputs::default(), &TaxTable::default()).unwrap();

        assert_eq!(est.adjusted_income, 69_350.0);
        assert_eq!(est.taxable_income, 56_400.0);
        // 1100 + 4047 + 11675 * 0.22
        assert!(approx(est.federal_tax, 7_715.5));
        assert!(approx(est.state_tax, 2_820.0));
        assert!(approx(est.total_tax, 10_535.5));
        assert_eq!(est.marginal_rate, 22.0);
        assert!(approx(est.effective_rate, 10_535.5 / 85_000.0 * 100.0));
        assert!(approx(est.after_tax_income, 85_000.0 - 10_535.5));
    }

    #[test]
    fn test_zero_income_has_no_tax_and_no_division() {
        let inputs = TaxInputs {
            income: 0.0,
            ..TaxInputs::default()
        };
        let est = estimate(&inputs, &TaxTable::default()).unwrap();

        assert_eq!(est.taxable_income, 0.0);
        assert_eq!(est.total_tax, 0.0);
        assert_eq!(est.effective_rate, 0.0);
        assert_eq!(est.marginal_rate, 10.0);
    }

    #[test]
    fn test_credits_floor_at_zero() {
        let inputs = TaxInputs {
            income: 20_000.0,
            deductions: 0.0,
            credits: 50_000.0,
            retirement_401k: 0.0,
            ira_contribution: 0.0,
            hsa_contribution: 0.0,
        };
        let est = estimate(&inputs, &TaxTable::default()).unwrap();

        assert_eq!(est.federal_tax, 0.0);
        assert!(approx(est.state_tax, 1_000.0));
    }

    #[test]
    fn test_top_bracket_is_unbounded() {
        let table = TaxTable::default();
        assert_eq!(table.marginal_rate(1_000_000.0), 37.0);

        let below = table.bracket_tax(578_125.0);
        let above = table.bracket_tax(678_125.0);
        assert!(approx(above - below, 37_000.0));
    }

    #[test]
    fn test_boundary_uses_lower_bracket() {
        assert_eq!(TaxTable::default().marginal_rate(11_000.0), 10.0);
    }

    #[test]
    fn test_custom_table_validation() {
        let ok = TaxTable::new(
            vec![
                TaxBracket { min: 0.0, max: Some(10_000.0), rate: 0.0 },
                TaxBracket { min: 10_000.0, max: None, rate: 0.2 },
            ],
            0.0,
        )
        .unwrap();
        assert!(approx(ok.bracket_tax(15_000.0), 1_000.0));

        let gap = TaxTable::new(
            vec![
                TaxBracket { min: 0.0, max: Some(10_000.0), rate: 0.1 },
                TaxBracket { min: 12_000.0, max: None, rate: 0.2 },
            ],
            0.05,
        );
        assert!(gap.is_err());

        let open_middle = TaxTable::new(
            vec![
                TaxBracket { min: 0.0, max: None, rate: 0.1 },
                TaxBracket { min: 10_000.0, max: None, rate: 0.2 },
            ],
            0.05,
        );
        assert!(open_middle.is_err());

        let capped = TaxTable::new(
            vec![
                TaxBracket { min: 0.0, max: Some(10_000.0), rate: 0.1 },
                TaxBracket { min: 10_000.0, max: Some(20_000.0), rate: 0.2 },
            ],
            0.05,
        );
        assert!(
            matches!(&capped, Err(FinsightError::InvalidInput(msg)) if msg.contains("unbounded")),
            "{:?}",
            capped
        );

        assert!(TaxTable::new(vec![], 0.05).is_err());
        assert!(TaxTable::new(FEDERAL_2024_SINGLE.to_vec(), 1.5).is_err());
    }
}
