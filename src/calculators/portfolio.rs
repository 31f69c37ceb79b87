//! Portfolio return/risk blend over four fixed asset classes

use crate::error::FinsightError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

// ================= Asset Classes =================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Stocks,
    Bonds,
    Crypto,
    Reits,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Stocks,
        AssetClass::Bonds,
        AssetClass::Crypto,
        AssetClass::Reits,
    ];

    /// Long-run expected annual return, as a fraction
    pub fn expected_return(self) -> f64 {
        match self {
            AssetClass::Stocks => 0.10,
            AssetClass::Bonds => 0.04,
            AssetClass::Crypto => 0.15,
            AssetClass::Reits => 0.08,
        }
    }

    /// Volatility factor, as a fraction
    pub fn risk(self) -> f64 {
        match self {
            AssetClass::Stocks => 0.18,
            AssetClass::Bonds => 0.05,
            AssetClass::Crypto => 0.45,
            AssetClass::Reits => 0.12,
        }
    }

    fn index(self) -> usize {
        match self {
            AssetClass::Stocks => 0,
            AssetClass::Bonds => 1,
            AssetClass::Crypto => 2,
            AssetClass::Reits => 3,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetClass::Stocks => write!(f, "Stocks"),
            AssetClass::Bonds => write!(f, "Bonds"),
            AssetClass::Crypto => write!(f, "Crypto"),
            AssetClass::Reits => write!(f, "REITs"),
        }
    }
}

// ================= Grade =================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum PortfolioGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
}

impl fmt::Display for PortfolioGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioGrade::APlus => write!(f, "A+"),
            PortfolioGrade::A => write!(f, "A"),
            PortfolioGrade::BPlus => write!(f, "B+"),
            PortfolioGrade::B => write!(f, "B"),
        }
    }
}

// ================= Allocation =================

/// Whole-percentage weights per asset class. The total never exceeds 100.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Allocation {
    pub stocks: u8,
    pub bonds: u8,
    pub crypto: u8,
    pub reits: u8,
}

impl Default for Allocation {
    fn default() -> Self {
        Self {
            stocks: 60,
            bonds: 30,
            crypto: 5,
            reits: 5,
        }
    }
}

#[derive(Deserialize)]
struct RawAllocation {
    #[serde(default)]
    stocks: u32,
    #[serde(default)]
    bonds: u32,
    #[serde(default)]
    crypto: u32,
    #[serde(default)]
    reits: u32,
}

impl<'de> Deserialize<'de> for Allocation {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawAllocation::deserialize(deserializer)?;
        Allocation::new(raw.stocks, raw.bonds, raw.crypto, raw.reits)
            .map_err(serde::de::Error::custom)
    }
}

impl Allocation {
    pub fn new(stocks: u32, bonds: u32, crypto: u32, reits: u32) -> Result<Self> {
        let total = [stocks, bonds, crypto, reits]
            .iter()
            .map(|w| *w as u64)
            .sum::<u64>();
        if total > 100 {
            return Err(FinsightError::InvalidInput(format!(
                "allocation totals {}%, must not exceed 100%",
                total
            )));
        }
        // each weight is ≤ total ≤ 100, so the narrowing is lossless
        Ok(Self {
            stocks: stocks as u8,
            bonds: bonds as u8,
            crypto: crypto as u8,
            reits: reits as u8,
        })
    }

    fn weights(&self) -> [u8; 4] {
        [self.stocks, self.bonds, self.crypto, self.reits]
    }

    pub fn weight(&self, class: AssetClass) -> u8 {
        self.weights()[class.index()]
    }

    pub fn total(&self) -> u32 {
        self.weights().iter().map(|w| *w as u32).sum()
    }

    /// Move one slider. Rejected moves leave the allocation untouched.
    pub fn set(&mut self, class: AssetClass, weight: u32) -> Result<()> {
        let others = self.total() - self.weight(class) as u32;
        let proposed = others.saturating_add(weight);
        if proposed > 100 {
            return Err(FinsightError::InvalidInput(format!(
                "setting {} to {}% would bring the allocation to {}%",
                class, weight, proposed
            )));
        }
        let slot = match class {
            AssetClass::Stocks => &mut self.stocks,
            AssetClass::Bonds => &mut self.bonds,
            AssetClass::Crypto => &mut self.crypto,
            AssetClass::Reits => &mut self.reits,
        };
        *slot = weight as u8;
        Ok(())
    }

    fn blend(&self, factor: impl Fn(AssetClass) -> f64) -> f64 {
        AssetClass::ALL
            .iter()
            .map(|class| self.weight(*class) as f64 / 100.0 * factor(*class))
            .sum()
    }

    /// Weighted expected annual return, as a fraction
    pub fn expected_return(&self) -> f64 {
        self.blend(AssetClass::expected_return)
    }

    /// Weighted risk factor, as a fraction
    pub fn risk(&self) -> f64 {
        self.blend(AssetClass::risk)
    }

    /// Simplified Sharpe-style ratio; `None` for an empty allocation
    pub fn return_to_risk(&self) -> Option<f64> {
        let risk = self.risk();
        (risk > 0.0).then(|| self.expected_return() / risk)
    }

    pub fn grade(&self) -> PortfolioGrade {
        let ret = self.expected_return();
        let risk = self.risk();
        if ret > 0.08 && risk < 0.20 {
            PortfolioGrade::APlus
        } else if ret > 0.06 && risk < 0.25 {
            PortfolioGrade::A
        } else if ret > 0.04 && risk < 0.30 {
            PortfolioGrade::BPlus
        } else {
            PortfolioGrade::B
        }
    }

    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            allocation: *self,
            expected_return: self.expected_return() * 100.0,
            risk: self.risk() * 100.0,
            return_to_risk: self.return_to_risk(),
            grade: self.grade(),
        }
    }
}

/// Blend results in percent, for display and the calculator service
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioSummary {
    pub allocation: Allocation,
    pub expected_return: f64,
    pub risk: f64,
    pub return_to_risk: Option<f64>,
    pub grade: PortfolioGrade,
}
