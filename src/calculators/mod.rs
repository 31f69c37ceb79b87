//! Client-side financial estimators
//!
//! Pure functions over plain inputs. Nothing here touches the network.

pub mod fire;
pub mod planning;
pub mod portfolio;
pub mod tax;

use crate::error::FinsightError;
use crate::Result;

pub use fire::{FireInputs, FireProjection};
pub use portfolio::{Allocation, AssetClass, PortfolioGrade, PortfolioSummary};
pub use tax::{TaxBracket, TaxEstimate, TaxInputs, TaxTable};

/// Reject NaN and infinities before they poison a projection
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FinsightError::InvalidInput(format!(
            "{} must be a finite number",
            name
        )))
    }
}
