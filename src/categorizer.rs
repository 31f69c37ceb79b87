//! Transaction Categorizer
//!
//! Suggests a spending category from a merchant name and description by
//! matching keyword groups in a fixed order. The first group with a hit wins.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestedCategory {
    #[serde(rename = "Food & Drink")]
    FoodAndDrink,
    Transportation,
    Entertainment,
    Shops,
    #[serde(rename = "Rent & Utilities")]
    RentAndUtilities,
    Healthcare,
    Transfer,
    Other,
}

impl fmt::Display for SuggestedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestedCategory::FoodAndDrink => write!(f, "Food & Drink"),
            SuggestedCategory::Transportation => write!(f, "Transportation"),
            SuggestedCategory::Entertainment => write!(f, "Entertainment"),
            SuggestedCategory::Shops => write!(f, "Shops"),
            SuggestedCategory::RentAndUtilities => write!(f, "Rent & Utilities"),
            SuggestedCategory::Healthcare => write!(f, "Healthcare"),
            SuggestedCategory::Transfer => write!(f, "Transfer"),
            SuggestedCategory::Other => write!(f, "Other"),
        }
    }
}

/// Static keyword lists, matched as substrings of the lower-cased text
const FOOD_KEYWORDS: &[&str] = &[
    "restaurant", "cafe", "coffee", "food", "grocery", "supermarket",
    "mcdonalds", "starbucks", "uber eats", "doordash",
];

const TRANSPORT_KEYWORDS: &[&str] = &[
    "gas", "fuel", "uber", "lyft", "taxi", "parking", "metro", "bus", "train",
    "car wash", "auto",
];

const ENTERTAINMENT_KEYWORDS: &[&str] = &[
    "movie", "cinema", "netflix", "spotify", "entertainment", "concert",
    "theater", "gaming",
];

const SHOPPING_KEYWORDS: &[&str] = &[
    "amazon", "target", "walmart", "mall", "shop", "store", "retail",
    "clothing", "electronics",
];

const UTILITY_KEYWORDS: &[&str] = &[
    "electric", "gas company", "water", "sewer", "internet", "phone", "cable",
    "rent", "mortgage",
];

const HEALTH_KEYWORDS: &[&str] = &[
    "hospital", "clinic", "doctor", "pharmacy", "medical", "dental", "health",
    "cvs pharmacy", "walgreens",
];

const TRANSFER_KEYWORDS: &[&str] = &[
    "transfer", "atm", "withdrawal", "deposit", "bank", "venmo", "paypal", "zelle",
];

/// Groups in priority order. "gas" is a transport hit before the
/// "gas company" utility group is ever reached.
const RULES: &[(SuggestedCategory, &[&str])] = &[
    (SuggestedCategory::FoodAndDrink, FOOD_KEYWORDS),
    (SuggestedCategory::Transportation, TRANSPORT_KEYWORDS),
    (SuggestedCategory::Entertainment, ENTERTAINMENT_KEYWORDS),
    (SuggestedCategory::Shops, SHOPPING_KEYWORDS),
    (SuggestedCategory::RentAndUtilities, UTILITY_KEYWORDS),
    (SuggestedCategory::Healthcare, HEALTH_KEYWORDS),
    (SuggestedCategory::Transfer, TRANSFER_KEYWORDS),
];

pub fn suggest_category(merchant: &str, description: &str) -> SuggestedCategory {
    let text = format!("{} {}", merchant, description).to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map_or(SuggestedCategory::Other, |(category, _)| *category)
}
