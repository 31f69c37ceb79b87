//! Display helpers for money and percentages

use rust_decimal::{Decimal, RoundingStrategy};

/// Symbol and minor-unit digits for the currencies the app shows natively
fn currency_style(currency: &str) -> Option<(&'static str, usize)> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => Some(("$", 2)),
        "EUR" => Some(("€", 2)),
        "GBP" => Some(("£", 2)),
        "INR" => Some(("₹", 2)),
        "JPY" => Some(("¥", 0)),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn currency_prefix(currency: &str) -> (String, usize) {
    match currency_style(currency) {
        Some((symbol, decimals)) => (symbol.to_string(), decimals),
        None => (format!("{} ", currency.to_ascii_uppercase()), 2),
    }
}

/// Assemble sign, prefix and grouped digits from an unsigned fixed-point string
fn render(prefix: &str, fixed: &str, negative: bool) -> String {
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed, None),
    };

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if negative && !is_zero { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{}{}{}.{}", sign, prefix, group_thousands(whole), fraction),
        None => format!("{}{}{}", sign, prefix, group_thousands(whole)),
    }
}

/// `$1,234.56`, `-$12.00`, `¥1,234`; unknown codes render as `CAD 1,234.56`
pub fn format_currency(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return "N/A".to_string();
    }

    let (prefix, decimals) = currency_prefix(currency);
    let fixed = format!("{:.*}", decimals, amount.abs());
    render(&prefix, &fixed, amount < 0.0)
}

/// Exact rendering of a stored amount, rounding half away from zero
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let (prefix, decimals) = currency_prefix(currency);
    let rounded = amount
        .abs()
        .round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.*}", decimals, rounded);
    render(&prefix, &fixed, amount.is_sign_negative())
}

/// `12.3%` with a fixed number of decimals
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.56, "USD"), "$1,234.56");
        assert_eq!(format_currency(-12.0, "USD"), "-$12.00");
        assert_eq!(format_currency(0.0, "usd"), "$0.00");
        assert_eq!(format_currency(999.999, "USD"), "$1,000.00");
        assert_eq!(format_currency(1_234_567.0, "EUR"), "€1,234,567.00");
        assert_eq!(format_currency(1234.4, "JPY"), "¥1,234");
        assert_eq!(format_currency(50.0, "cad"), "CAD 50.00");
    }

    #[test]
    fn test_tiny_negative_has_no_sign() {
        assert_eq!(format_currency(-0.001, "USD"), "$0.00");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_currency(f64::NAN, "USD"), "N/A");
    }

    #[test]
    fn test_format_money() {
        let money = |s: &str| s.parse::<Decimal>().unwrap();

        assert_eq!(format_money(money("1234.56"), "USD"), "$1,234.56");
        assert_eq!(format_money(money("-42.5"), "USD"), "-$42.50");
        assert_eq!(format_money(money("0.125"), "USD"), "$0.13");
        assert_eq!(format_money(money("-0.004"), "USD"), "$0.00");
        assert_eq!(format_money(money("1234.5"), "JPY"), "¥1,235");
        assert_eq!(
            format_money(money("90071992547409.93"), "USD"),
            "$90,071,992,547,409.93"
        );
        assert_eq!(format_money(money("50"), "cad"), "CAD 50.00");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(12.345, 1), "12.3%");
        assert_eq!(format_percentage(7.0, 0), "7%");
        assert_eq!(format_percentage(-3.5, 2), "-3.50%");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
    }
}
