//! # Tolerant Value Parsing
//!
//! Amounts, currencies, dates, tolerances and day counts arrive as free
//! text from extraction and from loosely typed supporting documents. Every
//! parser here returns `Option`: an absent or unparseable value is "cannot
//! check", never a panic and never an error.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static AMOUNT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?\d(?:[\d.,'\u{a0} ]*\d)?").expect("Invalid amount regex")
});

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("Invalid currency regex"));

static FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Invalid integer regex"));

static TOLERANCE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\s*$").expect("Invalid tolerance regex")
});

static TOLERANCE_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:%|PCT|PERCENT)?").expect("Invalid tolerance regex")
});

/// Words that mark an LC amount as approximate (UCP 600 Art. 30(a)).
const APPROXIMATE_MARKERS: &[&str] = &["ABOUT", "APPROXIMATELY", "CIRCA", "APPROX"];

/// Codes that look like currencies but are common words in amount text.
const NOT_CURRENCIES: &[&str] = &["AND", "THE", "PCT", "FOR", "NOT", "MAX"];

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Parse a monetary amount.
///
/// Accepts plain numbers, thousands separators in either convention
/// (`100,000.00`, `100.000,00`, `1 234,50`, `1'234.50`), and currency codes or
/// symbols before or after the number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let token = AMOUNT_TOKEN.find(text)?.as_str();
    let cleaned: String = token
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\''))
        .collect();
    let normalized = normalize_separators(&cleaned)?;
    let value: f64 = normalized.parse().ok()?;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Parse a JSON value as an amount: numbers directly, strings via
/// [`parse_amount`].
pub fn parse_amount_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn normalize_separators(token: &str) -> Option<String> {
    let (sign, digits) = match token.strip_prefix(['-', '+']) {
        Some(rest) => (&token[..1], rest),
        None => ("", token),
    };
    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');
    let body = match (last_comma, last_dot) {
        (None, None) => digits.to_string(),
        (Some(c), Some(d)) => {
            // The separator that appears last is the decimal separator.
            let (decimal_at, thousands) = if c > d { (c, '.') } else { (d, ',') };
            let (int_part, frac_part) = digits.split_at(decimal_at);
            let int_clean: String = int_part.chars().filter(|&ch| ch != thousands).collect();
            if int_clean.contains([',', '.']) {
                return None;
            }
            format!("{int_clean}.{}", &frac_part[1..])
        }
        (Some(_), None) => {
            let groups: Vec<&str> = digits.split(',').collect();
            let last = groups.last().copied().unwrap_or("");
            if groups.len() == 2 && (1..=2).contains(&last.len()) {
                // Single comma followed by one or two digits: decimal comma.
                format!("{}.{}", groups[0], last)
            } else {
                groups.concat()
            }
        }
        (None, Some(_)) => {
            let groups: Vec<&str> = digits.split('.').collect();
            if groups.len() > 2 {
                // 1.234.567: dots as thousands separators.
                groups.concat()
            } else {
                digits.to_string()
            }
        }
    };
    if body.is_empty() || body == "." {
        return None;
    }
    Some(format!("{sign}{body}"))
}

/// Whether an LC amount text is qualified as approximate.
pub fn is_approximate_amount(text: &str) -> bool {
    let upper = text.to_uppercase();
    upper
        .split(|c: char| !c.is_ascii_alphabetic())
        .any(|word| APPROXIMATE_MARKERS.contains(&word))
}

/// Extract an ISO 4217-looking currency code or a common currency symbol.
pub fn parse_currency(text: &str) -> Option<String> {
    let upper = text.trim().to_uppercase();
    for caps in CURRENCY_CODE.captures_iter(&upper) {
        if let Some(code) = caps.get(1) {
            if !NOT_CURRENCIES.contains(&code.as_str()) {
                return Some(code.as_str().to_string());
            }
        }
    }
    let symbol = if upper.contains('$') {
        "USD"
    } else if upper.contains('€') {
        "EUR"
    } else if upper.contains('£') {
        "GBP"
    } else if upper.contains('¥') {
        "JPY"
    } else {
        return None;
    };
    Some(symbol.to_string())
}

/// Render an amount with thousands separators and two decimals.
///
/// `105000.0` → `"105,000.00"`.
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let int_part = cents / 100;
    let frac = cents % 100;
    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{grouped}.{frac:02}", if negative { "-" } else { "" })
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Formats tried in order after the digit-only and RFC 3339 shortcuts.
/// Day-first numeric formats precede month-first ones: trade documents
/// outside North America write 03/04/2026 as 3 April. Two-digit-year
/// variants come first because `%Y` also accepts `26`.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%d %b %y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Parse a calendar date from free text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return match trimmed.len() {
            8 => NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok(),
            // SWIFT MT700 YYMMDD.
            6 => NaiveDate::parse_from_str(trimmed, "%y%m%d").ok(),
            _ => None,
        };
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if trimmed.len() > 10 && trimmed.as_bytes().get(10) == Some(&b'T') {
        if let Ok(date) = NaiveDate::parse_from_str(&trimmed[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&collapsed, fmt).ok())
}

/// Parse a JSON value as a date (strings only).
pub fn parse_date_value(value: &serde_json::Value) -> Option<NaiveDate> {
    match value {
        serde_json::Value::String(s) => parse_date(s),
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| parse_date(&v.to_string())),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tolerances and periods
// ---------------------------------------------------------------------------

/// An amount tolerance as fractions (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Permitted excess over the stated amount.
    pub plus: f64,
    /// Permitted shortfall under the stated amount.
    pub minus: f64,
}

/// Parse a tolerance term: `"5/5"` (MT700 39A), `"10"`, `"+/-5%"`, `"10 PCT"`.
pub fn parse_tolerance(text: &str) -> Option<Tolerance> {
    let upper = text.trim().to_uppercase();
    if let Some(caps) = TOLERANCE_PAIR.captures(&upper) {
        let plus: f64 = caps.get(1)?.as_str().parse().ok()?;
        let minus: f64 = caps.get(2)?.as_str().parse().ok()?;
        return Some(Tolerance {
            plus: plus / 100.0,
            minus: minus / 100.0,
        });
    }
    let caps = TOLERANCE_SINGLE.captures(&upper)?;
    let pct: f64 = caps.get(1)?.as_str().parse().ok()?;
    if !(0.0..=100.0).contains(&pct) {
        return None;
    }
    Some(Tolerance {
        plus: pct / 100.0,
        minus: pct / 100.0,
    })
}

/// First integer in the text: `"21"`, `"21 DAYS AFTER SHIPMENT"`.
pub fn parse_days(text: &str) -> Option<i64> {
    FIRST_INTEGER.find(text)?.as_str().parse().ok()
}

/// Interpret a loosely typed flag (`true`, `"yes"`, `"Y"`, `1`).
pub fn parse_flag(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_i64().map(|v| v != 0),
        serde_json::Value::String(s) => match s.trim().to_uppercase().as_str() {
            "TRUE" | "YES" | "Y" | "1" => Some(true),
            "FALSE" | "NO" | "N" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn amounts_in_common_formats() {
        assert_eq!(parse_amount("100000"), Some(100_000.0));
        assert_eq!(parse_amount("100,000.00"), Some(100_000.0));
        assert_eq!(parse_amount("USD 100,000.00"), Some(100_000.0));
        assert_eq!(parse_amount("100.000,00 EUR"), Some(100_000.0));
        assert_eq!(parse_amount("1 234,50"), Some(1234.5));
        assert_eq!(parse_amount("1'234.50"), Some(1234.5));
        assert_eq!(parse_amount("1.234.567"), Some(1_234_567.0));
        assert_eq!(parse_amount("12,5"), Some(12.5));
        assert_eq!(parse_amount("$ 99.95"), Some(99.95));
    }

    #[test]
    fn unparseable_amounts_are_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("one hundred"), None);
    }

    #[test]
    fn amount_values_from_json() {
        assert_eq!(parse_amount_value(&serde_json::json!(1500.5)), Some(1500.5));
        assert_eq!(parse_amount_value(&serde_json::json!("1,500.50")), Some(1500.5));
        assert_eq!(parse_amount_value(&serde_json::json!(null)), None);
        assert_eq!(parse_amount_value(&serde_json::json!(true)), None);
    }

    #[test]
    fn approximate_amounts() {
        assert!(is_approximate_amount("ABOUT USD 100,000"));
        assert!(is_approximate_amount("approximately 50000"));
        assert!(!is_approximate_amount("USD 100,000"));
    }

    #[test]
    fn currencies() {
        assert_eq!(parse_currency("USD 100,000"), Some("USD".to_string()));
        assert_eq!(parse_currency("100.000,00 eur"), Some("EUR".to_string()));
        assert_eq!(parse_currency("$5"), Some("USD".to_string()));
        assert_eq!(parse_currency("100000"), None);
    }

    #[test]
    fn formatting_groups_thousands() {
        assert_eq!(format_amount(105_000.0), "105,000.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(-5000.0), "-5,000.00");
    }

    #[test]
    fn dates_in_common_formats() {
        assert_eq!(parse_date("2026-03-15"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("15/03/2026"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("15.03.2026"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("260315"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("20260315"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("15 Mar 2026"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("15-MAR-26"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("March 15, 2026"), Some(d(2026, 3, 15)));
        assert_eq!(parse_date("2026-03-15T10:00:00Z"), Some(d(2026, 3, 15)));
    }

    #[test]
    fn month_first_fallback_when_day_first_is_impossible() {
        assert_eq!(parse_date("03/25/2026"), Some(d(2026, 3, 25)));
    }

    #[test]
    fn invalid_dates_are_none() {
        assert_eq!(parse_date("31/02/2026"), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("12345"), None);
    }

    #[test]
    fn tolerances() {
        assert_eq!(
            parse_tolerance("5/5"),
            Some(Tolerance { plus: 0.05, minus: 0.05 })
        );
        assert_eq!(
            parse_tolerance("10/0"),
            Some(Tolerance { plus: 0.10, minus: 0.0 })
        );
        assert_eq!(
            parse_tolerance("+/-5%"),
            Some(Tolerance { plus: 0.05, minus: 0.05 })
        );
        assert_eq!(parse_tolerance("none"), None);
    }

    #[test]
    fn days() {
        assert_eq!(parse_days("21"), Some(21));
        assert_eq!(parse_days("WITHIN 15 DAYS AFTER SHIPMENT"), Some(15));
        assert_eq!(parse_days("n/a"), None);
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag(&serde_json::json!(true)), Some(true));
        assert_eq!(parse_flag(&serde_json::json!("yes")), Some(true));
        assert_eq!(parse_flag(&serde_json::json!("N")), Some(false));
        assert_eq!(parse_flag(&serde_json::json!("maybe")), None);
    }
}
