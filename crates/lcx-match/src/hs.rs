//! # HS Code Extraction
//!
//! Harmonized System codes in goods descriptions (`HS 1006.30`, `6109 10 00`)
//! are normalized to digits. A code is accepted when it has 6 to 10 digits
//! and its first two digits name a tariff chapter 01 to 99. Two descriptions
//! agree on HS codes when any pair of their codes shares the 6-digit heading.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}(?:[.\s]?\d{2}){1,3}\b").expect("Invalid HS code regex"));

/// A normalized HS code (digits only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HsCode(String);

impl HsCode {
    /// Validate a candidate code: 6 to 10 digits after removing separators and
    /// a chapter between 01 and 99.
    pub fn parse(candidate: &str) -> Option<Self> {
        let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
        if !(6..=10).contains(&digits.len()) {
            return None;
        }
        let chapter: u8 = digits.get(..2)?.parse().ok()?;
        if !(1..=99).contains(&chapter) {
            return None;
        }
        Some(Self(digits))
    }

    /// Digits of the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tariff chapter (first two digits).
    pub fn chapter(&self) -> &str {
        &self.0[..2]
    }

    /// Six-digit heading shared internationally.
    pub fn heading(&self) -> &str {
        &self.0[..6]
    }

    /// Whether both codes name the same 6-digit heading.
    pub fn agrees_with(&self, other: &HsCode) -> bool {
        self.heading() == other.heading()
    }
}

impl fmt::Display for HsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract distinct HS codes in order of appearance.
pub fn extract_hs_codes(text: &str) -> Vec<HsCode> {
    let mut codes: Vec<HsCode> = Vec::new();
    for m in HS_PATTERN.find_iter(text) {
        if let Some(code) = HsCode::parse(m.as_str()) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

/// Whether any code in `a` agrees with any code in `b`.
pub fn codes_agree(a: &[HsCode], b: &[HsCode]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.agrees_with(y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dotted_and_spaced_codes() {
        let codes = extract_hs_codes("RICE HS CODE 1006.30 AND T-SHIRTS 6109 10 00");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].as_str(), "100630");
        assert_eq!(codes[1].as_str(), "61091000");
    }

    #[test]
    fn rejects_chapter_zero_and_short_numbers() {
        assert!(HsCode::parse("001234").is_none());
        assert!(HsCode::parse("1234").is_none());
        assert!(extract_hs_codes("QTY 500 BAGS").is_empty());
    }

    #[test]
    fn headings_agree_across_national_extensions() {
        let a = HsCode::parse("6109.10").unwrap();
        let b = HsCode::parse("6109100010").unwrap();
        assert!(a.agrees_with(&b));
        assert_eq!(a.chapter(), "61");
    }

    #[test]
    fn codes_agree_on_any_pair() {
        let a = extract_hs_codes("HS 1006.30 / 1006.40");
        let b = extract_hs_codes("HS 100640");
        assert!(codes_agree(&a, &b));
        assert!(!codes_agree(&a, &extract_hs_codes("HS 6109.10")));
        assert!(!codes_agree(&a, &[]));
    }
}
