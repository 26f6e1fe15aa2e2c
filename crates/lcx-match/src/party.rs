//! # Party-Name Matching
//!
//! Names of applicants, beneficiaries, shippers and issuers are compared
//! after normalization: uppercase, `&` expanded to `AND`, punctuation
//! stripped, common abbreviations expanded, trailing legal-form suffixes and
//! articles removed.
//!
//! ## Scoring
//!
//! 1. Either side empty after normalization: no match.
//! 2. Identical normalized names: `Exact`, confidence 1.0.
//! 3. One name contained in the other on token boundaries: `Containment`,
//!    confidence at least [`MatchingConfig::containment_confidence`].
//! 4. Otherwise `Fuzzy`: `0.5 * jaccard + 0.3 * lcs_ratio + 0.2 *
//!    levenshtein_ratio`, plus a boost when a long token is shared.
//!
//! Every step is symmetric, so `match_names(a, b)` and `match_names(b, a)`
//! report the same confidence.

use serde::{Deserialize, Serialize};

use crate::config::MatchingConfig;
use crate::text::{jaccard, lcs_ratio, levenshtein_ratio, token_set};

const JACCARD_WEIGHT: f64 = 0.5;
const LCS_WEIGHT: f64 = 0.3;
const LEVENSHTEIN_WEIGHT: f64 = 0.2;

/// Abbreviations expanded before suffix removal.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("CO", "COMPANY"),
    ("INTL", "INTERNATIONAL"),
    ("MFG", "MANUFACTURING"),
    ("CORP", "CORPORATION"),
];

/// Legal-form suffixes removed from the end of a name.
const LEGAL_SUFFIXES: &[&str] = &[
    "LTD", "LIMITED", "INC", "LLC", "GMBH", "PLC", "SA", "AG", "BV", "PVT", "PTE",
    "CORPORATION", "COMPANY", "CO", "SRL", "SPA", "NV", "OY", "AB", "KK",
];

const ARTICLES: &[&str] = &["THE", "A", "AN"];

/// How two party names were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyMatchMethod {
    /// Identical after normalization.
    Exact,
    /// One name contained in the other.
    Containment,
    /// Weighted similarity blend.
    Fuzzy,
    /// Empty input or below threshold with no better method.
    NoMatch,
}

/// Result of comparing two party names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMatch {
    /// Whether the confidence met the threshold in force.
    pub matched: bool,
    /// Similarity in `[0, 1]`.
    pub confidence: f64,
    /// Method that produced the confidence.
    pub method: PartyMatchMethod,
    /// First name after normalization.
    pub normalized_a: String,
    /// Second name after normalization.
    pub normalized_b: String,
}

/// Party-name matcher.
#[derive(Debug, Clone, Default)]
pub struct PartyMatcher {
    config: MatchingConfig,
}

impl PartyMatcher {
    /// Create a matcher with the given thresholds.
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Compare at the default threshold.
    pub fn match_names(&self, a: &str, b: &str) -> PartyMatch {
        self.compare(a, b, self.config.party_threshold)
    }

    /// Compare at the strict threshold.
    pub fn match_strict(&self, a: &str, b: &str) -> PartyMatch {
        self.compare(a, b, self.config.strict_party_threshold)
    }

    /// Normalize a party name for comparison.
    pub fn normalize(name: &str) -> String {
        let upper = name.to_uppercase().replace('&', " AND ");
        // Dots vanish so "B.V." and "CO." survive as single tokens.
        let cleaned: String = upper
            .chars()
            .filter(|&c| c != '.')
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let mut tokens: Vec<&str> = cleaned
            .split_whitespace()
            .map(|t| {
                ABBREVIATIONS
                    .iter()
                    .find(|(abbr, _)| *abbr == t)
                    .map_or(t, |(_, full)| *full)
            })
            .collect();
        while tokens.len() > 1 && tokens.last().is_some_and(|t| LEGAL_SUFFIXES.contains(t)) {
            tokens.pop();
        }
        let without_articles: Vec<&str> = tokens
            .iter()
            .copied()
            .filter(|t| !ARTICLES.contains(t))
            .collect();
        if without_articles.is_empty() {
            tokens.join(" ")
        } else {
            without_articles.join(" ")
        }
    }

    fn compare(&self, a: &str, b: &str, threshold: f64) -> PartyMatch {
        let normalized_a = Self::normalize(a);
        let normalized_b = Self::normalize(b);
        let (confidence, method) = self.score(&normalized_a, &normalized_b);
        PartyMatch {
            matched: method != PartyMatchMethod::NoMatch && confidence >= threshold,
            confidence,
            method,
            normalized_a,
            normalized_b,
        }
    }

    fn score(&self, a: &str, b: &str) -> (f64, PartyMatchMethod) {
        if a.is_empty() || b.is_empty() {
            return (0.0, PartyMatchMethod::NoMatch);
        }
        if a == b {
            return (1.0, PartyMatchMethod::Exact);
        }
        let fuzzy = self.fuzzy(a, b);
        if contains_tokens(a, b) || contains_tokens(b, a) {
            return (
                fuzzy.max(self.config.containment_confidence),
                PartyMatchMethod::Containment,
            );
        }
        (fuzzy, PartyMatchMethod::Fuzzy)
    }

    fn fuzzy(&self, a: &str, b: &str) -> f64 {
        let tokens_a = token_set(a);
        let tokens_b = token_set(b);
        let mut score = JACCARD_WEIGHT * jaccard(&tokens_a, &tokens_b)
            + LCS_WEIGHT * lcs_ratio(a, b)
            + LEVENSHTEIN_WEIGHT * levenshtein_ratio(a, b);
        let shares_key_token = tokens_a
            .intersection(&tokens_b)
            .any(|t| t.chars().count() >= self.config.key_token_min_len);
        if shares_key_token {
            score += self.config.key_token_boost;
        }
        score.clamp(0.0, 1.0)
    }
}

/// `needle` appears in `haystack` as a whole-token run of at least 3 chars.
fn contains_tokens(haystack: &str, needle: &str) -> bool {
    needle.chars().count() >= 3 && format!(" {haystack} ").contains(&format!(" {needle} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PartyMatcher {
        PartyMatcher::default()
    }

    #[test]
    fn normalization_strips_suffixes_and_articles() {
        assert_eq!(PartyMatcher::normalize("The Acme Trading Co., Ltd."), "ACME TRADING");
        assert_eq!(PartyMatcher::normalize("Smith & Sons GmbH"), "SMITH AND SONS");
        assert_eq!(PartyMatcher::normalize("Global Intl. Corp"), "GLOBAL INTERNATIONAL");
        assert_eq!(PartyMatcher::normalize("Foo B.V."), "FOO");
    }

    #[test]
    fn normalization_keeps_at_least_one_token() {
        assert_eq!(PartyMatcher::normalize("Limited"), "LIMITED");
        assert_eq!(PartyMatcher::normalize("   "), "");
    }

    #[test]
    fn legal_form_variants_match_exactly() {
        let m = matcher().match_names("ACME TRADING LIMITED", "Acme Trading Ltd.");
        assert!(m.matched);
        assert_eq!(m.method, PartyMatchMethod::Exact);
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn containment_meets_floor() {
        let m = matcher().match_names("ACME", "ACME GLOBAL TRADING");
        assert_eq!(m.method, PartyMatchMethod::Containment);
        assert!(m.confidence >= 0.85);
        assert!(m.matched);
    }

    #[test]
    fn unrelated_names_do_not_match() {
        let m = matcher().match_names("ACME TRADING", "ZENITH SHIPPING");
        assert!(!m.matched);
        assert_eq!(m.method, PartyMatchMethod::Fuzzy);
    }

    #[test]
    fn small_typo_matches_fuzzily() {
        let m = matcher().match_names("DHAKA GARMENTS EXPORT", "DHAKA GARMENT EXPORT");
        assert_eq!(m.method, PartyMatchMethod::Fuzzy);
        assert!(m.matched, "confidence {}", m.confidence);
    }

    #[test]
    fn strict_mode_is_stricter() {
        let m = matcher();
        let lenient = m.match_names("DHAKA GARMENTS EXPORT", "DHAKA GARMENT EXPORTERS");
        let strict = m.match_strict("DHAKA GARMENTS EXPORT", "DHAKA GARMENT EXPORTERS");
        assert_eq!(lenient.confidence, strict.confidence);
        if strict.matched {
            assert!(lenient.matched);
        }
    }

    #[test]
    fn empty_never_matches() {
        let m = matcher().match_names("", "ACME");
        assert!(!m.matched);
        assert_eq!(m.method, PartyMatchMethod::NoMatch);
        assert!(!matcher().match_names("", "").matched);
    }

    #[test]
    fn matching_is_commutative() {
        let m = matcher();
        let pairs = [
            ("ACME TRADING", "ACME TRADING INTERNATIONAL"),
            ("Bengal Textiles", "Bengal Textile Mills"),
            ("X", "Y Corp"),
        ];
        for (a, b) in pairs {
            assert_eq!(m.match_names(a, b).confidence, m.match_names(b, a).confidence);
        }
    }
}
