//! # Goods-Description Correspondence
//!
//! UCP 600 Article 18(c) requires the invoice description to correspond
//! with the credit, not to reproduce it. The presented description may be
//! more detailed than the LC. Correspondence is decided in order:
//!
//! 1. HS codes on both sides agree at the 6-digit heading: `HsCode`.
//! 2. Every key product term of the LC appears in the presented text:
//!    `KeyTerms`.
//! 3. The better of token similarity and key-term coverage reaches the
//!    goods threshold: `Similarity`.
//! 4. Otherwise `NoMatch`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::MatchingConfig;
use crate::hs::{codes_agree, extract_hs_codes};
use crate::text::{content_tokens, jaccard};

const KEY_TERMS_CONFIDENCE: f64 = 0.9;

/// Packing and quantity words that say nothing about what the goods are.
const GENERIC_TERMS: &[&str] = &[
    "BAG", "BAGS", "BALE", "BALES", "BOX", "BOXES", "CARTON", "CARTONS", "CASE", "CASES",
    "CTNS", "DRUM", "DRUMS", "GROSS", "KG", "KGS", "LBS", "MT", "MTS", "NET", "PACKED",
    "PACKING", "PALLETS", "PCS", "PIECES", "QTY", "QUANTITY", "TON", "TONS", "UNITS", "WEIGHT",
    "HS", "CODE", "GOODS", "ORIGIN", "AS", "PER", "PROFORMA", "INVOICE", "CONTRACT", "NO",
];

/// How a goods description was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionMethod {
    /// HS codes agree.
    HsCode,
    /// All LC key terms present.
    KeyTerms,
    /// Token similarity or partial key-term coverage.
    Similarity,
    /// Empty input.
    NoMatch,
}

/// Outcome of a correspondence check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionMatch {
    /// Whether the descriptions correspond.
    pub corresponds: bool,
    /// Score in `[0, 1]`.
    pub confidence: f64,
    /// Deciding method.
    pub method: DescriptionMethod,
}

/// Goods-description matcher.
#[derive(Debug, Clone, Default)]
pub struct GoodsMatcher {
    config: MatchingConfig,
}

impl GoodsMatcher {
    /// Create a matcher with the given thresholds.
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Key product terms: content tokens that are neither generic packing
    /// words nor pure numbers.
    pub fn key_terms(text: &str) -> BTreeSet<String> {
        content_tokens(text)
            .into_iter()
            .filter(|t| t.chars().count() >= 3)
            .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
            .filter(|t| !GENERIC_TERMS.contains(&t.as_str()))
            .collect()
    }

    /// Does `presented` correspond with the credit's description `reference`?
    pub fn correspond(&self, reference: &str, presented: &str) -> DescriptionMatch {
        if reference.trim().is_empty() || presented.trim().is_empty() {
            return DescriptionMatch {
                corresponds: false,
                confidence: 0.0,
                method: DescriptionMethod::NoMatch,
            };
        }
        if codes_agree(&extract_hs_codes(reference), &extract_hs_codes(presented)) {
            return DescriptionMatch {
                corresponds: true,
                confidence: 1.0,
                method: DescriptionMethod::HsCode,
            };
        }
        let reference_terms = Self::key_terms(reference);
        let presented_tokens = content_tokens(presented);
        let coverage = if reference_terms.is_empty() {
            0.0
        } else {
            reference_terms.intersection(&presented_tokens).count() as f64
                / reference_terms.len() as f64
        };
        if !reference_terms.is_empty() && coverage >= 1.0 {
            return DescriptionMatch {
                corresponds: true,
                confidence: KEY_TERMS_CONFIDENCE,
                method: DescriptionMethod::KeyTerms,
            };
        }
        let similarity = jaccard(&content_tokens(reference), &presented_tokens);
        let confidence = similarity.max(coverage);
        DescriptionMatch {
            corresponds: confidence >= self.config.goods_threshold,
            confidence,
            method: DescriptionMethod::Similarity,
        }
    }

    /// Symmetric comparison for two presented documents, neither of which is
    /// the reference: the better of both directions.
    pub fn compare(&self, a: &str, b: &str) -> DescriptionMatch {
        let forward = self.correspond(a, b);
        let backward = self.correspond(b, a);
        if (backward.corresponds && !forward.corresponds) || backward.confidence > forward.confidence {
            backward
        } else {
            forward
        }
    }
}
