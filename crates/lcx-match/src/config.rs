//! Matching thresholds.

use serde::{Deserialize, Serialize};

/// Thresholds and weights for the fuzzy matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Party-name acceptance threshold.
    pub party_threshold: f64,
    /// Party-name acceptance threshold in strict mode.
    pub strict_party_threshold: f64,
    /// Minimum confidence for a containment match.
    pub containment_confidence: f64,
    /// Minimum length of a shared token that earns the key-token boost.
    pub key_token_min_len: usize,
    /// Confidence added when a key token is shared.
    pub key_token_boost: f64,
    /// Goods-description correspondence threshold.
    pub goods_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            party_threshold: 0.7,
            strict_party_threshold: 0.85,
            containment_confidence: 0.85,
            key_token_min_len: 5,
            key_token_boost: 0.1,
            goods_threshold: 0.6,
        }
    }
}
