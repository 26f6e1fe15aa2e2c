//! Cross-document thresholds.

use serde::{Deserialize, Serialize};

/// Tunable constants of the cross-document rules. Fractions are `0..=1`
/// (`0.05` is 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossDocConfig {
    /// Invoice amount tolerance when the LC states none.
    pub default_tolerance: f64,
    /// Tolerance when the LC amount is qualified "about" or "approximately".
    pub approximate_tolerance: f64,
    /// Minimum insurance cover as a multiple of the LC amount.
    pub insurance_coverage_ratio: f64,
    /// Absolute slack on amount comparisons.
    pub amount_epsilon: f64,
    /// Presentation period when the LC states none.
    pub presentation_period_days: i64,
    /// Days before expiry at which an expiring-LC finding is raised.
    pub expiry_warning_days: i64,
    /// Days before expiry at which that finding becomes critical.
    pub expiry_critical_days: i64,
    /// Remaining presentation days at which an advisory is raised.
    pub presentation_warning_days: i64,
    /// Relative slack between packing-list and transport-document weights.
    pub weight_tolerance: f64,
}

impl Default for CrossDocConfig {
    fn default() -> Self {
        Self {
            default_tolerance: 0.05,
            approximate_tolerance: 0.10,
            insurance_coverage_ratio: 1.10,
            amount_epsilon: 0.005,
            presentation_period_days: 21,
            expiry_warning_days: 7,
            expiry_critical_days: 2,
            presentation_warning_days: 5,
            weight_tolerance: 0.01,
        }
    }
}

impl CrossDocConfig {
    /// Check ranges. Returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("default_tolerance", self.default_tolerance),
            ("approximate_tolerance", self.approximate_tolerance),
            ("weight_tolerance", self.weight_tolerance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        if !(self.insurance_coverage_ratio >= 1.0 && self.insurance_coverage_ratio <= 2.0) {
            return Err(format!(
                "insurance_coverage_ratio must be within [1, 2], got {}",
                self.insurance_coverage_ratio
            ));
        }
        if !(self.amount_epsilon >= 0.0) {
            return Err(format!("amount_epsilon must be non-negative, got {}", self.amount_epsilon));
        }
        for (name, value) in [
            ("presentation_period_days", self.presentation_period_days),
            ("expiry_warning_days", self.expiry_warning_days),
            ("expiry_critical_days", self.expiry_critical_days),
            ("presentation_warning_days", self.presentation_warning_days),
        ] {
            if value < 0 {
                return Err(format!("{name} must be non-negative, got {value}"));
            }
        }
        if self.expiry_critical_days > self.expiry_warning_days {
            return Err("expiry_critical_days must not exceed expiry_warning_days".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CrossDocConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = CrossDocConfig {
            default_tolerance: 5.0,
            ..CrossDocConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("default_tolerance"));

        let config = CrossDocConfig {
            expiry_critical_days: 10,
            ..CrossDocConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CrossDocConfig =
            serde_json::from_value(serde_json::json!({"default_tolerance": 0.1})).unwrap();
        assert_eq!(config.default_tolerance, 0.1);
        assert_eq!(config.presentation_period_days, 21);
    }
}
