//! # Compliance Scorer
//!
//! Cap-first scoring. A weighted base of the extraction, rule and document
//! sub-scores is reduced by per-severity penalties and then capped by the
//! most severe finding present, so completeness can never mask a critical
//! discrepancy.

use serde::{Deserialize, Serialize};

use lcx_core::{Issue, SeverityCounts};

/// Scoring constants. Every value is overridable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Points deducted per CRITICAL issue.
    pub critical_penalty: f64,
    /// Points deducted per MAJOR issue.
    pub major_penalty: f64,
    /// Points deducted per MINOR issue.
    pub minor_penalty: f64,
    /// Ceiling when any CRITICAL issue is present.
    pub critical_cap: f64,
    /// Ceiling when any MAJOR issue is present.
    pub major_cap: f64,
    /// Ceiling when any MINOR issue is present.
    pub minor_cap: f64,
    /// Weight of the extraction sub-score.
    pub extraction_weight: f64,
    /// Weight of the rule sub-score.
    pub rule_weight: f64,
    /// Weight of the document sub-score.
    pub document_weight: f64,
    /// Scores below this are NON_COMPLIANT.
    pub non_compliant_below: f64,
    /// Scores below this are PARTIAL.
    pub partial_below: f64,
    /// Scores below this are MOSTLY_COMPLIANT.
    pub mostly_compliant_below: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            critical_penalty: 20.0,
            major_penalty: 8.0,
            minor_penalty: 3.0,
            critical_cap: 25.0,
            major_cap: 55.0,
            minor_cap: 85.0,
            extraction_weight: 0.30,
            rule_weight: 0.50,
            document_weight: 0.20,
            non_compliant_below: 30.0,
            partial_below: 70.0,
            mostly_compliant_below: 85.0,
        }
    }
}

impl ScoringPolicy {
    /// Check ranges. Returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("critical_penalty", self.critical_penalty),
            ("major_penalty", self.major_penalty),
            ("minor_penalty", self.minor_penalty),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        for (name, value) in [
            ("critical_cap", self.critical_cap),
            ("major_cap", self.major_cap),
            ("minor_cap", self.minor_cap),
            ("non_compliant_below", self.non_compliant_below),
            ("partial_below", self.partial_below),
            ("mostly_compliant_below", self.mostly_compliant_below),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("{name} must be within [0, 100], got {value}"));
            }
        }
        for (name, value) in [
            ("extraction_weight", self.extraction_weight),
            ("rule_weight", self.rule_weight),
            ("document_weight", self.document_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        let sum = self.extraction_weight + self.rule_weight + self.document_weight;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("weights must sum to 1.0, got {sum}"));
        }
        Ok(())
    }
}

/// Compliance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    /// The gate blocked examination.
    Blocked,
    /// A critical discrepancy, or a very low score.
    NonCompliant,
    /// Significant discrepancies.
    Partial,
    /// Minor discrepancies.
    MostlyCompliant,
    /// No material discrepancy.
    Compliant,
}

impl ComplianceLevel {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "BLOCKED",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::Partial => "PARTIAL",
            Self::MostlyCompliant => "MOSTLY_COMPLIANT",
            Self::Compliant => "COMPLIANT",
        }
    }
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceScore {
    /// Final score in `[0, 100]`, one decimal.
    pub score: f64,
    /// Level.
    pub level: ComplianceLevel,
    /// Extraction sub-score.
    pub extraction_score: f64,
    /// Rule sub-score.
    pub rule_score: f64,
    /// Document sub-score.
    pub document_score: f64,
    /// Weighted base before penalties.
    pub base_score: f64,
    /// Total penalty points.
    pub penalty: f64,
    /// Issue tally the score was computed from.
    pub counts: SeverityCounts,
    /// Ceiling that applied.
    pub max_allowed: f64,
    /// Why the ceiling applied, when below 100.
    pub cap_reason: Option<String>,
    /// The ceiling lowered the score.
    pub capped: bool,
}

/// Computes compliance scores.
#[derive(Debug, Clone, Default)]
pub struct ComplianceScorer {
    policy: ScoringPolicy,
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl ComplianceScorer {
    /// Scorer with the given policy.
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Policy in use.
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Ceiling for a severity tally, with its reason when below 100.
    pub fn cap(&self, counts: &SeverityCounts) -> (f64, Option<String>) {
        let p = &self.policy;
        let (cap, count, label) = if counts.critical > 0 {
            (p.critical_cap, counts.critical, "critical")
        } else if counts.major > 0 {
            (p.major_cap, counts.major, "major")
        } else if counts.minor > 0 {
            (p.minor_cap, counts.minor, "minor")
        } else {
            return (100.0, None);
        };
        (cap, Some(format!("{count} {label} issue(s) present; score capped at {cap}")))
    }

    /// Score a set of issues.
    ///
    /// `extraction_completeness` is a fraction; the rule and document
    /// scores are on 0..100 and default to 100 when unknown.
    pub fn calculate(
        &self,
        issues: &[Issue],
        extraction_completeness: f64,
        rule_score: Option<f64>,
        document_score: Option<f64>,
        blocked: bool,
    ) -> ComplianceScore {
        let p = &self.policy;
        let counts = SeverityCounts::from_issues(issues);
        if blocked {
            // The ceiling still follows the counts; the gate decides the score.
            let (max_allowed, _) = self.cap(&counts);
            return ComplianceScore {
                score: 0.0,
                level: ComplianceLevel::Blocked,
                extraction_score: 0.0,
                rule_score: 0.0,
                document_score: 0.0,
                base_score: 0.0,
                penalty: 0.0,
                counts,
                max_allowed,
                cap_reason: Some("validation blocked by the gate".to_string()),
                capped: false,
            };
        }

        let extraction_score = clamp_score(extraction_completeness * 100.0);
        let rule_score = clamp_score(rule_score.unwrap_or(100.0));
        let document_score = clamp_score(document_score.unwrap_or(100.0));
        let base_score = extraction_score * p.extraction_weight
            + rule_score * p.rule_weight
            + document_score * p.document_weight;

        let penalty = counts.critical as f64 * p.critical_penalty
            + counts.major as f64 * p.major_penalty
            + counts.minor as f64 * p.minor_penalty;

        let (max_allowed, cap_reason) = self.cap(&counts);

        let uncapped = (base_score - penalty).max(0.0);
        let capped = uncapped > max_allowed + 1e-9;
        let score = round1(clamp_score(uncapped.min(max_allowed)));

        let level = if counts.critical > 0 || score < p.non_compliant_below {
            ComplianceLevel::NonCompliant
        } else if score < p.partial_below {
            ComplianceLevel::Partial
        } else if score < p.mostly_compliant_below {
            ComplianceLevel::MostlyCompliant
        } else {
            ComplianceLevel::Compliant
        };

        tracing::debug!(score, base_score, penalty, cap = max_allowed, capped, level = %level, "score calculated");

        ComplianceScore {
            score,
            level,
            extraction_score,
            rule_score,
            document_score,
            base_score,
            penalty,
            counts,
            max_allowed,
            cap_reason,
            capped,
        }
    }
}
