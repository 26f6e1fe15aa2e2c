//! # Validation Gate
//!
//! Pre-flight check on the LC baseline. When extraction is too incomplete
//! to trust, the gate blocks and the pipeline skips every later stage.
//!
//! Checks run in a fixed order and all of them run: a blocked result lists
//! every blocking reason, not just the first.

use serde::{Deserialize, Serialize};

use lcx_core::{DocumentType, Issue, IssueSource, LcBaseline, LcField, Severity};

/// Gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Minimum fraction of CRITICAL fields that must be present.
    pub min_critical_completeness: f64,
    /// Minimum priority-weighted completeness.
    pub min_completeness: f64,
    /// Completeness under which a warning is raised.
    pub warn_completeness: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_critical_completeness: 0.5,
            min_completeness: 0.3,
            warn_completeness: 0.6,
        }
    }
}

/// Gate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    /// Nothing to report.
    Passed,
    /// Proceed, with warnings.
    Warning,
    /// Do not proceed.
    Blocked,
}

impl GateStatus {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Warning => "WARNING",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    /// Overall verdict.
    pub status: GateStatus,
    /// `false` exactly when blocked.
    pub can_proceed: bool,
    /// Title of the first blocking check, when blocked.
    pub block_reason: Option<String>,
    /// Completeness the gate judged.
    pub completeness: f64,
    /// Critical completeness the gate judged.
    pub critical_completeness: f64,
    /// Absent CRITICAL fields.
    pub missing_critical: Vec<String>,
    /// Absent REQUIRED fields.
    pub missing_required: Vec<String>,
    /// CRITICAL issues with `blocks_validation` set.
    pub blocking_issues: Vec<Issue>,
    /// INFO issues that do not stop the run.
    pub warnings: Vec<Issue>,
}

impl GateResult {
    /// Blocking issues followed by warnings.
    pub fn issues(&self) -> Vec<Issue> {
        self.blocking_issues
            .iter()
            .chain(self.warnings.iter())
            .cloned()
            .collect()
    }
}

/// The validation gate.
#[derive(Debug, Clone, Default)]
pub struct ValidationGate {
    config: GateConfig,
}

fn blocker(rule: &str, title: &str) -> lcx_core::IssueBuilder {
    Issue::builder(rule, title, Severity::Critical, IssueSource::Gate)
        .document(DocumentType::LetterOfCredit)
        .blocking(true)
}

fn warning(rule: &str, title: &str) -> lcx_core::IssueBuilder {
    Issue::builder(rule, title, Severity::Info, IssueSource::Gate).document(DocumentType::LetterOfCredit)
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

impl ValidationGate {
    /// Gate with the given thresholds.
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Check a baseline. Completeness figures default to the baseline's own.
    pub fn check(
        &self,
        baseline: &LcBaseline,
        completeness: Option<f64>,
        critical_completeness: Option<f64>,
    ) -> GateResult {
        let completeness = sanitize(completeness.unwrap_or_else(|| baseline.extraction_completeness()));
        let critical_completeness =
            sanitize(critical_completeness.unwrap_or_else(|| baseline.critical_completeness()));

        let mut blocking = Vec::new();
        let mut warnings = Vec::new();

        if !baseline.is_present(LcField::LcNumber) {
            blocking.push(
                blocker("LC-GATE-NUMBER", "LC Number Not Extracted")
                    .field(LcField::LcNumber.name())
                    .message("The documentary credit number could not be extracted. Examination cannot identify the credit.")
                    .expected("Documentary credit number (MT700 field 20)")
                    .actual("Not found")
                    .suggestion("Re-run extraction or enter the LC number manually.")
                    .ucp("UCP600 Article 6")
                    .build(),
            );
        }

        if !baseline.is_present(LcField::Amount) {
            blocking.push(
                blocker("LC-GATE-AMOUNT", "LC Amount Not Extracted")
                    .field(LcField::Amount.name())
                    .message("The credit amount could not be extracted. Drawings cannot be checked without it.")
                    .expected("Currency and amount (MT700 field 32B)")
                    .actual("Not found")
                    .suggestion("Re-run extraction or enter the credit amount manually.")
                    .ucp("UCP600 Article 18(b)")
                    .build(),
            );
        }

        let applicant = baseline.is_present(LcField::Applicant);
        let beneficiary = baseline.is_present(LcField::Beneficiary);
        match (applicant, beneficiary) {
            (false, false) => blocking.push(
                blocker("LC-GATE-PARTIES", "LC Parties Not Extracted")
                    .message("Neither the applicant nor the beneficiary could be extracted.")
                    .expected("Applicant (field 50) and beneficiary (field 59)")
                    .actual("Both missing")
                    .suggestion("Re-run extraction or enter the parties manually.")
                    .ucp("UCP600 Article 2")
                    .build(),
            ),
            (false, true) => warnings.push(
                warning("LC-GATE-APPLICANT", "Applicant Not Extracted")
                    .field(LcField::Applicant.name())
                    .message("The applicant could not be extracted; party checks against it will be skipped.")
                    .expected("Applicant (field 50)")
                    .actual("Not found")
                    .suggestion("Confirm the applicant manually.")
                    .build(),
            ),
            (true, false) => warnings.push(
                warning("LC-GATE-BENEFICIARY", "Beneficiary Not Extracted")
                    .field(LcField::Beneficiary.name())
                    .message("The beneficiary could not be extracted; issuer checks against it will be skipped.")
                    .expected("Beneficiary (field 59)")
                    .actual("Not found")
                    .suggestion("Confirm the beneficiary manually.")
                    .build(),
            ),
            (true, true) => {}
        }

        if critical_completeness < self.config.min_critical_completeness {
            blocking.push(
                blocker("LC-GATE-CRITICAL-COMPLETENESS", "Critical Fields Incomplete")
                    .message(format!(
                        "Only {} of critical LC fields were extracted.",
                        percent(critical_completeness)
                    ))
                    .expected(format!(">= {}", percent(self.config.min_critical_completeness)))
                    .actual(percent(critical_completeness))
                    .suggestion("Provide a clearer copy of the credit or complete the critical fields manually.")
                    .build(),
            );
        }

        if completeness < self.config.min_completeness {
            blocking.push(
                blocker("LC-GATE-COMPLETENESS", "Extraction Incomplete")
                    .message(format!(
                        "Extraction completeness {} is below the minimum required to examine.",
                        percent(completeness)
                    ))
                    .expected(format!(">= {}", percent(self.config.min_completeness)))
                    .actual(percent(completeness))
                    .suggestion("Provide a clearer copy of the credit.")
                    .build(),
            );
        } else if completeness < self.config.warn_completeness {
            warnings.push(
                warning("LC-GATE-COMPLETENESS-LOW", "Extraction Completeness Low")
                    .message(format!(
                        "Extraction completeness {} is low; some checks will not run.",
                        percent(completeness)
                    ))
                    .expected(format!(">= {}", percent(self.config.warn_completeness)))
                    .actual(percent(completeness))
                    .suggestion("Review the extracted fields before relying on the result.")
                    .build(),
            );
        }

        let status = if !blocking.is_empty() {
            GateStatus::Blocked
        } else if !warnings.is_empty() {
            GateStatus::Warning
        } else {
            GateStatus::Passed
        };
        let block_reason = blocking.first().map(|i| i.title().to_string());

        tracing::debug!(
            status = %status,
            completeness,
            critical_completeness,
            blocking = blocking.len(),
            warnings = warnings.len(),
            "gate checked"
        );

        GateResult {
            status,
            can_proceed: status != GateStatus::Blocked,
            block_reason,
            completeness,
            critical_completeness,
            missing_critical: baseline.missing_critical(),
            missing_required: baseline.missing_required(),
            blocking_issues: blocking,
            warnings,
        }
    }
}

/// NaN counts as nothing extracted.
fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> lcx_core::LcBaselineBuilder {
        LcBaseline::builder()
            .extracted(LcField::LcNumber, "LC-2026-00417", 0.95)
            .extracted(LcField::Amount, "100000", 0.95)
            .extracted(LcField::Currency, "USD", 0.95)
            .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
            .extracted(LcField::Applicant, "Nordsee Textilhandel GmbH", 0.9)
            .extracted(LcField::Beneficiary, "Dhaka Knitwear Mfg. Co. Ltd.", 0.9)
            .extracted(LcField::LatestShipmentDate, "2026-03-15", 0.9)
            .extracted(LcField::PortOfLoading, "Chittagong", 0.9)
            .extracted(LcField::PortOfDischarge, "Hamburg", 0.9)
            .extracted(LcField::GoodsDescription, "Cotton T-shirts", 0.9)
    }

    fn rule_ids(issues: &[Issue]) -> Vec<String> {
        issues.iter().map(|i| i.rule().to_string()).collect()
    }

    #[test]
    fn complete_baseline_passes() {
        let result = ValidationGate::default().check(&full().build(), None, None);
        assert_eq!(result.status, GateStatus::Passed);
        assert!(result.can_proceed);
        assert!(result.block_reason.is_none());
        assert!(result.issues().is_empty());
    }

    #[test]
    fn missing_number_and_amount_block_with_two_issues() {
        let baseline = LcBaseline::builder()
            .extracted(LcField::Currency, "USD", 0.95)
            .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
            .extracted(LcField::Applicant, "Nordsee Textilhandel GmbH", 0.9)
            .extracted(LcField::Beneficiary, "Dhaka Knitwear", 0.9)
            .extracted(LcField::LatestShipmentDate, "2026-03-15", 0.9)
            .extracted(LcField::PortOfLoading, "Chittagong", 0.9)
            .extracted(LcField::PortOfDischarge, "Hamburg", 0.9)
            .extracted(LcField::GoodsDescription, "Cotton T-shirts", 0.9)
            .build();
        let result = ValidationGate::default().check(&baseline, None, None);
        assert_eq!(result.status, GateStatus::Blocked);
        assert!(!result.can_proceed);
        assert_eq!(rule_ids(&result.blocking_issues), vec!["LC-GATE-NUMBER", "LC-GATE-AMOUNT"]);
        assert!(result
            .blocking_issues
            .iter()
            .all(|i| i.severity() == Severity::Critical && i.blocks_validation()));
        assert_eq!(result.block_reason.as_deref(), Some("LC Number Not Extracted"));
        assert_eq!(result.missing_critical, vec!["lc_number", "amount"]);
    }

    #[test]
    fn one_missing_party_is_a_warning() {
        let baseline = LcBaseline::builder()
            .extracted(LcField::LcNumber, "LC-1", 0.95)
            .extracted(LcField::Amount, "100", 0.95)
            .extracted(LcField::Currency, "USD", 0.95)
            .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
            .extracted(LcField::Beneficiary, "Dhaka Knitwear", 0.9)
            .extracted(LcField::LatestShipmentDate, "2026-03-15", 0.9)
            .extracted(LcField::PortOfLoading, "Chittagong", 0.9)
            .extracted(LcField::PortOfDischarge, "Hamburg", 0.9)
            .extracted(LcField::GoodsDescription, "Cotton T-shirts", 0.9)
            .build();
        let result = ValidationGate::default().check(&baseline, None, None);
        assert_eq!(result.status, GateStatus::Warning);
        assert!(result.can_proceed);
        assert_eq!(rule_ids(&result.warnings), vec!["LC-GATE-APPLICANT"]);
        assert_eq!(result.warnings[0].severity(), Severity::Info);
        assert!(!result.warnings[0].blocks_validation());
    }

    #[test]
    fn both_parties_missing_blocks() {
        let baseline = LcBaseline::builder()
            .extracted(LcField::LcNumber, "LC-1", 0.95)
            .extracted(LcField::Amount, "100", 0.95)
            .extracted(LcField::Currency, "USD", 0.95)
            .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
            .build();
        let result = ValidationGate::default().check(&baseline, None, None);
        assert_eq!(result.status, GateStatus::Blocked);
        assert!(rule_ids(&result.blocking_issues).contains(&"LC-GATE-PARTIES".to_string()));
    }

    #[test]
    fn completeness_overrides_apply() {
        let baseline = full().build();
        let gate = ValidationGate::default();

        let low_critical = gate.check(&baseline, None, Some(0.25));
        assert_eq!(
            rule_ids(&low_critical.blocking_issues),
            vec!["LC-GATE-CRITICAL-COMPLETENESS"]
        );

        let very_low = gate.check(&baseline, Some(0.2), None);
        assert_eq!(rule_ids(&very_low.blocking_issues), vec!["LC-GATE-COMPLETENESS"]);

        let low = gate.check(&baseline, Some(0.5), None);
        assert_eq!(low.status, GateStatus::Warning);
        assert_eq!(rule_ids(&low.warnings), vec!["LC-GATE-COMPLETENESS-LOW"]);
    }

    #[test]
    fn nan_completeness_is_treated_as_zero() {
        let result = ValidationGate::default().check(&full().build(), Some(f64::NAN), Some(f64::NAN));
        assert_eq!(result.status, GateStatus::Blocked);
        assert_eq!(result.completeness, 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn low_critical_completeness_always_blocks(
            critical in 0.0f64..0.5,
            completeness in 0.0f64..=1.0,
        ) {
            let baseline = LcBaseline::builder()
                .extracted(LcField::LcNumber, "LC-1", 0.9)
                .extracted(LcField::Amount, "100", 0.9)
                .build();
            let result = ValidationGate::default().check(&baseline, Some(completeness), Some(critical));
            prop_assert_eq!(result.status, GateStatus::Blocked);
            prop_assert!(!result.can_proceed);
        }

        #[test]
        fn blocked_iff_blocking_issues(critical in 0.0f64..=1.0, completeness in 0.0f64..=1.0) {
            let baseline = LcBaseline::builder()
                .extracted(LcField::LcNumber, "LC-1", 0.9)
                .extracted(LcField::Amount, "100", 0.9)
                .extracted(LcField::Applicant, "A", 0.9)
                .build();
            let result = ValidationGate::default().check(&baseline, Some(completeness), Some(critical));
            prop_assert_eq!(result.status == GateStatus::Blocked, !result.blocking_issues.is_empty());
        }
    }
}
