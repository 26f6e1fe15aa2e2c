//! # Issue Engine
//!
//! Turns extraction gaps and rule-engine violations into [`Issue`]s. Pure
//! transform: no I/O, and the same inputs always produce the same issues in
//! the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lcx_core::confidence::{is_low, weigh};
use lcx_core::{
    counts_by_source, DocumentType, FieldStatus, Issue, IssueSource, LcBaseline, LcField, Severity,
    SeverityCounts, LOW_CONFIDENCE_THRESHOLD,
};
use lcx_rules::{RuleContext, RuleDomain, RuleEngine, RuleReport, RuleViolation};

use crate::field_descriptions::describe;

/// Issue engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueEngineConfig {
    /// Confidence under which findings about a field are escalated.
    pub low_confidence_threshold: f64,
}

impl Default for IssueEngineConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Issues from extraction and the rule engine, with tallies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueEngineResult {
    /// Extraction issues first, then rule violations in rule-id order.
    pub issues: Vec<Issue>,
    /// Tally by severity.
    pub counts_by_severity: SeverityCounts,
    /// Tally by producing stage.
    pub counts_by_source: BTreeMap<IssueSource, usize>,
    /// Any issue has `blocks_validation` set.
    pub has_blocking_issues: bool,
    /// Rule engine execution record. Empty when no engine is configured.
    pub rule_report: RuleReport,
}

/// Generates extraction and rule issues.
#[derive(Debug, Clone, Default)]
pub struct IssueEngine {
    config: IssueEngineConfig,
    rules: Option<RuleEngine>,
}

impl IssueEngine {
    /// Engine over an optional rule set.
    pub fn new(config: IssueEngineConfig, rules: Option<RuleEngine>) -> Self {
        Self { config, rules }
    }

    /// The loaded rule set, if any.
    pub fn rules(&self) -> Option<&RuleEngine> {
        self.rules.as_ref()
    }

    /// One issue per missing, invalid, partial or low-confidence field.
    pub fn generate_extraction_issues(&self, baseline: &LcBaseline) -> Vec<Issue> {
        baseline
            .fields()
            .filter_map(|(field, result)| {
                let threshold = self.config.low_confidence_threshold;
                let confidence = result.confidence();
                let priority = field.priority();
                let desc = describe(field);
                let code = field.name().to_uppercase();

                let builder = match result.status() {
                    FieldStatus::Invalid => {
                        let raw = result.raw_value().unwrap_or_default();
                        Issue::builder(
                            format!("EXTRACT-{code}-INVALID"),
                            format!("{} Unparseable", desc.name),
                            weigh(Severity::Major, priority, confidence, threshold),
                            IssueSource::Extraction,
                        )
                        .message(format!(
                            "The extracted {} \"{raw}\" is unparseable.",
                            desc.name.to_lowercase()
                        ))
                        .actual(raw)
                        .suggestion(format!("Correct the {} (field {}).", desc.name, desc.swift_tag))
                    }
                    _ if !result.is_present() => {
                        // Confidence of an absent value carries no information.
                        let severity = priority.missing_severity()?;
                        Issue::builder(
                            format!("EXTRACT-{code}-MISSING"),
                            format!("{} Missing", desc.name),
                            severity,
                            IssueSource::Extraction,
                        )
                        .message(format!("The {} could not be extracted from the credit.", desc.name))
                        .actual("Not found")
                        .suggestion(format!(
                            "Re-run extraction or enter the {} (field {}) manually.",
                            desc.name, desc.swift_tag
                        ))
                        .blocking(severity == Severity::Critical)
                    }
                    FieldStatus::Partial => {
                        let value = result.value().unwrap_or_default();
                        Issue::builder(
                            format!("EXTRACT-{code}-PARTIAL"),
                            format!("{} Partially Extracted", desc.name),
                            weigh(Severity::Minor, priority, confidence, threshold),
                            IssueSource::Extraction,
                        )
                        .message(format!("Only part of the {} was extracted.", desc.name))
                        .actual(value)
                        .suggestion(format!("Verify the {} against the credit.", desc.name))
                    }
                    _ if is_low(confidence, threshold) => {
                        let value = result.value().unwrap_or_default();
                        Issue::builder(
                            format!("EXTRACT-{code}-LOWCONF"),
                            format!("{} Low Confidence", desc.name),
                            weigh(Severity::Info, priority, confidence, threshold),
                            IssueSource::Extraction,
                        )
                        .message(format!(
                            "The {} was extracted with confidence {:.2}.",
                            desc.name, confidence
                        ))
                        .actual(value)
                        .suggestion(format!("Confirm the {} manually.", desc.name))
                    }
                    _ => return None,
                };

                let builder = builder
                    .field(field.name())
                    .expected(desc.expected())
                    .document(DocumentType::LetterOfCredit);
                let builder = match desc.ucp_reference {
                    Some(reference) => builder.ucp(reference),
                    None => builder,
                };
                Some(builder.build())
            })
            .collect()
    }

    /// Extraction issues plus rule violations, tallied.
    pub fn generate_all_issues(
        &self,
        baseline: &LcBaseline,
        ctx: &RuleContext,
        categories: Option<&[RuleDomain]>,
    ) -> IssueEngineResult {
        let mut issues = self.generate_extraction_issues(baseline);
        let rule_report = match &self.rules {
            Some(engine) => engine.execute(ctx, categories),
            None => RuleReport::default(),
        };
        issues.extend(rule_report.violations.iter().map(violation_issue));

        let counts_by_severity = SeverityCounts::from_issues(&issues);
        let counts_by_source = counts_by_source(&issues);
        let has_blocking_issues = issues.iter().any(Issue::blocks_validation);
        tracing::debug!(
            issues = issues.len(),
            critical = counts_by_severity.critical,
            rules_executed = rule_report.executed(),
            "issues generated"
        );
        IssueEngineResult {
            issues,
            counts_by_severity,
            counts_by_source,
            has_blocking_issues,
            rule_report,
        }
    }
}

/// Convert one rule violation into an issue.
pub fn violation_issue(violation: &RuleViolation) -> Issue {
    let mut builder = Issue::builder(
        violation.rule_id.as_str(),
        violation.title.as_str(),
        violation.severity.to_severity(),
        violation.domain.issue_source(),
    )
    .message(violation.message.as_str())
    .expected(violation.expected.as_str())
    .actual(violation.actual.as_str())
    .suggestion(violation.suggestion.as_str())
    .documents(&violation.documents);
    if let Some(reference) = &violation.ucp_reference {
        builder = builder.ucp(reference.as_str());
    }
    if let Some(reference) = &violation.isbp_reference {
        builder = builder.isbp(reference.as_str());
    }
    builder.build()
}

/// Field for an `EXTRACT-<FIELD>-...` rule id.
pub fn extraction_field(rule: &str) -> Option<LcField> {
    let code = rule.strip_prefix("EXTRACT-")?;
    let (name, _) = code.rsplit_once('-')?;
    LcField::from_name(&name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lcx_rules::RuleSeverity;

    fn rule_ids(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(Issue::rule).collect()
    }

    #[test]
    fn complete_confident_baseline_has_no_issues() {
        let mut builder = LcBaseline::builder();
        for &field in LcField::all() {
            builder = builder.extracted(field, "X", 0.9);
        }
        assert!(IssueEngine::default().generate_extraction_issues(&builder.build()).is_empty());
    }

    #[test]
    fn missing_severity_follows_priority() {
        let baseline = LcBaseline::builder().build();
        let issues = IssueEngine::default().generate_extraction_issues(&baseline);
        let by_rule: BTreeMap<&str, &Issue> = issues.iter().map(|i| (i.rule(), i)).collect();

        let number = by_rule["EXTRACT-LC_NUMBER-MISSING"];
        assert_eq!(number.severity(), Severity::Critical);
        assert!(number.blocks_validation());
        assert_eq!(number.expected(), "Documentary credit number (MT700 field 20)");

        assert_eq!(by_rule["EXTRACT-APPLICANT-MISSING"].severity(), Severity::Major);
        assert!(!by_rule["EXTRACT-APPLICANT-MISSING"].blocks_validation());
        assert_eq!(by_rule["EXTRACT-INCOTERM-MISSING"].severity(), Severity::Minor);
        assert!(!by_rule.contains_key("EXTRACT-ADVISING_BANK-MISSING"));
        assert_eq!(issues.len(), 13);
    }

    #[test]
    fn invalid_field_is_major_and_unparseable() {
        let mut builder = LcBaseline::builder();
        for &field in LcField::all() {
            builder = builder.extracted(field, "X", 0.9);
        }
        let baseline = builder.invalid(LcField::LatestShipmentDate, "31/31/2026", 0.8).build();
        let issues = IssueEngine::default().generate_extraction_issues(&baseline);
        assert_eq!(rule_ids(&issues), vec!["EXTRACT-LATEST_SHIPMENT_DATE-INVALID"]);
        assert_eq!(issues[0].severity(), Severity::Major);
        assert!(issues[0].message().contains("unparseable"));
        assert_eq!(issues[0].actual(), "31/31/2026");
    }

    #[test]
    fn partial_is_minor_and_low_confidence_escalates() {
        let mut builder = LcBaseline::builder();
        for &field in LcField::all() {
            builder = builder.extracted(field, "X", 0.9);
        }
        let baseline = builder
            .partial(LcField::GoodsDescription, "Cotton", 0.8)
            .extracted(LcField::Currency, "USD", 0.1)
            .extracted(LcField::IssueDate, "2026-01-10", 0.2)
            .build();
        let issues = IssueEngine::default().generate_extraction_issues(&baseline);
        let by_rule: BTreeMap<&str, &Issue> = issues.iter().map(|i| (i.rule(), i)).collect();
        assert_eq!(by_rule["EXTRACT-GOODS_DESCRIPTION-PARTIAL"].severity(), Severity::Minor);
        assert_eq!(by_rule["EXTRACT-CURRENCY-LOWCONF"].severity(), Severity::Critical);
        assert_eq!(by_rule["EXTRACT-ISSUE_DATE-LOWCONF"].severity(), Severity::Minor);
    }

    #[test]
    fn violations_map_severity_and_source() {
        let violation = RuleViolation {
            rule_id: "BANK-001".into(),
            title: "Bank Overlay".into(),
            domain: RuleDomain::Crossdoc,
            severity: RuleSeverity::Warning,
            message: "m".into(),
            expected: "e".into(),
            actual: "a".into(),
            suggestion: "s".into(),
            ucp_reference: Some("UCP600 Article 14".into()),
            isbp_reference: None,
            documents: vec![DocumentType::Invoice],
        };
        let issue = violation_issue(&violation);
        assert_eq!(issue.severity(), Severity::Major);
        assert_eq!(issue.source(), IssueSource::Crossdoc);
        assert_eq!(issue.ucp_reference(), Some("UCP600 Article 14"));
        assert_eq!(issue.documents(), &[DocumentType::Invoice]);
    }

    #[test]
    fn all_issues_include_rule_violations() {
        let mut builder = LcBaseline::builder();
        for &field in LcField::all() {
            builder = builder.extracted(field, "X", 0.9);
        }
        let baseline = builder
            .extracted(LcField::IssueDate, "2026-02-01", 0.9)
            .extracted(LcField::ExpiryDate, "2026-01-01", 0.9)
            .build();
        let engine = IssueEngine::new(
            IssueEngineConfig::default(),
            Some(RuleEngine::builtin().expect("builtin packs load")),
        );
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
        let ctx = RuleContext::from_baseline(&baseline, today);
        let result = engine.generate_all_issues(&baseline, &ctx, Some(&[RuleDomain::Ucp600]));
        assert!(rule_ids(&result.issues).contains(&"UCP600-ART6-EXPIRY-AFTER-ISSUE"));
        assert_eq!(result.counts_by_source.get(&IssueSource::Rule).copied().unwrap_or(0), result.issues.len());
        assert!(!result.has_blocking_issues);
        assert!(result.rule_report.executed() > 0);
    }

    #[test]
    fn extraction_rule_ids_map_back_to_fields() {
        assert_eq!(extraction_field("EXTRACT-LC_NUMBER-MISSING"), Some(LcField::LcNumber));
        assert_eq!(extraction_field("EXTRACT-PORT_OF_LOADING-LOWCONF"), Some(LcField::PortOfLoading));
        assert_eq!(extraction_field("CROSSDOC-INV-001"), None);
    }
}
