//! # Cross-Document Validator
//!
//! Runs every applicable rule of [`crate::rules::FAMILIES`] against one
//! presentation and aggregates the findings.
//!
//! ## Dispatch
//!
//! - Nothing presented: no rule executes.
//! - A rule whose required documents are missing is skipped.
//! - Each check runs inside `catch_unwind`. A returned [`RuleFault`] or a
//!   panic becomes a faulted execution plus a MINOR "Rule Execution Fault"
//!   issue, and the remaining rules still run.
//!
//! The validator holds only read-only configuration and matchers; one
//! instance may be shared across threads.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::NaiveDate;
use lcx_core::{Issue, IssueSource, LcBaseline, Severity, SeverityCounts};
use lcx_match::{GoodsMatcher, MatchingConfig, PartyMatcher, PortMatcher, PortRegistry, StaticPortRegistry};
use serde::{Deserialize, Serialize};

use crate::config::CrossDocConfig;
use crate::document::SupportingDocuments;
use crate::error::RuleFault;
use crate::rules::{all_rules, Check, CheckContext, RuleSpec};

/// Outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Documents consistent.
    Passed,
    /// Discrepancy found.
    Failed,
    /// Not applicable or not checkable.
    Skipped,
    /// The rule could not reach a verdict.
    Faulted,
}

/// Audit record of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleExecution {
    /// Rule id.
    pub rule_id: String,
    /// Document pair key, e.g. `invoice/letter_of_credit`.
    pub pair: String,
    /// Outcome.
    pub status: ExecutionStatus,
    /// Skip reason or fault description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate result of a cross-document run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossDocResult {
    /// Findings in rule order.
    pub issues: Vec<Issue>,
    /// Rules that ran (passed, failed or faulted).
    pub rules_executed: usize,
    /// Rules that passed.
    pub rules_passed: usize,
    /// Rules skipped.
    pub rules_skipped: usize,
    /// Rules that faulted.
    pub rules_faulted: usize,
    /// Issue counts.
    pub counts_by_severity: SeverityCounts,
    /// Issues grouped by document pair key.
    pub issues_by_document_pair: BTreeMap<String, Vec<Issue>>,
    /// Per-rule outcomes.
    pub executions: Vec<RuleExecution>,
}

impl CrossDocResult {
    /// Rules that failed.
    pub fn rules_failed(&self) -> usize {
        self.rules_executed - self.rules_passed - self.rules_faulted
    }

    /// Passed over executed; `None` when nothing executed.
    pub fn pass_rate(&self) -> Option<f64> {
        (self.rules_executed > 0).then(|| self.rules_passed as f64 / self.rules_executed as f64)
    }

    fn record(&mut self, rule: &RuleSpec, status: ExecutionStatus, detail: Option<String>) {
        match status {
            ExecutionStatus::Passed => {
                self.rules_executed += 1;
                self.rules_passed += 1;
            }
            ExecutionStatus::Failed => self.rules_executed += 1,
            ExecutionStatus::Faulted => {
                self.rules_executed += 1;
                self.rules_faulted += 1;
            }
            ExecutionStatus::Skipped => self.rules_skipped += 1,
        }
        self.executions.push(RuleExecution {
            rule_id: rule.id.to_string(),
            pair: rule.pair_key(),
            status,
            detail,
        });
    }

    fn push_issue(&mut self, rule: &RuleSpec, issue: Issue) {
        self.counts_by_severity.record(issue.severity());
        self.issues_by_document_pair
            .entry(rule.pair_key())
            .or_default()
            .push(issue.clone());
        self.issues.push(issue);
    }
}

/// Validates supporting documents against the LC and each other.
#[derive(Debug, Clone)]
pub struct CrossDocValidator {
    config: CrossDocConfig,
    party: PartyMatcher,
    ports: PortMatcher,
    goods: GoodsMatcher,
}

impl Default for CrossDocValidator {
    fn default() -> Self {
        Self::new(
            CrossDocConfig::default(),
            MatchingConfig::default(),
            Arc::new(StaticPortRegistry),
        )
    }
}

impl CrossDocValidator {
    /// Create a validator over a shared port registry.
    pub fn new(config: CrossDocConfig, matching: MatchingConfig, registry: Arc<dyn PortRegistry>) -> Self {
        Self {
            config,
            party: PartyMatcher::new(matching.clone()),
            ports: PortMatcher::new(registry),
            goods: GoodsMatcher::new(matching),
        }
    }

    /// Thresholds in force.
    pub fn config(&self) -> &CrossDocConfig {
        &self.config
    }

    /// Run every rule.
    pub fn validate_all(
        &self,
        baseline: &LcBaseline,
        documents: &SupportingDocuments,
        today: NaiveDate,
    ) -> CrossDocResult {
        self.dispatch(all_rules(), baseline, documents, today)
    }

    pub(crate) fn dispatch<'r>(
        &self,
        rules: impl Iterator<Item = &'r RuleSpec>,
        baseline: &LcBaseline,
        documents: &SupportingDocuments,
        today: NaiveDate,
    ) -> CrossDocResult {
        let mut result = CrossDocResult::default();
        if documents.is_empty() {
            tracing::debug!("no supporting documents presented, cross-document rules not run");
            return result;
        }
        let ctx = CheckContext {
            baseline,
            documents,
            today,
            config: &self.config,
            party: &self.party,
            ports: &self.ports,
            goods: &self.goods,
        };
        for rule in rules {
            if let Some(kind) = rule.requires.iter().find(|k| documents.get(**k).is_none()) {
                tracing::debug!(rule_id = %rule.id, missing = %kind.as_str(), "rule skipped");
                result.record(rule, ExecutionStatus::Skipped, Some(format!("{} not presented", kind.display_name())));
                continue;
            }
            match run_guarded(rule, &ctx) {
                Ok(Check::Pass) => result.record(rule, ExecutionStatus::Passed, None),
                Ok(Check::Fail(issue)) => {
                    tracing::debug!(rule_id = %rule.id, severity = %issue.severity().as_str(), "rule failed");
                    result.record(rule, ExecutionStatus::Failed, None);
                    result.push_issue(rule, issue);
                }
                Ok(Check::Skip(reason)) => {
                    tracing::debug!(rule_id = %rule.id, reason, "rule skipped");
                    result.record(rule, ExecutionStatus::Skipped, Some(reason.to_string()));
                }
                Err(fault) => {
                    tracing::error!(rule_id = %rule.id, error = %fault, "cross-document rule faulted");
                    result.record(rule, ExecutionStatus::Faulted, Some(fault.to_string()));
                    result.push_issue(rule, fault_issue(rule, &fault));
                }
            }
        }
        tracing::info!(
            executed = result.rules_executed,
            passed = result.rules_passed,
            skipped = result.rules_skipped,
            faulted = result.rules_faulted,
            issues = result.issues.len(),
            "cross-document validation complete"
        );
        result
    }
}

fn run_guarded(rule: &RuleSpec, ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    match panic::catch_unwind(AssertUnwindSafe(|| (rule.check)(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(RuleFault::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn fault_issue(rule: &RuleSpec, fault: &RuleFault) -> Issue {
    Issue::builder(rule.id, "Rule Execution Fault", Severity::Minor, IssueSource::Crossdoc)
        .documents(&[rule.pair.0, rule.pair.1])
        .message(format!("Rule {} ({}) could not be evaluated: {fault}", rule.id, rule.title))
        .expected("Rule evaluates to a verdict")
        .actual(fault.to_string())
        .suggestion("Review the document data for this check manually; the remaining checks were applied.")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SupportingDocument;
    use crate::rules::fixtures::{baseline, date};
    use lcx_core::DocumentType;
    use proptest::prelude::*;

    fn invoice(amount: &str) -> SupportingDocument {
        SupportingDocument::new()
            .with("amount", amount)
            .with("seller", "Dhaka Knitwear Manufacturing Co. Ltd")
            .with("goods_description", "Cotton knitted T-shirts HS 6109.10.00")
            .with("invoice_date", "2026-02-18")
            .with("lc_number", "LC2026-00417")
    }

    #[test]
    fn empty_presentation_runs_nothing() {
        let result = CrossDocValidator::default().validate_all(
            &baseline(),
            &SupportingDocuments::none(),
            date(2026, 3, 1),
        );
        assert_eq!(result.rules_executed, 0);
        assert!(result.executions.is_empty());
        assert_eq!(result.pass_rate(), None);
    }

    #[test]
    fn invoice_only_presentation_skips_other_families() {
        let docs = SupportingDocuments::none().with(DocumentType::Invoice, invoice("USD 100,000.00"));
        let result = CrossDocValidator::default().validate_all(&baseline(), &docs, date(2026, 3, 1));
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.rules_failed(), 0);
        let bl = result
            .executions
            .iter()
            .find(|e| e.rule_id == "CROSSDOC-BL-003")
            .unwrap();
        assert_eq!(bl.status, ExecutionStatus::Skipped);
        assert_eq!(bl.detail.as_deref(), Some("Bill of Lading not presented"));
        assert_eq!(result.pass_rate(), Some(1.0));
    }

    #[test]
    fn over_drawn_invoice_is_grouped_by_pair() {
        let docs = SupportingDocuments::none().with(DocumentType::Invoice, invoice("USD 106,000.00"));
        let result = CrossDocValidator::default().validate_all(&baseline(), &docs, date(2026, 3, 1));
        assert_eq!(result.counts_by_severity.critical, 1);
        assert_eq!(result.issues[0].rule(), "CROSSDOC-INV-001");
        assert_eq!(result.issues_by_document_pair["invoice/letter_of_credit"].len(), 1);
    }

    fn exploding(_: &CheckContext<'_>) -> Result<Check, RuleFault> {
        panic!("index out of range")
    }

    fn faulty(_: &CheckContext<'_>) -> Result<Check, RuleFault> {
        Err(RuleFault::UnexpectedInput {
            field: "invoice.amount".into(),
            message: "nested object".into(),
        })
    }

    fn passing(_: &CheckContext<'_>) -> Result<Check, RuleFault> {
        Ok(Check::Pass)
    }

    const TEST_RULES: &[RuleSpec] = &[
        RuleSpec {
            id: "TEST-PANIC",
            title: "Panics",
            pair: (DocumentType::Invoice, DocumentType::LetterOfCredit),
            requires: &[],
            check: exploding,
        },
        RuleSpec {
            id: "TEST-FAULT",
            title: "Faults",
            pair: (DocumentType::Invoice, DocumentType::LetterOfCredit),
            requires: &[],
            check: faulty,
        },
        RuleSpec {
            id: "TEST-PASS",
            title: "Passes",
            pair: (DocumentType::Invoice, DocumentType::LetterOfCredit),
            requires: &[],
            check: passing,
        },
    ];

    #[test]
    fn faults_are_contained() {
        let docs = SupportingDocuments::none().with(DocumentType::Invoice, invoice("USD 1.00"));
        let result = CrossDocValidator::default().dispatch(TEST_RULES.iter(), &baseline(), &docs, date(2026, 3, 1));
        assert_eq!(result.rules_executed, 3);
        assert_eq!(result.rules_faulted, 2);
        assert_eq!(result.rules_passed, 1);
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues.iter().all(|i| i.severity() == Severity::Minor));
        assert!(result.issues[0].message().contains("index out of range"));
        assert!(result.issues[1].actual().contains("invoice.amount"));
        assert_eq!(result.executions[0].status, ExecutionStatus::Faulted);
    }

    fn discrepant() -> SupportingDocuments {
        SupportingDocuments::none()
            .with(DocumentType::Invoice, invoice("USD 106,000.00"))
            .with(
                DocumentType::BillOfLading,
                SupportingDocument::new()
                    .with("port_of_loading", "Chattogram")
                    .with("shipment_date", "2026-03-16")
                    .with("bl_type", "RECEIVED FOR SHIPMENT"),
            )
            .with(
                DocumentType::Insurance,
                SupportingDocument::new()
                    .with("insured_amount", "USD 105,000.00")
                    .with("currency", "USD"),
            )
    }

    fn by_rule(result: &CrossDocResult) -> (Vec<RuleExecution>, Vec<Issue>) {
        let mut executions = result.executions.clone();
        executions.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
        let mut issues = result.issues.clone();
        issues.sort_by(|a, b| a.id().cmp(b.id()));
        (executions, issues)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn rule_order_does_not_change_verdicts(
            order in Just(all_rules().collect::<Vec<_>>()).prop_shuffle()
        ) {
            let validator = CrossDocValidator::default();
            let docs = discrepant();
            let reference = validator.validate_all(&baseline(), &docs, date(2026, 3, 1));
            let shuffled = validator.dispatch(order.into_iter(), &baseline(), &docs, date(2026, 3, 1));
            prop_assert!(reference.rules_executed > reference.rules_passed);
            prop_assert_eq!(by_rule(&shuffled), by_rule(&reference));
            prop_assert_eq!(shuffled.counts_by_severity, reference.counts_by_severity);
            prop_assert_eq!(shuffled.rules_passed, reference.rules_passed);
            prop_assert_eq!(shuffled.rules_skipped, reference.rules_skipped);
        }
    }

    #[test]
    fn validation_is_deterministic() {
        let docs = SupportingDocuments::none().with(DocumentType::Invoice, invoice("USD 106,000.00"));
        let v = CrossDocValidator::default();
        let a = v.validate_all(&baseline(), &docs, date(2026, 3, 1));
        let b = v.validate_all(&baseline(), &docs, date(2026, 3, 1));
        assert_eq!(a, b);
    }
}
