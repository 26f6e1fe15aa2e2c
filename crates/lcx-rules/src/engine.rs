//! # Rule Engine
//!
//! Compiles packs once and executes the effective rule set against a
//! [`RuleContext`].
//!
//! ## Determinism
//!
//! The effective rule set is a `BTreeMap` keyed by rule id, so execution
//! order is the lexicographic id order regardless of pack file order. Rule
//! evaluation is pure: the same context gives the same report.
//!
//! ## Layering
//!
//! Packs are applied in tier order (`core`, `extended`, `bank`; stable
//! within a tier). A rule id defined again at a later position replaces
//! the earlier definition; a definition with `enabled: false` removes it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use lcx_core::DocumentType;

use crate::context::RuleContext;
use crate::error::{EvalError, RuleLoadError};
use crate::expr::CompiledExpr;
use crate::pack::{PackTier, RulePack};
use crate::registry::{self, HandlerSpec, Params, Verdict};
use crate::rule::{CheckSpec, RuleDefinition, RuleDomain, RuleSeverity};

#[derive(Debug, Clone)]
enum CompiledCheck {
    Expression(CompiledExpr),
    Handler {
        spec: &'static HandlerSpec,
        params: Params,
    },
}

/// A rule ready to run.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    definition: RuleDefinition,
    pack_id: String,
    tier: PackTier,
    guard: Option<CompiledExpr>,
    check: CompiledCheck,
}

impl CompiledRule {
    fn compile(definition: RuleDefinition, pack: &RulePack) -> Result<Self, RuleLoadError> {
        let compile = |source: &str| {
            CompiledExpr::compile(source).map_err(|source| RuleLoadError::Compile {
                rule_id: definition.id.clone(),
                source,
            })
        };
        let guard = definition.applies_when.as_deref().map(compile).transpose()?;
        let check = match &definition.check {
            CheckSpec::Expression(source) => CompiledCheck::Expression(compile(source)?),
            CheckSpec::Handler(call) => {
                let spec =
                    registry::handler(&call.name).ok_or_else(|| RuleLoadError::UnknownHandler {
                        rule_id: definition.id.clone(),
                        handler: call.name.clone(),
                    })?;
                spec.check_params(&call.params)
                    .map_err(|message| RuleLoadError::InvalidParams {
                        rule_id: definition.id.clone(),
                        handler: call.name.clone(),
                        message,
                    })?;
                CompiledCheck::Handler {
                    spec,
                    params: call.params.clone(),
                }
            }
        };
        Ok(Self {
            definition,
            pack_id: pack.pack_id.clone(),
            tier: pack.tier,
            guard,
            check,
        })
    }

    /// Rule definition as loaded.
    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// Pack that supplied the effective definition.
    pub fn pack_id(&self) -> &str {
        &self.pack_id
    }

    /// Tier of that pack.
    pub fn tier(&self) -> PackTier {
        self.tier
    }

    fn run(&self, ctx: &RuleContext) -> Result<(OutcomeStatus, Option<String>), EvalError> {
        if let Some(guard) = &self.guard {
            if guard.evaluate_condition(ctx)? != Some(true) {
                return Ok((OutcomeStatus::Skipped, Some("not applicable".into())));
            }
        }
        match &self.check {
            CompiledCheck::Expression(expr) => match expr.evaluate_condition(ctx)? {
                Some(true) => Ok((OutcomeStatus::Passed, None)),
                Some(false) => Ok((OutcomeStatus::Failed, Some(describe_inputs(expr, ctx)))),
                None => Ok((OutcomeStatus::Skipped, Some("cannot check".into()))),
            },
            CompiledCheck::Handler { spec, params } => match (spec.run)(params, ctx)? {
                Verdict::Pass => Ok((OutcomeStatus::Passed, None)),
                Verdict::Fail { actual } => Ok((OutcomeStatus::Failed, Some(actual))),
                Verdict::Skip => Ok((OutcomeStatus::Skipped, Some("cannot check".into()))),
            },
        }
    }
}

/// `path = value` for every path an expression reads.
fn describe_inputs(expr: &CompiledExpr, ctx: &RuleContext) -> String {
    let mut seen = BTreeSet::new();
    let parts: Vec<String> = expr
        .expr()
        .paths()
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .map(|p| format!("{p} = {}", ctx.lookup_path(&p)))
        .collect();
    if parts.is_empty() {
        "check evaluated to false".into()
    } else {
        parts.join(", ")
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Check held.
    Passed,
    /// Check failed; a violation was recorded.
    Failed,
    /// Not applicable or not checkable.
    Skipped,
    /// Evaluation raised an error; a warning violation was recorded.
    Errored,
}

/// Per-rule execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule id.
    pub rule_id: String,
    /// Rule domain.
    pub domain: RuleDomain,
    /// Status.
    pub status: OutcomeStatus,
    /// Failure detail, skip reason or error text.
    pub detail: Option<String>,
}

/// A failed or errored rule, ready to become an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Rule id.
    pub rule_id: String,
    /// Title.
    pub title: String,
    /// Domain.
    pub domain: RuleDomain,
    /// Engine severity.
    pub severity: RuleSeverity,
    /// Message.
    pub message: String,
    /// Expected state.
    pub expected: String,
    /// Observed state.
    pub actual: String,
    /// Suggestion.
    pub suggestion: String,
    /// UCP 600 reference.
    pub ucp_reference: Option<String>,
    /// ISBP 745 reference.
    pub isbp_reference: Option<String>,
    /// Documents involved.
    pub documents: Vec<DocumentType>,
}

/// Result of one engine run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleReport {
    /// Every rule considered, in execution order.
    pub outcomes: Vec<RuleOutcome>,
    /// Violations, in execution order.
    pub violations: Vec<RuleViolation>,
}

impl RuleReport {
    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Rules whose check held.
    pub fn passed(&self) -> usize {
        self.count(OutcomeStatus::Passed)
    }

    /// Rules whose check failed.
    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    /// Rules skipped.
    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    /// Rules that errored.
    pub fn errored(&self) -> usize {
        self.count(OutcomeStatus::Errored)
    }

    /// Rules that actually ran a check (not skipped).
    pub fn executed(&self) -> usize {
        self.outcomes.len() - self.skipped()
    }

    /// Passed over executed; `None` when nothing executed.
    pub fn pass_rate(&self) -> Option<f64> {
        let executed = self.executed();
        if executed == 0 {
            None
        } else {
            Some(self.passed() as f64 / executed as f64)
        }
    }
}

/// Compiled, layered rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: BTreeMap<String, CompiledRule>,
}

impl RuleEngine {
    /// Compile and layer packs. Any compile, handler or duplicate-id
    /// problem fails the whole load.
    pub fn load(mut packs: Vec<RulePack>) -> Result<Self, RuleLoadError> {
        packs.sort_by_key(|p| p.tier);
        let mut rules = BTreeMap::new();
        for pack in &packs {
            let mut ids = BTreeSet::new();
            for definition in &pack.rules {
                let id = definition.id.trim();
                if id.is_empty() {
                    return Err(RuleLoadError::EmptyRuleId {
                        pack_id: pack.pack_id.clone(),
                    });
                }
                if !ids.insert(id.to_string()) {
                    return Err(RuleLoadError::DuplicateRule {
                        pack_id: pack.pack_id.clone(),
                        rule_id: id.to_string(),
                    });
                }
                if !definition.enabled {
                    if rules.remove(id).is_some() {
                        tracing::debug!(rule_id = %id, pack_id = %pack.pack_id, "rule disabled by overlay");
                    }
                    continue;
                }
                let compiled = CompiledRule::compile(definition.clone(), pack)?;
                if let Some(previous) = rules.insert(id.to_string(), compiled) {
                    tracing::debug!(
                        rule_id = %id,
                        from = %previous.pack_id,
                        to = %pack.pack_id,
                        "rule overridden"
                    );
                }
            }
        }
        tracing::info!(packs = packs.len(), rules = rules.len(), "rule packs loaded");
        Ok(Self { rules })
    }

    /// Engine over the embedded packs.
    pub fn builtin() -> Result<Self, RuleLoadError> {
        Self::load(RulePack::builtin()?)
    }

    /// Number of effective rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` when no rules are loaded.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Effective rule by id.
    pub fn get(&self, rule_id: &str) -> Option<&CompiledRule> {
        self.rules.get(rule_id)
    }

    /// Effective rules in execution order.
    pub fn rules(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.values()
    }

    /// Run every effective rule, optionally restricted to some domains.
    pub fn execute(&self, ctx: &RuleContext, domains: Option<&[RuleDomain]>) -> RuleReport {
        let mut report = RuleReport::default();
        for rule in self.rules.values() {
            let def = &rule.definition;
            if let Some(domains) = domains {
                if !domains.contains(&def.domain) {
                    continue;
                }
            }
            let (status, detail) = match rule.run(ctx) {
                Ok(result) => result,
                Err(err) => {
                    tracing::error!(rule_id = %def.id, error = %err, "rule evaluation failed");
                    (OutcomeStatus::Errored, Some(err.to_string()))
                }
            };
            match status {
                OutcomeStatus::Passed => {}
                OutcomeStatus::Skipped => {
                    tracing::debug!(rule_id = %def.id, reason = ?detail, "rule skipped");
                }
                OutcomeStatus::Failed => {
                    report.violations.push(violation(def, def.severity, &def.message, detail.clone()));
                }
                OutcomeStatus::Errored => {
                    let message = format!("Rule {} could not be evaluated", def.id);
                    report
                        .violations
                        .push(violation(def, RuleSeverity::Warning, &message, detail.clone()));
                }
            }
            report.outcomes.push(RuleOutcome {
                rule_id: def.id.clone(),
                domain: def.domain,
                status,
                detail,
            });
        }
        report
    }
}

fn violation(
    def: &RuleDefinition,
    severity: RuleSeverity,
    message: &str,
    actual: Option<String>,
) -> RuleViolation {
    let message = if message.is_empty() { &def.title } else { message };
    RuleViolation {
        rule_id: def.id.clone(),
        title: def.title.clone(),
        domain: def.domain,
        severity,
        message: message.to_string(),
        expected: def.expected.clone(),
        actual: actual.unwrap_or_default(),
        suggestion: def.suggestion.clone(),
        ucp_reference: def.ucp_reference.clone(),
        isbp_reference: def.isbp_reference.clone(),
        documents: def.documents.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pack(tier: &str, id: &str, rules: &str) -> RulePack {
        RulePack::from_yaml_str(&format!(
            "pack_id: {id}\nversion: '1'\ntier: {tier}\nrules:\n{rules}"
        ))
        .unwrap()
    }

    const PERIOD_RULE: &str = r#"
  - id: R-PERIOD
    title: Presentation period too long
    domain: ucp600
    severity: minor
    check:
      expression: "amount(lc.presentation_period) <= 21"
"#;

    fn ctx(period: &str) -> RuleContext {
        RuleContext::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .with_document("lc", serde_json::json!({"presentation_period": period}))
    }

    #[test]
    fn failed_rule_produces_violation() {
        let engine = RuleEngine::load(vec![pack("core", "p", PERIOD_RULE)]).unwrap();
        let report = engine.execute(&ctx("30 DAYS"), None);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.violations[0].rule_id, "R-PERIOD");
        assert_eq!(report.violations[0].actual, "lc.presentation_period = \"30 DAYS\"");
        assert_eq!(report.violations[0].message, "Presentation period too long");
        assert_eq!(report.pass_rate(), Some(0.0));
    }

    #[test]
    fn null_check_is_skipped() {
        let engine = RuleEngine::load(vec![pack("core", "p", PERIOD_RULE)]).unwrap();
        let ctx = RuleContext::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let report = engine.execute(&ctx, None);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.executed(), 0);
        assert_eq!(report.pass_rate(), None);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn higher_tier_overrides_and_disables() {
        let overlay = r#"
  - id: R-PERIOD
    title: Bank requires 15 days
    domain: bank
    severity: major
    check:
      expression: "amount(lc.presentation_period) <= 15"
"#;
        // File order is bank first; tier order still applies.
        let engine = RuleEngine::load(vec![
            pack("bank", "bank", overlay),
            pack("core", "core", PERIOD_RULE),
        ])
        .unwrap();
        let rule = engine.get("R-PERIOD").unwrap();
        assert_eq!(rule.pack_id(), "bank");
        assert_eq!(engine.execute(&ctx("18"), None).failed(), 1);

        let disable = r#"
  - id: R-PERIOD
    title: off
    domain: bank
    severity: minor
    enabled: false
    check:
      expression: "true"
"#;
        let engine = RuleEngine::load(vec![
            pack("core", "core", PERIOD_RULE),
            pack("bank", "bank", disable),
        ])
        .unwrap();
        assert!(engine.is_empty());
    }

    #[test]
    fn duplicate_ids_within_a_pack_fail() {
        let rules = format!("{PERIOD_RULE}{PERIOD_RULE}");
        let err = RuleEngine::load(vec![pack("core", "p", &rules)]).unwrap_err();
        assert!(matches!(err, RuleLoadError::DuplicateRule { .. }));
    }

    #[test]
    fn unknown_function_fails_at_load() {
        let rules = r#"
  - id: R-BAD
    title: bad
    domain: ucp600
    severity: minor
    check:
      expression: "frobnicate(lc.amount)"
"#;
        let err = RuleEngine::load(vec![pack("core", "p", rules)]).unwrap_err();
        assert!(matches!(err, RuleLoadError::Compile { ref rule_id, .. } if rule_id == "R-BAD"));
    }

    #[test]
    fn unknown_handler_fails_at_load() {
        let rules = r#"
  - id: R-BAD
    title: bad
    domain: ucp600
    severity: minor
    check:
      handler:
        name: python_module
"#;
        let err = RuleEngine::load(vec![pack("core", "p", rules)]).unwrap_err();
        assert!(matches!(err, RuleLoadError::UnknownHandler { .. }));
    }

    #[test]
    fn evaluation_error_becomes_warning_violation() {
        let rules = r#"
  - id: R-TYPE
    title: type error
    domain: ucp600
    severity: critical
    check:
      expression: "lc.presentation_period < 5"
  - id: R-OK
    title: fine
    domain: ucp600
    severity: minor
    check:
      expression: "true"
"#;
        let engine = RuleEngine::load(vec![pack("core", "p", rules)]).unwrap();
        let report = engine.execute(&ctx("21"), None);
        assert_eq!(report.errored(), 1);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].severity, RuleSeverity::Warning);
    }

    #[test]
    fn guard_and_domain_filter() {
        let rules = r#"
  - id: R-INS
    title: Insurance required
    domain: ucp600
    severity: major
    applies_when: "upper(lc.incoterm) in ['CIF', 'CIP']"
    check:
      handler:
        name: field_present
        params:
          path: insurance
  - id: R-XD
    title: crossdoc
    domain: crossdoc
    severity: minor
    check:
      expression: "false"
"#;
        let engine = RuleEngine::load(vec![pack("core", "p", rules)]).unwrap();
        let fob = RuleContext::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .with_document("lc", serde_json::json!({"incoterm": "FOB"}));
        let report = engine.execute(&fob, Some(&[RuleDomain::Ucp600]));
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Skipped);

        let cif = RuleContext::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
            .with_document("lc", serde_json::json!({"incoterm": "cif"}));
        let report = engine.execute(&cif, None);
        assert_eq!(report.failed(), 2);
    }

    #[test]
    fn builtin_engine_loads() {
        let engine = RuleEngine::builtin().unwrap();
        assert!(!engine.is_empty());
        let ids: Vec<_> = engine.rules().map(|r| r.definition().id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
