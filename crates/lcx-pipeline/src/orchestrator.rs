//! # Pipeline Orchestrator
//!
//! Runs one examination through a fixed sequence of stages:
//!
//! ```text
//! STARTED -> GATE_CHECKED -> BLOCKED ------------------------------------> COMPLETED
//!                         \-> ISSUES_GENERATED -> CROSSDOC_VALIDATED -> SCORED -> COMPLETED
//! ```
//!
//! Once the gate passes, cross-document validation always runs, even for a
//! presentation without supporting documents (it then executes no rule).
//!
//! A [`ValidationPipeline`] holds only read-only state (compiled rules,
//! matchers, thresholds) and is shared across threads behind an `Arc`.
//! Every call to [`ValidationPipeline::run`] creates its own
//! [`AuditLogger`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use lcx_core::{
    counts_by_source, Clock, Issue, IssueSource, LcBaseline, LcField, SeverityCounts, SystemClock,
};
use lcx_crossdoc::{CrossDocResult, CrossDocValidator, SupportingDocuments};
use lcx_match::{PortRegistry, StaticPortRegistry};
use lcx_rules::{OutcomeStatus, RuleContext, RuleEngine, RulePack, RuleReport};

use crate::audit::{AuditLogger, AuditTrail, TrailSummary};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::gate::{GateResult, GateStatus, ValidationGate};
use crate::issue_engine::IssueEngine;
use crate::scorer::{ComplianceLevel, ComplianceScore, ComplianceScorer};

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// Stage of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    /// Run created.
    Started,
    /// Gate verdict reached.
    GateChecked,
    /// Gate blocked the run.
    Blocked,
    /// Extraction and rule issues generated.
    IssuesGenerated,
    /// Cross-document rules run.
    CrossdocValidated,
    /// Score computed.
    Scored,
    /// Output assembled.
    Completed,
}

impl PipelineStage {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::GateChecked => "GATE_CHECKED",
            Self::Blocked => "BLOCKED",
            Self::IssuesGenerated => "ISSUES_GENERATED",
            Self::CrossdocValidated => "CROSSDOC_VALIDATED",
            Self::Scored => "SCORED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether `next` may follow this stage.
    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        matches!(
            (self, next),
            (Self::Started, Self::GateChecked)
                | (Self::GateChecked, Self::Blocked)
                | (Self::GateChecked, Self::IssuesGenerated)
                | (Self::Blocked, Self::Completed)
                | (Self::IssuesGenerated, Self::CrossdocValidated)
                | (Self::CrossdocValidated, Self::Scored)
                | (Self::Scored, Self::Completed)
        )
    }

    /// `true` for the final stage.
    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) -> Result<(), PipelineError> {
    if !stage.can_transition_to(next) {
        return Err(PipelineError::InvalidTransition { from: *stage, to: next });
    }
    tracing::trace!(from = %stage, to = %next, "pipeline stage");
    *stage = next;
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// No discrepancy of consequence.
    Passed,
    /// Major or minor discrepancies, or gate warnings.
    Warning,
    /// At least one critical discrepancy.
    Failed,
    /// The gate blocked examination.
    Blocked,
}

impl ValidationStatus {
    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Warning => "WARNING",
            Self::Failed => "FAILED",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one examination. Framework-agnostic; serializes to JSON as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutput {
    /// The gate blocked the run.
    pub validation_blocked: bool,
    /// Overall status.
    pub status: ValidationStatus,
    /// Score in `[0, 100]`, one decimal.
    pub compliance_score: f64,
    /// Compliance level.
    pub compliance_level: ComplianceLevel,
    /// Score breakdown.
    pub score_breakdown: ComplianceScore,
    /// Gate, extraction, rule and cross-document issues, in that order.
    pub issues: Vec<Issue>,
    /// Tally by severity.
    pub counts_by_severity: SeverityCounts,
    /// Tally by producing stage.
    pub counts_by_source: BTreeMap<IssueSource, usize>,
    /// Absent CRITICAL fields.
    pub missing_critical_fields: Vec<String>,
    /// Gate verdict.
    pub gate_result: GateResult,
    /// The baseline examined.
    pub lc_baseline: LcBaseline,
    /// Cross-document counts and findings. Empty when blocked.
    pub crossdoc_result: CrossDocResult,
    /// Rule-pack outcomes. Empty when blocked or disabled.
    pub rule_report: RuleReport,
    /// Date all date checks were made against.
    pub examination_date: NaiveDate,
    /// Audit trail identifier.
    pub audit_trail_id: String,
    /// Audit counters.
    pub audit_summary: TrailSummary,
}

/// Output plus the full audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    /// The result.
    pub output: ValidationOutput,
    /// Every event the run recorded.
    pub trail: AuditTrail,
}

// ---------------------------------------------------------------------------
// ValidationPipeline
// ---------------------------------------------------------------------------

/// The examination pipeline. Construct once, run many times.
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    config: PipelineConfig,
    gate: ValidationGate,
    issues: IssueEngine,
    crossdoc: CrossDocValidator,
    scorer: ComplianceScorer,
    clock: Arc<dyn Clock>,
}

/// Builder for [`ValidationPipeline`].
#[derive(Debug)]
pub struct ValidationPipelineBuilder {
    config: PipelineConfig,
    clock: Option<Arc<dyn Clock>>,
    registry: Option<Arc<dyn PortRegistry>>,
    packs: Vec<RulePack>,
}

impl ValidationPipelineBuilder {
    /// Clock supplying "today" and audit timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Port code registry.
    pub fn port_registry(mut self, registry: Arc<dyn PortRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Add a rule pack on top of the configured ones.
    pub fn pack(mut self, pack: RulePack) -> Self {
        self.packs.push(pack);
        self
    }

    /// Validate configuration and load rule packs.
    pub fn build(self) -> Result<ValidationPipeline, PipelineError> {
        let config = self.config;
        config.validate()?;

        let rules = if config.rules.enabled {
            let mut packs = if config.rules.include_builtin_packs {
                RulePack::builtin()?
            } else {
                Vec::new()
            };
            for path in &config.rules.pack_paths {
                packs.push(RulePack::from_path(path)?);
            }
            packs.extend(self.packs);
            Some(RuleEngine::load(packs)?)
        } else {
            None
        };

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(StaticPortRegistry) as Arc<dyn PortRegistry>);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        tracing::info!(
            rules = rules.as_ref().map_or(0, RuleEngine::len),
            "validation pipeline ready"
        );

        Ok(ValidationPipeline {
            gate: ValidationGate::new(config.gate.clone()),
            issues: IssueEngine::new(config.issues.clone(), rules),
            crossdoc: CrossDocValidator::new(config.crossdoc.clone(), config.matching.clone(), registry),
            scorer: ComplianceScorer::new(config.scoring.clone()),
            clock,
            config,
        })
    }
}

impl ValidationPipeline {
    /// Pipeline with the system clock and the builtin port registry.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::builder(config).build()
    }

    /// Start a builder.
    pub fn builder(config: PipelineConfig) -> ValidationPipelineBuilder {
        ValidationPipelineBuilder {
            config,
            clock: None,
            registry: None,
            packs: Vec::new(),
        }
    }

    /// Configuration in force.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loaded rule set, when the rule engine is enabled.
    pub fn rules(&self) -> Option<&RuleEngine> {
        self.issues.rules()
    }

    /// Examine a presentation.
    ///
    /// Only a stage-sequencing bug can fail a run; data problems become
    /// issues.
    pub fn run(&self, baseline: &LcBaseline, documents: &SupportingDocuments) -> Result<PipelineRun, PipelineError> {
        let today = self.clock.today();
        let mut stage = PipelineStage::Started;
        let mut audit = AuditLogger::new(Arc::clone(&self.clock));
        audit.log_validation_started(baseline.value(LcField::LcNumber), &documents.presented());
        for (field, result) in baseline.fields() {
            if result.is_present() {
                audit.log_field_extracted(field, result);
            } else {
                audit.log_field_missing(field);
            }
        }

        let gate = self.gate.check(baseline, None, None);
        audit.log_gate_check(&gate);
        advance(&mut stage, PipelineStage::GateChecked)?;

        if !gate.can_proceed {
            advance(&mut stage, PipelineStage::Blocked)?;
            audit.log_validation_blocked(gate.block_reason.as_deref().unwrap_or("gate blocked"), &gate.missing_critical);
            let issues = gate.issues();
            for issue in &issues {
                audit.log_issue_generated(issue);
            }
            let score = self
                .scorer
                .calculate(&issues, baseline.extraction_completeness(), None, None, true);
            advance(&mut stage, PipelineStage::Completed)?;
            return Ok(self.finish(
                audit,
                ValidationStatus::Blocked,
                score,
                issues,
                gate,
                baseline,
                CrossDocResult::default(),
                RuleReport::default(),
                today,
            ));
        }

        let ctx = self.rule_context(baseline, documents, today, &gate);
        let generated =
            self.issues
                .generate_all_issues(baseline, &ctx, self.config.rules.categories.as_deref());
        for outcome in &generated.rule_report.outcomes {
            let detail = outcome.detail.as_deref();
            match outcome.status {
                OutcomeStatus::Passed => audit.log_rule_executed(&outcome.rule_id, Some(true), detail),
                OutcomeStatus::Failed => audit.log_rule_executed(&outcome.rule_id, Some(false), detail),
                OutcomeStatus::Errored => audit.log_rule_executed(&outcome.rule_id, None, detail),
                OutcomeStatus::Skipped => audit.log_rule_skipped(&outcome.rule_id, detail),
            }
        }
        advance(&mut stage, PipelineStage::IssuesGenerated)?;

        let crossdoc = self.crossdoc.validate_all(baseline, documents, today);
        for execution in &crossdoc.executions {
            audit.log_crossdoc_check(
                &execution.rule_id,
                &execution.pair,
                execution.status,
                execution.detail.as_deref(),
            );
        }
        advance(&mut stage, PipelineStage::CrossdocValidated)?;

        let mut issues = gate.warnings.clone();
        issues.extend(generated.issues);
        issues.extend(crossdoc.issues.iter().cloned());
        for issue in &issues {
            audit.log_issue_generated(issue);
        }

        let rule_score = generated.rule_report.pass_rate().map(|r| r * 100.0);
        let document_score = crossdoc.pass_rate().map(|r| r * 100.0);
        let score = self.scorer.calculate(
            &issues,
            baseline.extraction_completeness(),
            rule_score,
            document_score,
            false,
        );
        audit.log_score_calculated(&score);
        if score.capped {
            audit.log_score_capped(&score);
        }
        advance(&mut stage, PipelineStage::Scored)?;

        let counts = SeverityCounts::from_issues(&issues);
        let status = if counts.critical > 0 {
            ValidationStatus::Failed
        } else if counts.major > 0 || counts.minor > 0 || gate.status == GateStatus::Warning {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Passed
        };

        advance(&mut stage, PipelineStage::Completed)?;
        Ok(self.finish(
            audit,
            status,
            score,
            issues,
            gate,
            baseline,
            crossdoc,
            generated.rule_report,
            today,
        ))
    }

    fn rule_context(
        &self,
        baseline: &LcBaseline,
        documents: &SupportingDocuments,
        today: NaiveDate,
        gate: &GateResult,
    ) -> RuleContext {
        documents
            .to_context_entries()
            .into_iter()
            .fold(RuleContext::from_baseline(baseline, today), |ctx, (key, value)| {
                ctx.with_document(key, value)
            })
            .with_matching(self.config.matching.clone())
            .with_issues(&gate.warnings)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        mut audit: AuditLogger,
        status: ValidationStatus,
        score: ComplianceScore,
        issues: Vec<Issue>,
        gate: GateResult,
        baseline: &LcBaseline,
        crossdoc_result: CrossDocResult,
        rule_report: RuleReport,
        today: NaiveDate,
    ) -> PipelineRun {
        audit.log_validation_completed(status.as_str(), score.score, issues.len());
        let audit_summary = audit.summary();
        let trail = audit.finish();
        tracing::info!(
            trail_id = %trail.trail_id,
            status = %status,
            score = score.score,
            issues = issues.len(),
            "validation complete"
        );
        let output = ValidationOutput {
            validation_blocked: status == ValidationStatus::Blocked,
            status,
            compliance_score: score.score,
            compliance_level: score.level,
            counts_by_severity: SeverityCounts::from_issues(&issues),
            counts_by_source: counts_by_source(&issues),
            missing_critical_fields: gate.missing_critical.clone(),
            score_breakdown: score,
            issues,
            gate_result: gate,
            lc_baseline: baseline.clone(),
            crossdoc_result,
            rule_report,
            examination_date: today,
            audit_trail_id: trail.trail_id.clone(),
            audit_summary,
        };
        PipelineRun { output, trail }
    }
}
