//! # Examination Audit Trail
//!
//! Records every decision a validation run takes: gate verdict, field
//! gaps, each rule outcome, each issue and the score. One [`AuditLogger`]
//! per run; it is never shared between runs.
//!
//! Every appended event is also emitted through `tracing` at target
//! `lcx::audit`, at the level matching the event's [`AuditLevel`] and
//! tagged with the trail id, so an operator's log pipeline sees the same
//! record as the returned trail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lcx_core::{Clock, DocumentType, FieldResult, Issue, LcField, Severity};
use lcx_crossdoc::ExecutionStatus;

use crate::gate::{GateResult, GateStatus};
use crate::scorer::ComplianceScore;

// ---------------------------------------------------------------------------
// AuditEventType
// ---------------------------------------------------------------------------

/// The kind of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A run began.
    ValidationStarted,
    /// A run finished with a score.
    ValidationCompleted,
    /// The gate stopped a run.
    ValidationBlocked,
    /// The gate reached a verdict.
    GateCheck,
    /// A field was extracted.
    FieldExtracted,
    /// A field is absent.
    FieldMissing,
    /// A rule-pack rule reached a verdict.
    RuleExecuted,
    /// A rule did not apply.
    RuleSkipped,
    /// A cross-document rule reached a verdict.
    CrossdocCheck,
    /// The score was computed.
    ScoreCalculated,
    /// A severity cap lowered the score.
    ScoreCapped,
    /// An issue was recorded.
    IssueGenerated,
}

impl AuditEventType {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationStarted => "validation_started",
            Self::ValidationCompleted => "validation_completed",
            Self::ValidationBlocked => "validation_blocked",
            Self::GateCheck => "gate_check",
            Self::FieldExtracted => "field_extracted",
            Self::FieldMissing => "field_missing",
            Self::RuleExecuted => "rule_executed",
            Self::RuleSkipped => "rule_skipped",
            Self::CrossdocCheck => "crossdoc_check",
            Self::ScoreCalculated => "score_calculated",
            Self::ScoreCapped => "score_capped",
            Self::IssueGenerated => "issue_generated",
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log level of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    /// Routine detail.
    Debug,
    /// Milestones.
    Info,
    /// Discrepancies and blocks.
    Warning,
    /// Critical findings and faults.
    Error,
}

impl AuditLevel {
    fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Self::Error,
            Severity::Major => Self::Warning,
            Severity::Minor | Severity::Info => Self::Info,
        }
    }
}

// ---------------------------------------------------------------------------
// AuditEvent
// ---------------------------------------------------------------------------

/// A single entry in the examination trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the trail, from 0.
    pub sequence: usize,
    /// UTC timestamp from the run's clock.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event_type: AuditEventType,
    /// Level.
    pub level: AuditLevel,
    /// Free-text description.
    pub message: String,
    /// Rule concerned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    /// Field concerned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Expected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Observed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Verdict, e.g. `passed`, `blocked`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    /// Why the verdict was reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl AuditEvent {
    fn new(event_type: AuditEventType, level: AuditLevel, message: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            timestamp: DateTime::<Utc>::MIN_UTC,
            event_type,
            level,
            message: message.into(),
            rule_id: None,
            field: None,
            expected: None,
            actual: None,
            decision: None,
            reasoning: None,
        }
    }

    fn rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    fn values(mut self, expected: &str, actual: &str) -> Self {
        if !expected.is_empty() {
            self.expected = Some(expected.to_string());
        }
        if !actual.is_empty() {
            self.actual = Some(actual.to_string());
        }
        self
    }

    fn decision(mut self, decision: impl Into<String>) -> Self {
        self.decision = Some(decision.into());
        self
    }

    fn reasoning(mut self, reasoning: Option<&str>) -> Self {
        self.reasoning = reasoning.map(str::to_string);
        self
    }
}

// ---------------------------------------------------------------------------
// AuditTrail
// ---------------------------------------------------------------------------

/// The append-only event list of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Unique trail identifier.
    pub trail_id: String,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub closed_at: Option<DateTime<Utc>>,
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    /// All events in order.
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` when no event was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of one type.
    pub fn events_by_type(&self, event_type: AuditEventType) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| e.event_type == event_type).collect()
    }

    /// Aggregate counters without the event list.
    pub fn summary(&self) -> TrailSummary {
        let mut summary = TrailSummary {
            trail_id: self.trail_id.clone(),
            event_count: self.events.len(),
            rules_executed: 0,
            rules_passed: 0,
            rules_failed: 0,
            rules_skipped: 0,
            pass_rate: None,
            issues_generated: 0,
            blocked: false,
            final_score: None,
        };
        for event in &self.events {
            match event.event_type {
                AuditEventType::RuleExecuted | AuditEventType::CrossdocCheck => {
                    summary.rules_executed += 1;
                    match event.decision.as_deref() {
                        Some(DECISION_PASSED) => summary.rules_passed += 1,
                        Some(DECISION_FAILED) => summary.rules_failed += 1,
                        _ => {}
                    }
                }
                AuditEventType::RuleSkipped => summary.rules_skipped += 1,
                AuditEventType::IssueGenerated => summary.issues_generated += 1,
                AuditEventType::ValidationBlocked => summary.blocked = true,
                AuditEventType::ScoreCalculated => {
                    summary.final_score = event.actual.as_deref().and_then(|s| s.parse().ok());
                }
                _ => {}
            }
        }
        summary.pass_rate = (summary.rules_executed > 0)
            .then(|| summary.rules_passed as f64 / summary.rules_executed as f64);
        summary
    }
}

/// Counters over a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailSummary {
    /// Trail identifier.
    pub trail_id: String,
    /// Events recorded.
    pub event_count: usize,
    /// Rules that reached a verdict or faulted.
    pub rules_executed: usize,
    /// Rules that passed.
    pub rules_passed: usize,
    /// Rules that failed.
    pub rules_failed: usize,
    /// Rules that did not apply.
    pub rules_skipped: usize,
    /// Passed over executed.
    pub pass_rate: Option<f64>,
    /// Issues recorded.
    pub issues_generated: usize,
    /// The gate blocked the run.
    pub blocked: bool,
    /// Final score, when one was computed.
    pub final_score: Option<f64>,
}

const DECISION_PASSED: &str = "passed";
const DECISION_FAILED: &str = "failed";
const DECISION_FAULTED: &str = "faulted";

// ---------------------------------------------------------------------------
// AuditLogger
// ---------------------------------------------------------------------------

/// Per-run audit logger.
#[derive(Debug)]
pub struct AuditLogger {
    clock: Arc<dyn Clock>,
    trail: AuditTrail,
}

impl AuditLogger {
    /// Open a new trail.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            clock,
            trail: AuditTrail {
                trail_id: Uuid::new_v4().to_string(),
                started_at,
                closed_at: None,
                events: Vec::new(),
            },
        }
    }

    /// Trail identifier.
    pub fn trail_id(&self) -> &str {
        &self.trail.trail_id
    }

    /// The trail so far.
    pub fn trail(&self) -> &AuditTrail {
        &self.trail
    }

    /// Counters so far.
    pub fn summary(&self) -> TrailSummary {
        self.trail.summary()
    }

    /// Close the trail and hand it over.
    pub fn finish(mut self) -> AuditTrail {
        self.trail.closed_at = Some(self.clock.now());
        self.trail
    }

    fn append(&mut self, mut event: AuditEvent) {
        event.sequence = self.trail.events.len();
        event.timestamp = self.clock.now();
        let trail_id = self.trail.trail_id.as_str();
        let rule_id = event.rule_id.as_deref().unwrap_or("");
        let event_type = event.event_type.as_str();
        match event.level {
            AuditLevel::Debug => {
                tracing::debug!(target: "lcx::audit", trail_id, event = event_type, rule_id, "{}", event.message)
            }
            AuditLevel::Info => {
                tracing::info!(target: "lcx::audit", trail_id, event = event_type, rule_id, "{}", event.message)
            }
            AuditLevel::Warning => {
                tracing::warn!(target: "lcx::audit", trail_id, event = event_type, rule_id, "{}", event.message)
            }
            AuditLevel::Error => {
                tracing::error!(target: "lcx::audit", trail_id, event = event_type, rule_id, "{}", event.message)
            }
        }
        self.trail.events.push(event);
    }

    /// A run began.
    pub fn log_validation_started(&mut self, lc_number: Option<&str>, presented: &[DocumentType]) {
        let documents: Vec<&str> = presented.iter().map(|d| d.as_str()).collect();
        let message = format!(
            "Validation started for LC {} with {} supporting document(s)",
            lc_number.unwrap_or("(unknown)"),
            presented.len()
        );
        let mut event = AuditEvent::new(AuditEventType::ValidationStarted, AuditLevel::Info, message);
        event.actual = (!documents.is_empty()).then(|| documents.join(","));
        self.append(event);
    }

    /// The gate reached a verdict.
    pub fn log_gate_check(&mut self, result: &GateResult) {
        let level = match result.status {
            GateStatus::Blocked => AuditLevel::Warning,
            GateStatus::Passed | GateStatus::Warning => AuditLevel::Info,
        };
        let event = AuditEvent::new(
            AuditEventType::GateCheck,
            level,
            format!(
                "Gate {}: completeness {:.2}, critical completeness {:.2}",
                result.status, result.completeness, result.critical_completeness
            ),
        )
        .decision(result.status.as_str().to_lowercase())
        .reasoning(result.block_reason.as_deref());
        self.append(event);
    }

    /// The gate stopped the run.
    pub fn log_validation_blocked(&mut self, reason: &str, missing_critical: &[String]) {
        let mut event = AuditEvent::new(
            AuditEventType::ValidationBlocked,
            AuditLevel::Warning,
            format!("Validation blocked: {reason}"),
        )
        .decision("blocked")
        .reasoning(Some(reason));
        if !missing_critical.is_empty() {
            event.actual = Some(missing_critical.join(","));
        }
        self.append(event);
    }

    /// A field was extracted.
    pub fn log_field_extracted(&mut self, field: LcField, result: &FieldResult) {
        let event = AuditEvent::new(
            AuditEventType::FieldExtracted,
            AuditLevel::Debug,
            format!(
                "Field {} {} (confidence {:.2})",
                field,
                result.status().as_str().to_lowercase(),
                result.confidence()
            ),
        )
        .field(field.name())
        .decision(result.status().as_str().to_lowercase());
        self.append(event);
    }

    /// A field is absent.
    pub fn log_field_missing(&mut self, field: LcField) {
        let priority = field.priority();
        let level = match priority {
            lcx_core::FieldPriority::Critical => AuditLevel::Warning,
            _ => AuditLevel::Info,
        };
        let event = AuditEvent::new(
            AuditEventType::FieldMissing,
            level,
            format!("Field {} missing ({} priority)", field, priority.as_str()),
        )
        .field(field.name())
        .decision("missing");
        self.append(event);
    }

    /// A rule-pack rule reached a verdict. `passed == None` marks an
    /// evaluation fault.
    pub fn log_rule_executed(&mut self, rule_id: &str, passed: Option<bool>, detail: Option<&str>) {
        let (level, decision) = match passed {
            Some(true) => (AuditLevel::Debug, DECISION_PASSED),
            Some(false) => (AuditLevel::Info, DECISION_FAILED),
            None => (AuditLevel::Error, DECISION_FAULTED),
        };
        let event = AuditEvent::new(
            AuditEventType::RuleExecuted,
            level,
            format!("Rule {rule_id} {decision}"),
        )
        .rule(rule_id)
        .decision(decision)
        .reasoning(detail);
        self.append(event);
    }

    /// A rule did not apply.
    pub fn log_rule_skipped(&mut self, rule_id: &str, reason: Option<&str>) {
        let event = AuditEvent::new(
            AuditEventType::RuleSkipped,
            AuditLevel::Debug,
            format!("Rule {rule_id} skipped"),
        )
        .rule(rule_id)
        .decision("skipped")
        .reasoning(reason);
        self.append(event);
    }

    /// A cross-document rule reached a verdict. Skipped rules go to
    /// [`AuditLogger::log_rule_skipped`].
    pub fn log_crossdoc_check(&mut self, rule_id: &str, pair: &str, status: ExecutionStatus, detail: Option<&str>) {
        let (level, decision) = match status {
            ExecutionStatus::Passed => (AuditLevel::Debug, DECISION_PASSED),
            ExecutionStatus::Failed => (AuditLevel::Info, DECISION_FAILED),
            ExecutionStatus::Faulted => (AuditLevel::Error, DECISION_FAULTED),
            ExecutionStatus::Skipped => {
                self.log_rule_skipped(rule_id, detail);
                return;
            }
        };
        let event = AuditEvent::new(
            AuditEventType::CrossdocCheck,
            level,
            format!("Cross-document rule {rule_id} on {pair} {decision}"),
        )
        .rule(rule_id)
        .decision(decision)
        .reasoning(detail);
        self.append(event);
    }

    /// An issue was recorded.
    pub fn log_issue_generated(&mut self, issue: &Issue) {
        let mut event = AuditEvent::new(
            AuditEventType::IssueGenerated,
            AuditLevel::for_severity(issue.severity()),
            format!("{} [{}]: {}", issue.rule(), issue.severity(), issue.title()),
        )
        .rule(issue.rule())
        .values(issue.expected(), issue.actual())
        .decision(issue.severity().as_str().to_lowercase());
        event.field = issue.field().map(str::to_string);
        if !issue.message().is_empty() {
            event.reasoning = Some(issue.message().to_string());
        }
        self.append(event);
    }

    /// The score was computed.
    pub fn log_score_calculated(&mut self, score: &ComplianceScore) {
        let event = AuditEvent::new(
            AuditEventType::ScoreCalculated,
            AuditLevel::Info,
            format!("Compliance score {:.1} ({})", score.score, score.level),
        )
        .values("", &format!("{:.1}", score.score))
        .decision(score.level.as_str())
        .reasoning(score.cap_reason.as_deref());
        self.append(event);
    }

    /// A severity cap lowered the score.
    pub fn log_score_capped(&mut self, score: &ComplianceScore) {
        let event = AuditEvent::new(
            AuditEventType::ScoreCapped,
            AuditLevel::Info,
            format!("Score capped at {:.0}", score.max_allowed),
        )
        .values(&format!("<= {:.0}", score.max_allowed), &format!("{:.1}", score.score))
        .decision("capped")
        .reasoning(score.cap_reason.as_deref());
        self.append(event);
    }

    /// A run finished.
    pub fn log_validation_completed(&mut self, status: &str, score: f64, issues: usize) {
        let event = AuditEvent::new(
            AuditEventType::ValidationCompleted,
            AuditLevel::Info,
            format!("Validation completed: {status}, score {score:.1}, {issues} issue(s)"),
        )
        .decision(status.to_lowercase());
        self.append(event);
    }
}
