//! # lcx-pipeline: LC Examination Pipeline
//!
//! Composes the lower crates into one examination:
//!
//! - [`gate`]: pre-flight completeness gate.
//! - [`issue_engine`]: extraction gaps and rule-pack violations as issues.
//! - [`scorer`]: cap-first compliance scoring.
//! - [`audit`]: per-run audit trail mirrored to `tracing`.
//! - [`orchestrator`]: the stage machine tying them together.
//! - [`config`]: every threshold above, loadable from YAML.
//!
//! ## Crate Policy
//!
//! - No I/O during a run. Configuration and rule packs are read once, at
//!   construction; a bad pack or out-of-range threshold fails construction.
//! - A run never fails on presentation data. Absent or unparseable values
//!   become skipped checks or issues.
//! - "Today" comes from an injected [`lcx_core::Clock`], so a run can be
//!   replayed with identical issues and score.

#![deny(missing_docs)]

pub mod audit;
pub mod config;
pub mod error;
pub mod field_descriptions;
pub mod gate;
pub mod issue_engine;
pub mod orchestrator;
pub mod scorer;

pub use audit::{AuditEvent, AuditEventType, AuditLevel, AuditLogger, AuditTrail, TrailSummary};
pub use config::{PipelineConfig, RulesConfig, CONFIG_ENV};
pub use error::{ConfigError, PipelineError};
pub use gate::{GateConfig, GateResult, GateStatus, ValidationGate};
pub use issue_engine::{IssueEngine, IssueEngineConfig, IssueEngineResult};
pub use orchestrator::{
    PipelineRun, PipelineStage, ValidationOutput, ValidationPipeline, ValidationPipelineBuilder,
    ValidationStatus,
};
pub use scorer::{ComplianceLevel, ComplianceScore, ComplianceScorer, ScoringPolicy};
