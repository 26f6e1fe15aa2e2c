//! # lcx-rules: Tiered Rule Packs
//!
//! Rules beyond the built-in cross-document checks are data: YAML packs of
//! [`RuleDefinition`]s, layered by [`PackTier`] and compiled once by
//! [`RuleEngine::load`].
//!
//! A rule is checked either by an [`expr`] expression or by a handler from
//! the static [`registry`]. Both are resolved at load time, so a pack that
//! names an unknown function or handler never reaches request traffic.
//!
//! ## Crate Policy
//!
//! - Loading fails fast with [`RuleLoadError`]; evaluation never panics and
//!   reports faults as errored outcomes.
//! - Execution order is rule-id order, independent of pack file order.
//! - No runtime code loading of any kind.

#![deny(missing_docs)]

pub mod context;
pub mod engine;
pub mod error;
pub mod expr;
pub mod pack;
pub mod registry;
pub mod rule;

pub use context::RuleContext;
pub use engine::{CompiledRule, OutcomeStatus, RuleEngine, RuleOutcome, RuleReport, RuleViolation};
pub use error::{CompileError, EvalError, RuleLoadError};
pub use expr::{CompiledExpr, Value};
pub use pack::{PackTier, RulePack};
pub use registry::{HandlerSpec, Verdict, HANDLERS};
pub use rule::{CheckSpec, HandlerCall, RuleDefinition, RuleDomain, RuleSeverity};
