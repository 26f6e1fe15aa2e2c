//! # lcx-crossdoc: Cross-Document Validation
//!
//! Checks a presentation's supporting documents against the LC baseline and
//! against each other: invoice, transport document, insurance, certificate
//! of origin and packing list, plus LC validity and presentation timing.
//!
//! ## Crate Policy
//!
//! - Rules are plain functions in `const` tables ([`rules::FAMILIES`]). No
//!   rule reads another rule's result.
//! - Absent or unparseable data skips a rule. It is never a finding here.
//! - A faulting or panicking rule is contained at the dispatch boundary
//!   ([`CrossDocValidator`]); the run always completes.
//! - "Today" is a parameter. Nothing in this crate reads the system clock.

pub mod config;
pub mod document;
pub mod error;
pub mod rules;
pub mod validator;

pub use config::CrossDocConfig;
pub use document::{keys, SupportingDocument, SupportingDocuments};
pub use error::RuleFault;
pub use rules::{all_rules, Check, CheckContext, RuleSpec, ToleranceBasis};
pub use validator::{CrossDocResult, CrossDocValidator, ExecutionStatus, RuleExecution};
