//! # lcx-core: Foundational Types for LC Examination
//!
//! The data model every other `lcx-*` crate reads: the confidence-scored LC
//! baseline, immutable issue records, closed severity/priority/status enums,
//! the injectable clock, and tolerant amount/date parsing.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lcx-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests. The one exception is
//!   `.expect()` on compiling a literal regex pattern inside a `Lazy` static.
//! - Severities, sources, priorities and statuses are closed enums; every
//!   consumer matches them exhaustively.
//! - Parsers fail closed: an unparseable value is `None`, never an error.

#![deny(missing_docs)]

pub mod baseline;
pub mod clock;
pub mod confidence;
pub mod domain;
pub mod error;
pub mod issue;
pub mod parse;

// Re-export primary types for ergonomic imports.
pub use baseline::{FieldResult, LcBaseline, LcBaselineBuilder, LcField};
pub use clock::{Clock, FixedClock, SystemClock};
pub use confidence::LOW_CONFIDENCE_THRESHOLD;
pub use domain::{DocumentType, FieldPriority, FieldStatus, IssueSource, Severity};
pub use error::{LcxError, ValidationError};
pub use issue::{counts_by_source, Issue, IssueBuilder, SeverityCounts};
