//! # lcx-match: Fuzzy Matching for Trade Documents
//!
//! Free-text fields on different documents rarely agree byte for byte. This
//! crate decides when they agree enough:
//!
//! - [`PartyMatcher`]: applicant, beneficiary, shipper and issuer names.
//! - [`PortMatcher`]: ports of loading and discharge, via an injectable
//!   [`PortRegistry`] with an alias-table fallback.
//! - [`GoodsMatcher`]: goods descriptions, HS codes first.
//! - [`text`]: the symmetric similarity primitives underneath.
//!
//! Matchers hold only immutable configuration and shared read-only tables;
//! they are `Send + Sync` and meant to be built once and reused.

pub mod config;
pub mod error;
pub mod goods;
pub mod hs;
pub mod party;
pub mod port;
pub mod text;

pub use config::MatchingConfig;
pub use error::RegistryError;
pub use goods::{DescriptionMatch, DescriptionMethod, GoodsMatcher};
pub use hs::{codes_agree, extract_hs_codes, HsCode};
pub use party::{PartyMatch, PartyMatchMethod, PartyMatcher};
pub use port::{normalize_port, PortCode, PortMatch, PortMatchMethod, PortMatcher, PortRegistry, StaticPortRegistry};
