//! # Cross-Document Rule Families
//!
//! Each rule is a plain function over a [`CheckContext`] registered in a
//! `const` table with its id, title, document pair and required documents.
//! Rules are independent: none reads another's result, so the table order
//! only fixes the order of the output.
//!
//! A rule returns [`Check::Skip`] whenever the data it needs is absent or
//! unparseable. Missing data is the gate's and the issue engine's concern.

pub mod bill_of_lading;
pub mod insurance;
pub mod invoice;
pub mod invoice_bl;
pub mod origin;
pub mod packing;
pub mod timing;
pub mod validity;

use chrono::NaiveDate;
use lcx_core::parse::{format_amount, is_approximate_amount, parse_amount, parse_currency, parse_date, parse_tolerance};
use lcx_core::{DocumentType, Issue, IssueBuilder, IssueSource, LcBaseline, LcField, Severity};
use lcx_match::{GoodsMatcher, PartyMatcher, PortMatcher};

use crate::config::CrossDocConfig;
use crate::document::{SupportingDocument, SupportingDocuments};
use crate::error::RuleFault;

/// Everything a rule may read.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// LC baseline.
    pub baseline: &'a LcBaseline,
    /// Presented documents.
    pub documents: &'a SupportingDocuments,
    /// Examination date.
    pub today: NaiveDate,
    /// Thresholds.
    pub config: &'a CrossDocConfig,
    /// Party-name matcher.
    pub party: &'a PartyMatcher,
    /// Port matcher.
    pub ports: &'a PortMatcher,
    /// Goods-description matcher.
    pub goods: &'a GoodsMatcher,
}

/// Basis on which the invoice tolerance was chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToleranceBasis {
    /// Stated in the credit (field 39A).
    Stated,
    /// "About" or "approximately" qualifies the amount.
    Approximate,
    /// Configured default.
    Default,
}

impl<'a> CheckContext<'a> {
    /// Presented document of a type.
    pub fn doc(&self, kind: DocumentType) -> Option<&'a SupportingDocument> {
        self.documents.get(kind)
    }

    /// Present LC field value.
    pub fn lc_text(&self, field: LcField) -> Option<&'a str> {
        self.baseline.value(field).map(str::trim).filter(|s| !s.is_empty())
    }

    /// LC date field, parsed.
    pub fn lc_date(&self, field: LcField) -> Option<NaiveDate> {
        self.lc_text(field).and_then(parse_date)
    }

    /// LC amount, parsed.
    pub fn lc_amount(&self) -> Option<f64> {
        self.lc_text(LcField::Amount).and_then(parse_amount)
    }

    /// LC currency: the currency field, else a code found in the amount.
    pub fn lc_currency(&self) -> Option<String> {
        self.lc_text(LcField::Currency)
            .and_then(parse_currency)
            .or_else(|| self.lc_text(LcField::Amount).and_then(parse_currency))
    }

    /// Upper invoice tolerance as a fraction, with its basis.
    pub fn tolerance(&self) -> (f64, ToleranceBasis) {
        if let Some(t) = self.baseline.term("amount_tolerance").and_then(parse_tolerance) {
            return (t.plus, ToleranceBasis::Stated);
        }
        if self.lc_text(LcField::Amount).is_some_and(is_approximate_amount) {
            return (self.config.approximate_tolerance, ToleranceBasis::Approximate);
        }
        (self.config.default_tolerance, ToleranceBasis::Default)
    }

    /// Supplementary LC term, trimmed and non-empty.
    pub fn lc_term(&self, key: &str) -> Option<&'a str> {
        self.baseline.term(key).map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Verdict of one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// The documents are consistent.
    Pass,
    /// Discrepancy found.
    Fail(Issue),
    /// Not checkable; the reason is recorded in the audit trail.
    Skip(&'static str),
}

/// Signature of a rule check.
pub type CheckFn = fn(&CheckContext<'_>) -> Result<Check, RuleFault>;

/// A registered rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    /// Rule id, e.g. `CROSSDOC-INV-001`.
    pub id: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Documents compared, `(presented, reference)`.
    pub pair: (DocumentType, DocumentType),
    /// Supporting documents that must be presented. Empty means the rule
    /// reads only the LC and runs when anything at all is presented.
    pub requires: &'static [DocumentType],
    /// The check.
    pub check: CheckFn,
}

impl RuleSpec {
    /// Key for grouping issues by document pair.
    pub fn pair_key(&self) -> String {
        format!("{}/{}", self.pair.0.as_str(), self.pair.1.as_str())
    }

    /// Start an issue for this rule.
    pub fn issue(&self, severity: Severity) -> IssueBuilder {
        Issue::builder(self.id, self.title, severity, IssueSource::Crossdoc)
            .documents(&[self.pair.0, self.pair.1])
    }
}

/// Every rule family in output order.
pub const FAMILIES: &[&[RuleSpec]] = &[
    validity::RULES,
    timing::RULES,
    invoice::RULES,
    bill_of_lading::RULES,
    insurance::RULES,
    invoice_bl::RULES,
    origin::RULES,
    packing::RULES,
];

/// Every rule in output order.
pub fn all_rules() -> impl Iterator<Item = &'static RuleSpec> {
    FAMILIES.iter().flat_map(|family| family.iter())
}

/// `USD 105,000.00`, or the bare amount without a currency.
pub fn money(currency: Option<&str>, amount: f64) -> String {
    match currency {
        Some(c) if !c.is_empty() => format!("{c} {}", format_amount(amount)),
        _ => format_amount(amount),
    }
}

/// Skip unless both values are present.
pub(crate) fn both<A, B>(a: Option<A>, b: Option<B>) -> Option<(A, B)> {
    Some((a?, b?))
}

/// Uppercase alphanumerics only, for reference-number comparisons.
pub(crate) fn compact(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
