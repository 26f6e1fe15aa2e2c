//! # Closed Taxonomies
//!
//! Severity, issue source, field priority, field status and document type.
//! Each is a closed enum with exhaustive `match` everywhere it is consumed:
//! adding a variant is a compile error until every scorer, mapper and
//! renderer has been updated. Severities are never compared as strings.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a single finding.
///
/// Ordering (least → most severe): `Info < Minor < Major < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Discrepancy that makes the presentation non-compliant.
    Critical,
    /// Significant discrepancy that a bank would normally refuse on.
    Major,
    /// Minor discrepancy or advisory finding.
    Minor,
    /// Informational only; carries no scoring penalty.
    Info,
}

impl Severity {
    fn rank(self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Minor => 1,
            Self::Major => 2,
            Self::Critical => 3,
        }
    }

    /// Move one level toward `Critical`. `Critical` is absorbing.
    pub fn escalate(self) -> Self {
        match self {
            Self::Info => Self::Minor,
            Self::Minor => Self::Major,
            Self::Major | Self::Critical => Self::Critical,
        }
    }

    /// Return the canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Major => "MAJOR",
            Self::Minor => "MINOR",
            Self::Info => "INFO",
        }
    }

    /// All severities, most severe first.
    pub fn all() -> &'static [Severity] {
        &[Self::Critical, Self::Major, Self::Minor, Self::Info]
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueSource
// ---------------------------------------------------------------------------

/// The pipeline stage that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSource {
    /// Extraction gap or low-confidence field.
    Extraction,
    /// Pre-flight validation gate.
    Gate,
    /// Auxiliary rule-pack engine.
    Rule,
    /// Cross-document validator.
    Crossdoc,
    /// Manually raised by an examiner.
    Manual,
}

impl IssueSource {
    /// Return the canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "EXTRACTION",
            Self::Gate => "GATE",
            Self::Rule => "RULE",
            Self::Crossdoc => "CROSSDOC",
            Self::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for IssueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FieldPriority / FieldStatus
// ---------------------------------------------------------------------------

/// How important an LC field is for examination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldPriority {
    /// Examination cannot proceed without it.
    Critical,
    /// Needed for a full examination.
    Required,
    /// Improves examination quality.
    Important,
    /// Nice to have.
    Optional,
}

impl FieldPriority {
    /// Completeness weight used for `extraction_completeness`.
    pub fn weight(self) -> f64 {
        match self {
            Self::Critical => 3.0,
            Self::Required => 2.0,
            Self::Important => 1.0,
            Self::Optional => 0.5,
        }
    }

    /// Severity of an issue raised when a field of this priority is absent.
    ///
    /// Returns `None` for optional fields, whose absence is never an issue.
    pub fn missing_severity(self) -> Option<Severity> {
        match self {
            Self::Critical => Some(Severity::Critical),
            Self::Required => Some(Severity::Major),
            Self::Important => Some(Severity::Minor),
            Self::Optional => None,
        }
    }

    /// Return the canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Required => "REQUIRED",
            Self::Important => "IMPORTANT",
            Self::Optional => "OPTIONAL",
        }
    }
}

impl fmt::Display for FieldPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction outcome for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldStatus {
    /// Value extracted in full.
    Extracted,
    /// Value extracted but incomplete.
    Partial,
    /// Value extracted but failed format validation.
    Invalid,
    /// Nothing extracted.
    Missing,
}

impl FieldStatus {
    /// Return the canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extracted => "EXTRACTED",
            Self::Partial => "PARTIAL",
            Self::Invalid => "INVALID",
            Self::Missing => "MISSING",
        }
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DocumentType
// ---------------------------------------------------------------------------

/// A document in a documentary-credit presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// The Letter of Credit itself.
    LetterOfCredit,
    /// Commercial invoice.
    Invoice,
    /// Bill of lading or multimodal transport document.
    BillOfLading,
    /// Insurance policy or certificate.
    Insurance,
    /// Certificate of origin.
    CertificateOfOrigin,
    /// Packing list.
    PackingList,
}

impl DocumentType {
    /// Return the canonical string form (also the document dictionary key).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LetterOfCredit => "letter_of_credit",
            Self::Invoice => "invoice",
            Self::BillOfLading => "bill_of_lading",
            Self::Insurance => "insurance",
            Self::CertificateOfOrigin => "certificate_of_origin",
            Self::PackingList => "packing_list",
        }
    }

    /// Human-readable document name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::LetterOfCredit => "Letter of Credit",
            Self::Invoice => "Commercial Invoice",
            Self::BillOfLading => "Bill of Lading",
            Self::Insurance => "Insurance Document",
            Self::CertificateOfOrigin => "Certificate of Origin",
            Self::PackingList => "Packing List",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_is_info_to_critical() {
        assert!(Severity::Info < Severity::Minor);
        assert!(Severity::Minor < Severity::Major);
        assert!(Severity::Major < Severity::Critical);
    }

    #[test]
    fn escalate_climbs_and_saturates() {
        assert_eq!(Severity::Info.escalate(), Severity::Minor);
        assert_eq!(Severity::Minor.escalate(), Severity::Major);
        assert_eq!(Severity::Major.escalate(), Severity::Critical);
        assert_eq!(Severity::Critical.escalate(), Severity::Critical);
    }

    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Major).unwrap();
        assert_eq!(json, "\"MAJOR\"");
        let back: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(back, Severity::Critical);
    }

    #[test]
    fn optional_fields_never_raise_missing_issues() {
        assert_eq!(FieldPriority::Optional.missing_severity(), None);
        assert_eq!(
            FieldPriority::Critical.missing_severity(),
            Some(Severity::Critical)
        );
        assert_eq!(
            FieldPriority::Required.missing_severity(),
            Some(Severity::Major)
        );
        assert_eq!(
            FieldPriority::Important.missing_severity(),
            Some(Severity::Minor)
        );
    }

    #[test]
    fn document_type_keys_are_snake_case() {
        let json = serde_json::to_string(&DocumentType::BillOfLading).unwrap();
        assert_eq!(json, "\"bill_of_lading\"");
        assert_eq!(DocumentType::BillOfLading.as_str(), "bill_of_lading");
    }

    #[test]
    fn issue_source_display() {
        assert_eq!(IssueSource::Crossdoc.to_string(), "CROSSDOC");
    }
}
