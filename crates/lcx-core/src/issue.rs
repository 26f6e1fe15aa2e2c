//! # Issue Records
//!
//! An [`Issue`] is one structured finding surfaced to the examiner. Issues
//! are immutable value objects: built once through [`IssueBuilder`] and never
//! mutated. Collections of issues are produced by building and concatenating,
//! never by appending into a shared container.
//!
//! ## Deterministic identifiers
//!
//! The issue `id` is `ISS-` followed by the first 12 hex characters of a
//! SHA-256 digest over the rule id, field, documents, expected and actual
//! strings. Running the same validation twice yields the same ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{DocumentType, IssueSource, Severity};

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    id: String,
    rule: String,
    title: String,
    severity: Severity,
    message: String,
    expected: String,
    actual: String,
    suggestion: String,
    documents: Vec<DocumentType>,
    source: IssueSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ucp_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    isbp_reference: Option<String>,
    blocks_validation: bool,
}

impl Issue {
    /// Start building an issue.
    pub fn builder(
        rule: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        source: IssueSource,
    ) -> IssueBuilder {
        IssueBuilder {
            rule: rule.into(),
            title: title.into(),
            severity,
            source,
            message: String::new(),
            expected: String::new(),
            actual: String::new(),
            suggestion: String::new(),
            documents: Vec::new(),
            field: None,
            ucp_reference: None,
            isbp_reference: None,
            blocks_validation: false,
        }
    }

    /// Deterministic issue identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rule identifier that produced this issue.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Short human title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Full message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// What the examiner expected to see.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// What was actually found.
    pub fn actual(&self) -> &str {
        &self.actual
    }

    /// Remediation suggestion.
    pub fn suggestion(&self) -> &str {
        &self.suggestion
    }

    /// Documents involved, in the order given at construction.
    pub fn documents(&self) -> &[DocumentType] {
        &self.documents
    }

    /// Producing stage.
    pub fn source(&self) -> IssueSource {
        self.source
    }

    /// LC field concerned, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// UCP 600 article reference.
    pub fn ucp_reference(&self) -> Option<&str> {
        self.ucp_reference.as_deref()
    }

    /// ISBP 745 paragraph reference.
    pub fn isbp_reference(&self) -> Option<&str> {
        self.isbp_reference.as_deref()
    }

    /// Whether this issue prevents validation from proceeding.
    pub fn blocks_validation(&self) -> bool {
        self.blocks_validation
    }

    /// Copy of this issue with a different severity. Severity is not part
    /// of the identity digest, so the id is unchanged.
    pub fn with_severity(&self, severity: Severity) -> Issue {
        let mut issue = self.clone();
        issue.severity = severity;
        issue
    }
}

/// Builder for [`Issue`]. Consumed by [`IssueBuilder::build`].
#[derive(Debug, Clone)]
pub struct IssueBuilder {
    rule: String,
    title: String,
    severity: Severity,
    source: IssueSource,
    message: String,
    expected: String,
    actual: String,
    suggestion: String,
    documents: Vec<DocumentType>,
    field: Option<String>,
    ucp_reference: Option<String>,
    isbp_reference: Option<String>,
    blocks_validation: bool,
}

impl IssueBuilder {
    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the expected value description.
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = expected.into();
        self
    }

    /// Set the actual value description.
    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = actual.into();
        self
    }

    /// Set the remediation suggestion.
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Add an involved document. Duplicates are ignored.
    pub fn document(mut self, document: DocumentType) -> Self {
        if !self.documents.contains(&document) {
            self.documents.push(document);
        }
        self
    }

    /// Add several involved documents.
    pub fn documents(mut self, documents: &[DocumentType]) -> Self {
        for &d in documents {
            self = self.document(d);
        }
        self
    }

    /// Set the LC field concerned.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the UCP 600 reference.
    pub fn ucp(mut self, reference: impl Into<String>) -> Self {
        self.ucp_reference = Some(reference.into());
        self
    }

    /// Set the ISBP 745 reference.
    pub fn isbp(mut self, reference: impl Into<String>) -> Self {
        self.isbp_reference = Some(reference.into());
        self
    }

    /// Mark the issue as blocking validation.
    pub fn blocking(mut self, blocks: bool) -> Self {
        self.blocks_validation = blocks;
        self
    }

    /// Finish the issue and compute its deterministic id.
    pub fn build(self) -> Issue {
        let id = issue_id(
            &self.rule,
            self.field.as_deref(),
            &self.documents,
            &self.expected,
            &self.actual,
        );
        Issue {
            id,
            rule: self.rule,
            title: self.title,
            severity: self.severity,
            message: self.message,
            expected: self.expected,
            actual: self.actual,
            suggestion: self.suggestion,
            documents: self.documents,
            source: self.source,
            field: self.field,
            ucp_reference: self.ucp_reference,
            isbp_reference: self.isbp_reference,
            blocks_validation: self.blocks_validation,
        }
    }
}

fn issue_id(
    rule: &str,
    field: Option<&str>,
    documents: &[DocumentType],
    expected: &str,
    actual: &str,
) -> String {
    let mut hasher = Sha256::new();
    // Unit separator between components so "ab"+"c" differs from "a"+"bc".
    for part in [rule, field.unwrap_or(""), expected, actual] {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    for doc in documents {
        hasher.update(doc.as_str().as_bytes());
        hasher.update([0x1e]);
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(6).map(|b| format!("{b:02x}")).collect();
    format!("ISS-{hex}")
}

// ---------------------------------------------------------------------------
// SeverityCounts
// ---------------------------------------------------------------------------

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    /// CRITICAL issues.
    pub critical: usize,
    /// MAJOR issues.
    pub major: usize,
    /// MINOR issues.
    pub minor: usize,
    /// INFO issues.
    pub info: usize,
}

impl SeverityCounts {
    /// Count a slice of issues.
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            counts.record(issue.severity());
        }
        counts
    }

    /// Record one severity.
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Major => self.major += 1,
            Severity::Minor => self.minor += 1,
            Severity::Info => self.info += 1,
        }
    }

    /// Total across all severities.
    pub fn total(&self) -> usize {
        self.critical + self.major + self.minor + self.info
    }

    /// Count for one severity.
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::Major => self.major,
            Severity::Minor => self.minor,
            Severity::Info => self.info,
        }
    }
}

/// Count issues by producing stage.
pub fn counts_by_source(issues: &[Issue]) -> BTreeMap<IssueSource, usize> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.source()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Issue {
        Issue::builder(
            "CROSSDOC-INV-001",
            "Invoice Amount Exceeds LC",
            Severity::Critical,
            IssueSource::Crossdoc,
        )
        .message("Invoice amount exceeds LC amount plus tolerance")
        .expected("<= USD 105,000.00")
        .actual("USD 106,000.00")
        .documents(&[DocumentType::Invoice, DocumentType::LetterOfCredit])
        .ucp("UCP600 Article 18(b)")
        .build()
    }

    #[test]
    fn ids_are_deterministic() {
        assert_eq!(sample().id(), sample().id());
        assert!(sample().id().starts_with("ISS-"));
        assert_eq!(sample().id().len(), 4 + 12);
    }

    #[test]
    fn ids_differ_when_content_differs() {
        let other = Issue::builder(
            "CROSSDOC-INV-001",
            "Invoice Amount Exceeds LC",
            Severity::Critical,
            IssueSource::Crossdoc,
        )
        .expected("<= USD 105,000.00")
        .actual("USD 107,000.00")
        .documents(&[DocumentType::Invoice, DocumentType::LetterOfCredit])
        .build();
        assert_ne!(sample().id(), other.id());
    }

    #[test]
    fn duplicate_documents_are_ignored() {
        let issue = Issue::builder("R", "T", Severity::Minor, IssueSource::Rule)
            .document(DocumentType::Invoice)
            .document(DocumentType::Invoice)
            .build();
        assert_eq!(issue.documents(), &[DocumentType::Invoice]);
    }

    #[test]
    fn serializes_spec_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["rule"], "CROSSDOC-INV-001");
        assert_eq!(value["severity"], "CRITICAL");
        assert_eq!(value["source"], "CROSSDOC");
        assert_eq!(value["documents"][0], "invoice");
        assert_eq!(value["ucp_reference"], "UCP600 Article 18(b)");
        assert_eq!(value["blocks_validation"], false);
        assert!(value.get("isbp_reference").is_none());
    }

    #[test]
    fn severity_counts() {
        let issues = vec![
            sample(),
            sample().with_severity(Severity::Major),
            sample().with_severity(Severity::Info),
        ];
        let counts = SeverityCounts::from_issues(&issues);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.major, 1);
        assert_eq!(counts.minor, 0);
        assert_eq!(counts.info, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn source_counts() {
        let gate = Issue::builder("LC-GATE-NUMBER", "t", Severity::Critical, IssueSource::Gate).build();
        let counts = counts_by_source(&[sample(), gate]);
        assert_eq!(counts[&IssueSource::Gate], 1);
        assert_eq!(counts[&IssueSource::Crossdoc], 1);
    }
}
