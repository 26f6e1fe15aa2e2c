//! # Rule Definitions
//!
//! The YAML shape of a single rule. Definitions are plain data; they are
//! compiled into [`crate::engine::CompiledRule`]s by the engine at load.
//!
//! ```yaml
//! - id: UCP600-ART6-EXPIRY-AFTER-ISSUE
//!   title: Expiry date precedes issue date
//!   domain: ucp600
//!   severity: major
//!   check:
//!     expression: "days_between(lc.issue_date, lc.expiry_date) >= 0"
//!   message: The credit expires before it was issued.
//! ```

use std::collections::BTreeMap;
use std::fmt;

use lcx_core::{DocumentType, IssueSource, Severity};
use serde::{Deserialize, Serialize};

/// Severity as written in rule packs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Non-compliant presentation.
    Critical,
    /// Significant discrepancy.
    Major,
    /// Advisory finding that still needs examiner attention.
    Warning,
    /// Minor discrepancy.
    Minor,
}

impl RuleSeverity {
    /// Issue severity for a violation of this rule.
    pub fn to_severity(self) -> Severity {
        match self {
            Self::Critical => Severity::Critical,
            Self::Major | Self::Warning => Severity::Major,
            Self::Minor => Severity::Minor,
        }
    }

    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Warning => "warning",
            Self::Minor => "minor",
        }
    }
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule category. Selects which rules a run executes and which stage an
/// issue is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDomain {
    /// UCP 600 articles.
    Ucp600,
    /// ISBP 745 practice.
    Isbp745,
    /// Cross-document consistency.
    Crossdoc,
    /// Extraction quality.
    Extraction,
    /// Bank-specific overlay rules.
    Bank,
}

impl RuleDomain {
    /// Issue source for violations in this domain.
    pub fn issue_source(self) -> IssueSource {
        match self {
            Self::Crossdoc => IssueSource::Crossdoc,
            Self::Extraction => IssueSource::Extraction,
            Self::Ucp600 | Self::Isbp745 | Self::Bank => IssueSource::Rule,
        }
    }

    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ucp600 => "ucp600",
            Self::Isbp745 => "isbp745",
            Self::Crossdoc => "crossdoc",
            Self::Extraction => "extraction",
            Self::Bank => "bank",
        }
    }

    /// Parse a domain name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ucp600" => Some(Self::Ucp600),
            "isbp745" => Some(Self::Isbp745),
            "crossdoc" => Some(Self::Crossdoc),
            "extraction" => Some(Self::Extraction),
            "bank" => Some(Self::Bank),
            _ => None,
        }
    }
}

impl fmt::Display for RuleDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler reference with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerCall {
    /// Registered handler name.
    pub name: String,
    /// String parameters, validated by the handler at load.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// How a rule is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSpec {
    /// Boolean expression; `false` is a violation, `null` a skip.
    Expression(String),
    /// Call into the static handler registry.
    Handler(HandlerCall),
}

fn enabled_by_default() -> bool {
    true
}

/// One rule as written in a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique id, e.g. `UCP600-ART14C-PRESENTATION-PERIOD`.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Category.
    pub domain: RuleDomain,
    /// Severity of a violation.
    pub severity: RuleSeverity,
    /// Guard expression; the rule is skipped unless it is `true`.
    #[serde(default)]
    pub applies_when: Option<String>,
    /// The check itself, written as a one-key map (`expression:` or `handler:`).
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub check: CheckSpec,
    /// Violation message.
    #[serde(default)]
    pub message: String,
    /// Expected state, for the issue record.
    #[serde(default)]
    pub expected: String,
    /// Remediation suggestion.
    #[serde(default)]
    pub suggestion: String,
    /// UCP 600 reference.
    #[serde(default)]
    pub ucp_reference: Option<String>,
    /// ISBP 745 reference.
    #[serde(default)]
    pub isbp_reference: Option<String>,
    /// Documents involved.
    #[serde(default)]
    pub documents: Vec<DocumentType>,
    /// Disabled rules are removed from the effective rule set.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}
