//! # Rule Context
//!
//! The data a rule can see: a JSON object tree keyed by document
//! (`lc`, `invoice`, `bill_of_lading`, ...), the examination date, and the
//! matchers used by `party_match` and the matching handlers.

use chrono::NaiveDate;
use lcx_core::{Issue, LcBaseline};
use lcx_match::{GoodsMatcher, MatchingConfig, PartyMatcher};

use crate::expr::Value;

/// Evaluation context for one rule run.
#[derive(Debug, Clone)]
pub struct RuleContext {
    root: serde_json::Map<String, serde_json::Value>,
    today: NaiveDate,
    party: PartyMatcher,
    goods: GoodsMatcher,
}

impl RuleContext {
    /// Empty context for an examination date.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            root: serde_json::Map::new(),
            today,
            party: PartyMatcher::default(),
            goods: GoodsMatcher::default(),
        }
    }

    /// Context with the baseline under `lc`.
    pub fn from_baseline(baseline: &LcBaseline, today: NaiveDate) -> Self {
        Self::new(today).with_document("lc", baseline.to_context_value())
    }

    /// Add or replace a top-level document.
    pub fn with_document(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.root.insert(key.into(), value);
        self
    }

    /// Use a specific matching configuration.
    pub fn with_matching(mut self, config: MatchingConfig) -> Self {
        self.party = PartyMatcher::new(config.clone());
        self.goods = GoodsMatcher::new(config);
        self
    }

    /// Expose earlier findings as `issues`: a list of
    /// `{rule, severity, source}` objects.
    pub fn with_issues(self, issues: &[Issue]) -> Self {
        let list = issues
            .iter()
            .map(|i| {
                serde_json::json!({
                    "rule": i.rule(),
                    "severity": i.severity().as_str(),
                    "source": i.source().as_str(),
                })
            })
            .collect();
        self.with_document("issues", serde_json::Value::Array(list))
    }

    /// Examination date.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Party-name matcher.
    pub fn party_matcher(&self) -> &PartyMatcher {
        &self.party
    }

    /// Goods-description matcher.
    pub fn goods_matcher(&self) -> &GoodsMatcher {
        &self.goods
    }

    /// Raw JSON at a path, if any.
    pub fn lookup_json(&self, segments: &[String]) -> Option<&serde_json::Value> {
        let (first, rest) = segments.split_first()?;
        let mut node = self.root.get(first)?;
        for segment in rest {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Value at a path. Unknown paths are `null`.
    pub fn lookup(&self, segments: &[String]) -> Value {
        self.lookup_json(segments).map_or(Value::Null, Value::from)
    }

    /// Value at a dotted path such as `"invoice.amount"`.
    pub fn lookup_path(&self, path: &str) -> Value {
        self.lookup(&split_path(path))
    }

    /// Raw JSON at a dotted path.
    pub fn lookup_path_json(&self, path: &str) -> Option<&serde_json::Value> {
        self.lookup_json(&split_path(path))
    }

    /// Whether a top-level document is present.
    pub fn has_document(&self, key: &str) -> bool {
        self.root.get(key).is_some_and(|v| !v.is_null())
    }
}

/// Split a dotted path into segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(|s| s.trim().to_string()).collect()
}
