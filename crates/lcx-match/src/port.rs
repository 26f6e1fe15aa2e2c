//! # Port Matching
//!
//! Named ports on the LC and the transport document are compared in stages,
//! each tagged with the method that decided it:
//!
//! | Stage | Method | Confidence |
//! |---|---|---|
//! | identical after normalization | `Exact` | 1.0 |
//! | one contained in the other (shorter side ≥ 4 chars) | `Substring` | 0.9 |
//! | same code in the [`PortRegistry`] | `Registry` | 0.95 |
//! | same group in the alias table | `Alias` | 0.85 |
//! | none of the above | `NoMatch` | 0.0 |
//!
//! A registry failure never propagates: it is logged and the matcher falls
//! through to the alias table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

const MIN_SUBSTRING_LEN: usize = 4;

/// Tokens dropped during normalization.
const PORT_NOISE: &[&str] = &["PORT", "OF", "HARBOUR", "HARBOR", "SEAPORT"];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A UN/LOCODE-style port code, e.g. `BDCGP`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortCode(String);

impl PortCode {
    /// Wrap a code, uppercased.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// The code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authoritative name → code lookup.
pub trait PortRegistry: Send + Sync + fmt::Debug {
    /// Resolve a free-text port name. `Ok(None)` when the name is unknown.
    fn resolve(&self, name: &str) -> Result<Option<PortCode>, RegistryError>;
}

/// Embedded UN/LOCODE table: code, names and common alternates.
const LOCODE_TABLE: &[(&str, &[&str])] = &[
    ("BDCGP", &["Chittagong", "Chattogram"]),
    ("BDMGL", &["Mongla", "Mongla Port"]),
    ("INNSA", &["Nhava Sheva", "Jawaharlal Nehru", "JNPT"]),
    ("INBOM", &["Mumbai", "Bombay"]),
    ("INMAA", &["Chennai", "Madras"]),
    ("INCCU", &["Kolkata", "Calcutta"]),
    ("INMUN", &["Mundra"]),
    ("INCOK", &["Cochin", "Kochi"]),
    ("INTUT", &["Tuticorin", "Thoothukudi"]),
    ("PKKHI", &["Karachi"]),
    ("PKBQM", &["Port Qasim", "Muhammad Bin Qasim"]),
    ("LKCMB", &["Colombo"]),
    ("CNSHA", &["Shanghai"]),
    ("CNYTN", &["Yantian"]),
    ("CNSZX", &["Shenzhen"]),
    ("CNNGB", &["Ningbo"]),
    ("CNTAO", &["Qingdao", "Tsingtao"]),
    ("CNTXG", &["Tianjin", "Xingang", "Tianjin Xingang"]),
    ("CNXMN", &["Xiamen", "Amoy"]),
    ("CNCAN", &["Guangzhou", "Canton"]),
    ("HKHKG", &["Hong Kong"]),
    ("SGSIN", &["Singapore"]),
    ("MYPKG", &["Port Klang", "Klang"]),
    ("MYTPP", &["Tanjung Pelepas"]),
    ("THLCH", &["Laem Chabang"]),
    ("VNSGN", &["Ho Chi Minh City", "Ho Chi Minh", "Saigon"]),
    ("VNHPH", &["Haiphong", "Hai Phong"]),
    ("IDTPP", &["Tanjung Priok", "Jakarta"]),
    ("PHMNL", &["Manila"]),
    ("KRPUS", &["Busan", "Pusan"]),
    ("JPTYO", &["Tokyo"]),
    ("JPYOK", &["Yokohama"]),
    ("JPUKB", &["Kobe"]),
    ("TWKHH", &["Kaohsiung"]),
    ("AEJEA", &["Jebel Ali"]),
    ("OMSLL", &["Salalah"]),
    ("SAJED", &["Jeddah", "Jiddah"]),
    ("EGPSD", &["Port Said"]),
    ("MMRGN", &["Yangon", "Rangoon"]),
    ("NLRTM", &["Rotterdam"]),
    ("BEANR", &["Antwerp", "Antwerpen", "Anvers"]),
    ("DEHAM", &["Hamburg"]),
    ("DEBRV", &["Bremerhaven"]),
    ("GBFXT", &["Felixstowe"]),
    ("GBSOU", &["Southampton"]),
    ("FRLEH", &["Le Havre"]),
    ("ESVLC", &["Valencia"]),
    ("ESALG", &["Algeciras"]),
    ("ITGOA", &["Genoa", "Genova"]),
    ("GRPIR", &["Piraeus"]),
    ("TRIST", &["Istanbul"]),
    ("USNYC", &["New York"]),
    ("USLAX", &["Los Angeles"]),
    ("USLGB", &["Long Beach"]),
    ("USSAV", &["Savannah"]),
    ("USHOU", &["Houston"]),
    ("CAVAN", &["Vancouver"]),
    ("BRSSZ", &["Santos"]),
    ("KEMBA", &["Mombasa"]),
    ("ZADUR", &["Durban"]),
    ("NGAPP", &["Apapa", "Lagos"]),
    ("AUSYD", &["Sydney"]),
    ("AUMEL", &["Melbourne"]),
];

static LOCODE_INDEX: Lazy<HashMap<String, PortCode>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (code, names) in LOCODE_TABLE {
        index.insert(normalize_port(code), PortCode::new(*code));
        for name in *names {
            index.insert(normalize_port(name), PortCode::new(*code));
        }
    }
    index
});

/// Registry backed by the embedded UN/LOCODE table. The index is built once
/// per process on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPortRegistry;

impl StaticPortRegistry {
    /// Number of names and codes indexed.
    pub fn len(&self) -> usize {
        LOCODE_INDEX.len()
    }

    /// Always false: the table is embedded.
    pub fn is_empty(&self) -> bool {
        LOCODE_INDEX.is_empty()
    }
}

impl PortRegistry for StaticPortRegistry {
    fn resolve(&self, name: &str) -> Result<Option<PortCode>, RegistryError> {
        let normalized = normalize_port(name);
        if normalized.is_empty() {
            return Ok(None);
        }
        Ok(LOCODE_INDEX.get(&normalized).cloned())
    }
}

// ---------------------------------------------------------------------------
// Alias fallback
// ---------------------------------------------------------------------------

/// Groups of names for the same port. Last resort when the registry is
/// unavailable or does not know a name.
const ALIAS_GROUPS: &[&[&str]] = &[
    &["CHITTAGONG", "CHATTOGRAM", "CTG"],
    &["MUMBAI", "BOMBAY"],
    &["NHAVA SHEVA", "JAWAHARLAL NEHRU", "JNPT", "JNPORT"],
    &["CHENNAI", "MADRAS"],
    &["KOLKATA", "CALCUTTA"],
    &["KOCHI", "COCHIN"],
    &["HO CHI MINH", "HO CHI MINH CITY", "SAIGON", "HCMC"],
    &["GUANGZHOU", "CANTON"],
    &["YANGON", "RANGOON"],
    &["QINGDAO", "TSINGTAO"],
    &["XIAMEN", "AMOY"],
    &["BUSAN", "PUSAN"],
    &["ANTWERP", "ANTWERPEN", "ANVERS"],
    &["GENOA", "GENOVA"],
    &["TIANJIN", "XINGANG"],
];

fn alias_group(normalized: &str) -> Option<usize> {
    ALIAS_GROUPS
        .iter()
        .position(|group| group.iter().any(|alias| *alias == normalized))
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Normalize a port name: uppercase, text after the first comma (country)
/// dropped, punctuation removed, `PORT OF` / `HARBOUR` noise removed.
pub fn normalize_port(name: &str) -> String {
    let head = name.split(',').next().unwrap_or("");
    let cleaned: String = head
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let meaningful: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !PORT_NOISE.contains(t))
        .collect();
    if meaningful.is_empty() {
        tokens.join(" ")
    } else {
        meaningful.join(" ")
    }
}

/// How two port names were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortMatchMethod {
    /// Identical after normalization.
    Exact,
    /// One name contained in the other.
    Substring,
    /// Both resolve to the same registry code.
    Registry,
    /// Both in the same alias group.
    Alias,
    /// No stage matched.
    NoMatch,
}

impl PortMatchMethod {
    /// Confidence attached to this method.
    pub fn confidence(self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Registry => 0.95,
            Self::Substring => 0.9,
            Self::Alias => 0.85,
            Self::NoMatch => 0.0,
        }
    }
}

/// Result of comparing two port names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortMatch {
    /// Whether any stage matched.
    pub matched: bool,
    /// Stage confidence.
    pub confidence: f64,
    /// Deciding stage.
    pub method: PortMatchMethod,
    /// Registry code, when the registry stage matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<PortCode>,
}

impl PortMatch {
    fn from_method(method: PortMatchMethod, code: Option<PortCode>) -> Self {
        Self {
            matched: method != PortMatchMethod::NoMatch,
            confidence: method.confidence(),
            method,
            code,
        }
    }
}

/// Staged port matcher over a shared registry.
#[derive(Debug, Clone)]
pub struct PortMatcher {
    registry: Arc<dyn PortRegistry>,
}

impl Default for PortMatcher {
    fn default() -> Self {
        Self::new(Arc::new(StaticPortRegistry))
    }
}

impl PortMatcher {
    /// Create a matcher over the given registry.
    pub fn new(registry: Arc<dyn PortRegistry>) -> Self {
        Self { registry }
    }

    /// Compare two port names.
    pub fn match_ports(&self, a: &str, b: &str) -> PortMatch {
        let na = normalize_port(a);
        let nb = normalize_port(b);
        if na.is_empty() || nb.is_empty() {
            return PortMatch::from_method(PortMatchMethod::NoMatch, None);
        }
        if na == nb {
            return PortMatch::from_method(PortMatchMethod::Exact, None);
        }
        let (shorter, longer) = if na.len() <= nb.len() { (&na, &nb) } else { (&nb, &na) };
        if shorter.chars().count() >= MIN_SUBSTRING_LEN && longer.contains(shorter.as_str()) {
            return PortMatch::from_method(PortMatchMethod::Substring, None);
        }
        if let Some(code) = self.registry_equivalent(a, b) {
            return PortMatch::from_method(PortMatchMethod::Registry, Some(code));
        }
        match (alias_group(&na), alias_group(&nb)) {
            (Some(ga), Some(gb)) if ga == gb => PortMatch::from_method(PortMatchMethod::Alias, None),
            _ => PortMatch::from_method(PortMatchMethod::NoMatch, None),
        }
    }

    fn registry_equivalent(&self, a: &str, b: &str) -> Option<PortCode> {
        let resolve = |name: &str| match self.registry.resolve(name) {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(port = %name, error = %err, "port registry lookup failed, using alias table");
                None
            }
        };
        let ca = resolve(a)?;
        let cb = resolve(b)?;
        (ca == cb).then_some(ca)
    }
}
