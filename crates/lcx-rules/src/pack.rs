//! # Rule Packs
//!
//! A pack is a versioned YAML document of rules at one tier. Tiers layer:
//! `core` rules ship with the engine, `extended` packs add practice
//! checks, `bank` packs overlay institution-specific policy. When two
//! tiers define the same rule id, the higher tier wins.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RuleLoadError;
use crate::rule::RuleDefinition;

/// Pack tier, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackTier {
    /// Built-in baseline rules.
    Core,
    /// Additional practice rules.
    Extended,
    /// Bank overlays.
    Bank,
}

impl fmt::Display for PackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Core => "core",
            Self::Extended => "extended",
            Self::Bank => "bank",
        })
    }
}

/// A versioned set of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePack {
    /// Pack identifier, e.g. `ucp600-core`.
    pub pack_id: String,
    /// Pack version string.
    pub version: String,
    /// Tier.
    pub tier: PackTier,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Rules in file order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

const UCP600_CORE: &str = include_str!("../packs/ucp600_core.yaml");
const ISBP745_EXTENDED: &str = include_str!("../packs/isbp745_extended.yaml");

impl RulePack {
    /// Parse a pack from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RuleLoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a pack file.
    pub fn from_path(path: &Path) -> Result<Self, RuleLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Packs embedded in the binary.
    pub fn builtin() -> Result<Vec<Self>, RuleLoadError> {
        Ok(vec![
            Self::from_yaml_str(UCP600_CORE)?,
            Self::from_yaml_str(ISBP745_EXTENDED)?,
        ])
    }
}
