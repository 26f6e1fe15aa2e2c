//! Pipeline configuration.
//!
//! Every threshold the pipeline uses, grouped by component. All sections
//! default, so a YAML file only needs to name what it overrides:
//!
//! ```yaml
//! scoring:
//!   critical_cap: 20
//! crossdoc:
//!   default_tolerance: 0.03
//! rules:
//!   pack_paths: [packs/bank-overlay.yaml]
//! ```
//!
//! [`PipelineConfig::load`] reads the file named by `LCX_CONFIG` and falls
//! back to defaults when it is unset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lcx_crossdoc::CrossDocConfig;
use lcx_match::MatchingConfig;
use lcx_rules::RuleDomain;

use crate::error::ConfigError;
use crate::gate::GateConfig;
use crate::issue_engine::IssueEngineConfig;
use crate::scorer::ScoringPolicy;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "LCX_CONFIG";

/// Rule-pack settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Run the rule engine at all.
    pub enabled: bool,
    /// Load the embedded UCP 600 / ISBP 745 packs.
    pub include_builtin_packs: bool,
    /// Additional pack files, layered by tier.
    pub pack_paths: Vec<PathBuf>,
    /// Restrict execution to these domains. `None` runs every domain.
    pub categories: Option<Vec<RuleDomain>>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_builtin_packs: true,
            pack_paths: Vec::new(),
            categories: None,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Validation gate thresholds.
    pub gate: GateConfig,
    /// Issue engine settings.
    pub issues: IssueEngineConfig,
    /// Cross-document tolerances and windows.
    pub crossdoc: CrossDocConfig,
    /// Fuzzy matching thresholds.
    pub matching: MatchingConfig,
    /// Scoring constants.
    pub scoring: ScoringPolicy,
    /// Rule packs.
    pub rules: RulesConfig,
}

fn unit_range(section: &'static str, name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            section,
            message: format!("{name} must be within [0, 1], got {value}"),
        })
    }
}

impl PipelineConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::info!(path = %path.display(), "pipeline configuration loaded");
        Ok(config)
    }

    /// Load from the file named by `LCX_CONFIG`, or defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_path(Path::new(&path)),
            _ => {
                tracing::debug!("{CONFIG_ENV} not set; using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Serialize as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gate = &self.gate;
        unit_range("gate", "min_critical_completeness", gate.min_critical_completeness)?;
        unit_range("gate", "min_completeness", gate.min_completeness)?;
        unit_range("gate", "warn_completeness", gate.warn_completeness)?;
        if gate.warn_completeness < gate.min_completeness {
            return Err(ConfigError::Invalid {
                section: "gate",
                message: format!(
                    "warn_completeness ({}) must not be below min_completeness ({})",
                    gate.warn_completeness, gate.min_completeness
                ),
            });
        }

        unit_range("issues", "low_confidence_threshold", self.issues.low_confidence_threshold)?;

        let m = &self.matching;
        unit_range("matching", "party_threshold", m.party_threshold)?;
        unit_range("matching", "strict_party_threshold", m.strict_party_threshold)?;
        unit_range("matching", "containment_confidence", m.containment_confidence)?;
        unit_range("matching", "key_token_boost", m.key_token_boost)?;
        unit_range("matching", "goods_threshold", m.goods_threshold)?;

        self.crossdoc
            .validate()
            .map_err(|message| ConfigError::Invalid { section: "crossdoc", message })?;
        self.scoring
            .validate()
            .map_err(|message| ConfigError::Invalid { section: "scoring", message })?;

        if self.rules.enabled && !self.rules.include_builtin_packs && self.rules.pack_paths.is_empty() {
            tracing::warn!("rule engine enabled with no packs; no rules will run");
        }
        Ok(())
    }
}
