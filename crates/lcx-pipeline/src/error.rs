//! # Pipeline Errors
//!
//! Construction-time failures. A constructed pipeline never returns an
//! error for data problems in a presentation; those become issues.

use std::path::PathBuf;

use lcx_rules::RuleLoadError;
use thiserror::Error;

use crate::orchestrator::PipelineStage;

/// Errors loading or validating pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration is not valid YAML for the expected shape.
    #[error("invalid configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error("invalid {section} configuration: {message}")]
    Invalid {
        /// Section name (`gate`, `scoring`, ...).
        section: &'static str,
        /// What is wrong.
        message: String,
    },
}

/// Errors from pipeline construction and stage sequencing.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration fault.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A rule pack failed to load. Fatal before any validation runs.
    #[error("rule pack load failed: {0}")]
    Rules(#[from] RuleLoadError),

    /// Stage sequencing bug.
    #[error("invalid pipeline transition from {from} to {to}")]
    InvalidTransition {
        /// Current stage.
        from: PipelineStage,
        /// Requested stage.
        to: PipelineStage,
    },
}
