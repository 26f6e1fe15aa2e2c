//! # lcx-cli: Operator CLI
//!
//! The `lcx` binary runs the examination pipeline over JSON fixture files
//! and lints rule packs. It sits outside the core: no library crate
//! depends on it.
//!
//! ```bash
//! lcx validate --baseline lc.json --documents presentation.json --today 2026-03-01
//! lcx rules check packs/bank-overlay.yaml
//! lcx rules list
//! ```

pub mod rules;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a file and parse it as JSON.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
