//! Error types for port registries.

use thiserror::Error;

/// A port registry could not answer.
///
/// Never surfaced by [`crate::PortMatcher`]; it degrades to the alias table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Backing store unreachable.
    #[error("port registry unavailable: {0}")]
    Unavailable(String),

    /// Registry data could not be interpreted.
    #[error("port registry data is corrupt: {0}")]
    Corrupt(String),
}
