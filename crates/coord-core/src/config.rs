//! Engine configuration
//!
//! Settings that shape how an [`Engine`](crate::Engine) resolves values,
//! loadable from TOML:
//!
//! ```toml
//! exact_match_policy = "reject"
//! source_order = ["overrides", "application", "environment"]
//!
//! [coordinates]
//! region = "west"
//! environment = "test"
//! ```

use crate::coordinates::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What to do when more than one source matches a request exactly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExactMatchPolicy {
    /// Treat them as a tie: authoritative flag first, then the arbiters
    #[default]
    Arbitrate,
    /// Fail the request with [`Error::DuplicateExactMatch`](crate::Error::DuplicateExactMatch)
    Reject,
}

/// Declarative engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default coordinates for [`Engine::resolve`](crate::Engine::resolve).
    /// When absent they are bootstrapped from the sources.
    pub coordinates: Option<Coordinates>,

    pub exact_match_policy: ExactMatchPolicy,

    /// Source ids, most preferred first. When non-empty a
    /// [`RankedArbiter`](crate::RankedArbiter) with this order is added after
    /// any explicitly registered arbiters.
    pub source_order: Vec<String>,
}

impl EngineConfig {
    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, "Loading engine config");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }
}
