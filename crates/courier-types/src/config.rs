//! # Discovery Configuration
//!
//! Startup configuration consumed by the discovery engine: which module
//! specifiers to scan, and how to treat a scan that finds nothing.

use serde::{Deserialize, Serialize};

/// Configuration for a discovery pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Ordered module specifiers to scan (e.g. `"orders.commands"`).
    pub specifiers: Vec<String>,

    /// When `true`, a pass that registers zero handlers overall is an
    /// error. Default is lenient: an empty registry is returned and the
    /// caller decides.
    pub strict: bool,
}

impl DiscoveryConfig {
    /// Build a lenient configuration from an ordered list of specifiers.
    pub fn new<I, S>(specifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            specifiers: specifiers.into_iter().map(Into::into).collect(),
            strict: false,
        }
    }

    /// Enable strict mode.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}
