//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the appraisal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-request timeout applied when the caller does not pass one.
    pub default_timeout: Duration,
    /// Whether single-metric results are served from the in-memory cache.
    pub cache_enabled: bool,
    /// Fixed expiry for cached results.
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl EngineConfig {
    /// Creates a minimal configuration for testing: short timeout, no
    /// caching.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            default_timeout: Duration::from_secs(5),
            cache_enabled: false,
            cache_ttl: Duration::from_secs(60),
        }
    }
}
