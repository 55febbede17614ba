//! Response cache configuration.

use std::num::NonZeroUsize;

const DEFAULT_RESPONSE_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve public GET responses from memory.
    pub enabled: bool,
    /// Maximum cached responses before LRU eviction.
    pub response_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            response_limit: DEFAULT_RESPONSE_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            response_limit: settings.capacity,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// The response limit as `NonZeroUsize`, clamping zero to one.
    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
