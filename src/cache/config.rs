//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_SITEMAP_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_ENTRY_LIMIT: usize = 16;

/// Runtime cache configuration, resolved from deployment settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Enable the document cache.
    pub enabled: bool,
    /// Sliding window for the sitemap document set: the entry expires only
    /// after this long with no access.
    pub sitemap_ttl: Duration,
    /// Maximum number of cached slots.
    pub entry_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sitemap_ttl: DEFAULT_SITEMAP_TTL,
            entry_limit: DEFAULT_ENTRY_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            sitemap_ttl: Duration::from_secs(settings.sitemap_ttl_seconds.get()),
            entry_limit: settings.entry_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the slot limit as NonZeroUsize, clamping to 1 if zero.
    pub fn entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.entry_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
