//! Worker configuration, injected at construction time.

use url::Url;

use crate::config::Settings;

/// Everything the worker needs to know: the namespace version, the
/// precache set, exclusion substrings, the offline fallback route and
/// the upstream origin.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Cache namespace version. Bumping it invalidates every previously
    /// cached entry on the next activation.
    pub cache_version: String,
    /// Paths fetched and stored at install time.
    pub precache: Vec<String>,
    /// Fallback route served to offline document navigations. Validated
    /// at config load to be a member of `precache`.
    pub offline_path: String,
    /// URL substrings that are never intercepted for caching.
    pub exclude_substrings: Vec<String>,
    /// Upstream origin that request paths are joined against.
    pub origin: Url,
}

impl WorkerConfig {
    /// Whether a URL must bypass the cache entirely.
    pub fn is_excluded(&self, url: &Url) -> bool {
        let url = url.as_str();
        self.exclude_substrings
            .iter()
            .any(|needle| url.contains(needle.as_str()))
    }
}

impl From<&Settings> for WorkerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            cache_version: settings.worker.cache_version.clone(),
            precache: settings.worker.precache.clone(),
            offline_path: settings.worker.offline_path.clone(),
            exclude_substrings: settings.worker.exclude_substrings.clone(),
            origin: settings.origin.base_url.clone(),
        }
    }
}
