//! Client configuration.
//!
//! The site URL used to come from ambient page context; here it is an
//! explicit value, with `SP_SITE_URL` as the fallback when none is given.

use std::time::Duration;

use serde::Deserialize;

/// Environment variable holding the default site URL.
pub const SITE_URL_ENV: &str = "SP_SITE_URL";
/// Environment variable overriding the default page limit.
pub const PAGE_LIMIT_ENV: &str = "SP_PAGE_LIMIT";
/// Environment variable enabling the metadata cache, in seconds.
pub const METADATA_TTL_ENV: &str = "SP_METADATA_TTL_SECS";

/// Default `$top` for item reads. SharePoint's list view threshold is 5000.
pub const DEFAULT_PAGE_LIMIT: u32 = 4999;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub site_url: String,
    pub page_limit: u32,
    /// `None` fetches list metadata on every mutating call.
    pub metadata_cache_ttl_secs: Option<u64>,
    /// Request timeout for `ReqwestTransport`; `None` leaves reqwest's default.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            page_limit: DEFAULT_PAGE_LIMIT,
            metadata_cache_ttl_secs: None,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.to_string(),
            ..Self::default()
        }
    }

    /// Build from `SP_SITE_URL`, `SP_PAGE_LIMIT` and `SP_METADATA_TTL_SECS`.
    /// Unparseable numbers fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            site_url: default_site_url(),
            page_limit: env_parse(PAGE_LIMIT_ENV).unwrap_or(defaults.page_limit),
            metadata_cache_ttl_secs: env_parse(METADATA_TTL_ENV),
            timeout_secs: defaults.timeout_secs,
        }
    }

    pub fn metadata_cache_ttl(&self) -> Option<Duration> {
        self.metadata_cache_ttl_secs.map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// The ambient site URL, or an empty string when unset.
pub fn default_site_url() -> String {
    std::env::var(SITE_URL_ENV).unwrap_or_default()
}

/// Serializes tests that touch `SP_*` environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sharepoint_threshold() {
        let config = ClientConfig::default();
        assert_eq!(config.page_limit, 4999);
        assert!(config.metadata_cache_ttl().is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn from_env_reads_site_and_limits() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(SITE_URL_ENV, "https://contoso.sharepoint.com/sites/env");
        std::env::set_var(PAGE_LIMIT_ENV, "not a number");
        std::env::set_var(METADATA_TTL_ENV, "120");
        let config = ClientConfig::from_env();
        std::env::remove_var(SITE_URL_ENV);
        std::env::remove_var(PAGE_LIMIT_ENV);
        std::env::remove_var(METADATA_TTL_ENV);

        assert_eq!(config.site_url, "https://contoso.sharepoint.com/sites/env");
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.metadata_cache_ttl_secs, Some(120));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"site_url":"https://contoso.sharepoint.com/sites/team","metadata_cache_ttl_secs":60}"#,
        )
        .unwrap();
        assert_eq!(config.site_url, "https://contoso.sharepoint.com/sites/team");
        assert_eq!(config.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(config.metadata_cache_ttl(), Some(Duration::from_secs(60)));
    }
}
