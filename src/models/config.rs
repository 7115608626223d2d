//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::sitemap_url_for;

/// Upper bound accepted for `fetcher.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Sitemap index expansion limits
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Batch checking settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.fetcher.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(AppError::validation(format!(
                "fetcher.timeout_secs must be <= {MAX_TIMEOUT_SECS}"
            )));
        }
        if self.resolver.max_depth == 0 {
            return Err(AppError::validation("resolver.max_depth must be > 0"));
        }
        if self.watch.max_concurrent == 0 {
            return Err(AppError::validation("watch.max_concurrent must be > 0"));
        }
        for domain in &self.watch.domains {
            sitemap_url_for(domain).map_err(|e| {
                AppError::validation(format!("watch.domains entry '{domain}': {e}"))
            })?;
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Sitemap index expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum nesting of index documents followed below the root
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::max_depth(),
        }
    }
}

/// Batch checking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Maximum feeds checked at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Sites or sitemap URLs registered before a pipeline run
    #[serde(default)]
    pub domains: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            domains: Vec::new(),
        }
    }
}

mod defaults {
    // Some origins reject non-browser clients outright.
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_depth() -> usize {
        5
    }
    pub fn max_concurrent() -> usize {
        4
    }
}
