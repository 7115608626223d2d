// src/models/feed.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{AppError, Result};

/// A watched sitemap, identified by its normalized URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feed(String);

impl Feed {
    /// Parse and normalize a sitemap URL.
    ///
    /// Only `http` and `https` URLs with a host are accepted. Fragments are
    /// dropped since they never reach the server.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut url = Url::parse(raw.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                raw.trim()
            )));
        }
        if url.host_str().is_none() {
            return Err(AppError::validation(format!("missing host in {}", raw.trim())));
        }
        url.set_fragment(None);
        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name for this feed's snapshots.
    ///
    /// Keyed by host, with a short digest of the full URL so that two
    /// sitemaps on the same origin never share state.
    pub fn storage_key(&self) -> String {
        let host = Url::parse(&self.0)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let host: String = host
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();

        let digest = Sha256::digest(self.0.as_bytes());
        format!("{}_{}", host, &hex::encode(digest)[..8])
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Feed {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
