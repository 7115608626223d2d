//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::error::Result;

/// Turn a configured site or sitemap entry into a sitemap URL.
///
/// Entries ending in `.xml` are taken as-is; anything else is treated as a
/// site and joined with `sitemap.xml`. A missing scheme defaults to https.
pub fn sitemap_url_for(entry: &str) -> Result<String> {
    let entry = entry.trim();
    let with_scheme = if entry.contains("://") {
        entry.to_string()
    } else {
        format!("https://{entry}")
    };

    let url = Url::parse(&with_scheme)?;
    if url.path().ends_with(".xml") {
        return Ok(url.to_string());
    }
    Ok(url.join("sitemap.xml")?.to_string())
}

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}
