//! Diff calculation between two stored sitemap documents.
//!
//! Computes the URLs present in the newer document but not the older one,
//! which is what gets handed to the notifier.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::DiffResult;
use crate::pipeline::sitemap::parse_sitemap;

/// Flattened `<url><loc>` set of a document. Index documents yield nothing.
pub fn url_entries(content: &str) -> Result<BTreeSet<String>> {
    Ok(parse_sitemap(content)?.into_urls())
}

/// URLs in `newer` that are absent from `older`.
///
/// A malformed document on either side yields an empty result: the fetch
/// already succeeded, so a bad document is logged rather than surfaced.
pub fn calculate_diff(newer: &str, older: &str) -> DiffResult {
    let newer_set = match url_entries(newer) {
        Ok(set) => set,
        Err(e) => {
            log::warn!("Skipping diff, newer document is malformed: {}", e);
            return DiffResult::default();
        }
    };
    let older_set = match url_entries(older) {
        Ok(set) => set,
        Err(e) => {
            log::warn!("Skipping diff, older document is malformed: {}", e);
            return DiffResult::default();
        }
    };

    DiffResult {
        new_urls: newer_set.difference(&older_set).cloned().collect(),
    }
}
