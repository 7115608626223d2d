// src/services/resolver.rs

//! Sitemap index expansion.
//!
//! Follows `<sitemap><loc>` entries of index documents down to leaf
//! sitemaps and returns the union of their URLs. Branches that revisit a
//! document or exceed the depth limit are cut off with a warning.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::Result;
use crate::pipeline::sitemap::{SitemapDocument, parse_sitemap};
use crate::services::DocumentFetcher;
use crate::utils::resolve;

/// Expands sitemap indexes into flat URL sets.
#[derive(Clone)]
pub struct IndexResolver {
    fetcher: Arc<dyn DocumentFetcher>,
    max_depth: usize,
}

/// Traversal state shared across one resolution.
#[derive(Default)]
struct Walk {
    visited: HashSet<String>,
    urls: BTreeSet<String>,
}

impl IndexResolver {
    /// `max_depth` is the number of nested index levels followed below the root.
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, max_depth: usize) -> Self {
        Self { fetcher, max_depth }
    }

    /// Flattened, deduplicated leaf URL set reachable from `url`.
    ///
    /// Only a failure to fetch or parse the root document is an error;
    /// broken children contribute nothing.
    pub async fn resolve_all(&self, url: &str) -> Result<BTreeSet<String>> {
        let root = parse_sitemap(&self.fetcher.fetch(url).await?)?;

        let mut walk = Walk::default();
        walk.visited.insert(url.to_string());
        self.expand(url.to_string(), root, 0, &mut walk).await;

        log::info!("Resolved {} URLs from {}", walk.urls.len(), url);
        Ok(walk.urls)
    }

    fn expand<'a>(
        &'a self,
        url: String,
        doc: SitemapDocument,
        depth: usize,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, ()> {
        async move {
            if !doc.is_index() {
                walk.urls.extend(doc.locs);
                return;
            }

            if depth >= self.max_depth {
                log::warn!(
                    "Index {} is nested deeper than {} levels; skipping its {} children",
                    url,
                    self.max_depth,
                    doc.locs.len()
                );
                return;
            }

            for loc in doc.locs {
                let child = resolve(&url, &loc).unwrap_or(loc);
                if !walk.visited.insert(child.clone()) {
                    log::warn!("Cycle in sitemap index: {} already visited (from {})", child, url);
                    continue;
                }

                let body = match self.fetcher.fetch(&child).await {
                    Ok(body) => body,
                    Err(e) => {
                        log::warn!("Skipping child sitemap {}: {}", child, e);
                        continue;
                    }
                };
                match parse_sitemap(&body) {
                    Ok(child_doc) => self.expand(child, child_doc, depth + 1, walk).await,
                    Err(e) => log::warn!("Skipping malformed child sitemap {}: {}", child, e),
                }
            }
        }
        .boxed()
    }
}
