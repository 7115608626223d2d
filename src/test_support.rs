//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::pipeline::sitemap::SITEMAP_NS;
use crate::services::DocumentFetcher;

pub fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{u}</loc><lastmod>2026-01-01</lastmod></url>"))
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="{SITEMAP_NS}">{entries}</urlset>"#)
}

pub fn sitemap_index(children: &[&str]) -> String {
    let entries: String = children
        .iter()
        .map(|u| format!("<sitemap><loc>{u}</loc></sitemap>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="{SITEMAP_NS}">{entries}</sitemapindex>"#
    )
}

/// In-memory fetcher that records every request.
///
/// Unknown URLs fail like a 404.
#[derive(Default)]
pub struct StaticFetcher {
    docs: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, body: String) {
        self.docs.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn fail(&self, url: &str) {
        self.docs.lock().unwrap().remove(url);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        self.docs
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "HTTP 404 Not Found"))
    }
}
