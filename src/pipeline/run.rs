// src/pipeline/run.rs

use crate::error::Result;
use crate::models::{CheckOutcome, CheckStatus, Feed};
use crate::services::{Notifier, SitemapWatcher, dispatch};
use crate::utils::sitemap_url_for;

/// One line of a batch run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRow {
    pub feed: String,
    pub status: CheckStatus,
    pub new_urls: usize,
}

/// Totals of a batch run, plus one row per feed in the order processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub failed: usize,
    pub new_urls: usize,
    pub delivered: usize,
    pub feeds: Vec<FeedRow>,
}

impl RunSummary {
    async fn record(&mut self, feed: &Feed, outcome: &CheckOutcome, notifier: &dyn Notifier) {
        self.checked += 1;
        self.push_row(feed.as_str(), outcome);
        if !outcome.success {
            self.failed += 1;
            log::warn!("{}", outcome.message);
            return;
        }

        self.new_urls += outcome.new_urls.len();
        match dispatch(feed, outcome, notifier).await {
            Ok(true) => self.delivered += 1,
            Ok(false) => {}
            Err(e) => log::error!("Delivery failed for {}: {}", feed, e),
        }
    }

    fn push_row(&mut self, feed: &str, outcome: &CheckOutcome) {
        self.feeds.push(FeedRow {
            feed: feed.to_string(),
            status: outcome.status,
            new_urls: outcome.new_urls.len(),
        });
    }

    /// Log one line per feed followed by the totals.
    pub fn report(&self) {
        for row in &self.feeds {
            log::info!("{}: {} ({} new URLs)", row.feed, row.status, row.new_urls);
        }
        log::info!(
            "[SUMMARY] checked: {}, failed: {}, new URLs: {}, delivered: {}",
            self.checked,
            self.failed,
            self.new_urls,
            self.delivered
        );
    }
}

/// Check every registered feed and dispatch whatever is new.
pub async fn run_checks(watcher: &SitemapWatcher, notifier: &dyn Notifier) -> RunSummary {
    let mut summary = RunSummary::default();
    check_into(&mut summary, watcher, notifier).await;
    summary
}

async fn check_into(summary: &mut RunSummary, watcher: &SitemapWatcher, notifier: &dyn Notifier) {
    for (feed, outcome) in watcher.check_all().await {
        summary.record(&feed, &outcome, notifier).await;
    }
}

/// Run the full pipeline: register configured domains, then check all feeds.
///
/// Feeds added in the first step are already up to date for today, so the
/// second step serves them from disk without fetching again. A bad domain
/// entry is reported and skipped.
pub async fn run_pipeline(
    watcher: &SitemapWatcher,
    domains: &[String],
    notifier: &dyn Notifier,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    log::info!("[STEP 1/2] Registering {} configured domains", domains.len());
    for domain in domains {
        let url = match sitemap_url_for(domain) {
            Ok(url) => url,
            Err(e) => {
                let outcome = CheckOutcome::failed(format!("Skipping domain {domain}: {e}"));
                log::warn!("{}", outcome.message);
                summary.failed += 1;
                summary.push_row(domain, &outcome);
                continue;
            }
        };
        if watcher.is_watched(&url).await {
            continue;
        }

        let outcome = watcher.add_feed(&url).await;
        if outcome.success {
            log::info!("{}", outcome.message);
            let feed = Feed::parse(&url)?;
            if let Err(e) = dispatch(&feed, &outcome, notifier).await {
                log::error!("Delivery failed for {}: {}", feed, e);
            }
        } else {
            summary.failed += 1;
            summary.push_row(&url, &outcome);
            log::warn!("{}", outcome.message);
        }
    }

    log::info!("[STEP 2/2] Checking all feeds");
    check_into(&mut summary, watcher, notifier).await;

    Ok(summary)
}
