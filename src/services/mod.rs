//! Service layer for the sitemap watcher.
//!
//! This module contains the business logic for:
//! - Fetching remote documents (`HttpFetcher`)
//! - Expanding sitemap indexes (`IndexResolver`)
//! - Daily fetch/diff/rotate gating (`UpdateScheduler`)
//! - Notification hand-off (`Notifier`, `dispatch`)
//! - The feed-level facade (`SitemapWatcher`)

mod clock;
mod fetcher;
mod locks;
mod notify;
mod resolver;
mod scheduler;
mod watcher;

pub use clock::{Clock, FixedClock, SystemClock};
pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use locks::KeyedLock;
pub use notify::{LogNotifier, Notifier, dispatch};
pub use resolver::IndexResolver;
pub use scheduler::UpdateScheduler;
pub use watcher::SitemapWatcher;
