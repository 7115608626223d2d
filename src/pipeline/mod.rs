//! Document processing and run entry points.
//!
//! - `sitemap`: parse sitemap and sitemap index documents
//! - `diff`: new-URL calculation between two documents
//! - `run_checks` / `run_pipeline`: batch runs with notification dispatch

pub mod diff;
pub mod run;
pub mod sitemap;

pub use diff::{calculate_diff, url_entries};
pub use run::{FeedRow, RunSummary, run_checks, run_pipeline};
pub use sitemap::{SitemapDocument, SitemapKind, parse_sitemap};
