//! Storage for the watcher's durable state.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Optional configuration
//! ├── feeds.json            # Registry: watched sitemap URLs
//! └── sitemaps/             # One directory per feed
//!     └── example.com_1a2b3c4d/
//!         ├── current.xml
//!         ├── latest.xml
//!         ├── last_update
//!         └── archive/
//!             └── 2026-03-01.xml
//! ```

pub mod local;
pub mod registry;
pub mod snapshot;

// Re-export for convenience
pub use local::LocalStorage;
pub use registry::FeedRegistry;
pub use snapshot::SnapshotStore;
