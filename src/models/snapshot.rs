// src/models/snapshot.rs

//! Per-feed snapshot bundle and the daily gating state derived from it.

use std::path::PathBuf;

use chrono::NaiveDate;

/// Everything stored locally for one feed.
///
/// Missing files are `None`, meaning "no prior data".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Most recent successfully fetched document
    pub current: Option<String>,
    /// The document that was `current` before the last successful fetch
    pub previous: Option<String>,
    /// Live archive copy, if the notifier has not consumed it yet
    pub archive: Option<ArchiveFile>,
    /// Last calendar day a fetch succeeded
    pub last_update: Option<NaiveDate>,
}

/// A dated copy of `current` handed to the notification layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// Gating state of a feed on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Nothing fetched yet
    Cold,
    /// Last successful fetch happened on an earlier day
    StaleDay,
    /// Already fetched today; serve the stored diff
    FetchedToday,
}

impl Snapshot {
    /// Derive the gating state for `today`.
    pub fn state(&self, today: NaiveDate) -> SourceState {
        match (self.last_update, &self.current) {
            (Some(date), Some(_)) if date == today => SourceState::FetchedToday,
            (_, None) => SourceState::Cold,
            _ => SourceState::StaleDay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn empty_snapshot_is_cold() {
        assert_eq!(Snapshot::default().state(day(1)), SourceState::Cold);
    }

    #[test]
    fn marker_without_content_is_cold() {
        let snapshot = Snapshot {
            last_update: Some(day(1)),
            ..Snapshot::default()
        };
        assert_eq!(snapshot.state(day(1)), SourceState::Cold);
    }

    #[test]
    fn same_day_is_fetched_and_next_day_is_stale() {
        let snapshot = Snapshot {
            current: Some("<urlset/>".into()),
            last_update: Some(day(1)),
            ..Snapshot::default()
        };
        assert_eq!(snapshot.state(day(1)), SourceState::FetchedToday);
        assert_eq!(snapshot.state(day(2)), SourceState::StaleDay);
    }

    #[test]
    fn content_without_marker_is_stale() {
        let snapshot = Snapshot {
            current: Some("<urlset/>".into()),
            ..Snapshot::default()
        };
        assert_eq!(snapshot.state(day(1)), SourceState::StaleDay);
    }
}
