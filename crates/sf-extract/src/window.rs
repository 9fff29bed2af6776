//! Fetch modes and their time windows.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};

/// Longest window the replication calls accept.
pub const MAX_WINDOW_DAYS: i64 = 30;

/// A half-open time range `[start, end)` for updated/deleted fetches.
///
/// Construction validates the range, so a `TimeWindow` in hand is always
/// usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window, rejecting `start >= end` and ranges over 30 days.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::config(format!(
                "window start {start} must be before end {end}"
            )));
        }
        if end - start > Duration::days(MAX_WINDOW_DAYS) {
            return Err(Error::config(format!(
                "window {start} .. {end} is longer than {MAX_WINDOW_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }

    /// The window ending now and reaching `hours` back.
    pub fn last_hours(hours: i64) -> Result<Self> {
        let end = Utc::now();
        let start = Duration::try_hours(hours)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| Error::config(format!("window of {hours} hours is out of range")))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// What a fetch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Every record matching the query.
    #[default]
    All,
    /// Records modified within the window.
    UpdatedSince(TimeWindow),
    /// Records deleted within the window, paired with their deletion time.
    DeletedSince(TimeWindow),
}

impl FetchMode {
    /// The window of an incremental mode.
    pub fn window(&self) -> Option<&TimeWindow> {
        match self {
            FetchMode::All => None,
            FetchMode::UpdatedSince(w) | FetchMode::DeletedSince(w) => Some(w),
        }
    }

    /// Updated and deleted fetches go through the replication API.
    pub fn requires_replication(&self) -> bool {
        self.window().is_some()
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, FetchMode::DeletedSince(_))
    }
}
