//! Window planning for incremental streams

use crate::pagination::FilterParams;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// Suffix the API recognises for a lower-bound date filter
pub const FILTER_START_SUFFIX: &str = ".filter.start";

/// Bookmarks older than this many days are ignored
pub const RETENTION_DAYS: i64 = 89;

/// Furthest back, in days, a sync may start
pub const MAX_LOOKBACK_DAYS: i64 = 88;

/// A half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl Window {
    /// Create a window
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `instant` falls inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Date filter for this window: `{field}.filter.start=<start in epoch ms>`
    pub fn filter_params(&self, bookmark_field: &str) -> FilterParams {
        let mut params = FilterParams::new();
        params.insert(
            format!("{bookmark_field}{FILTER_START_SUFFIX}"),
            self.start.timestamp_millis().to_string(),
        );
        params
    }
}

/// Plans the day windows an incremental sync walks through
#[derive(Debug, Clone)]
pub struct WindowPlanner {
    attribution_window: TimeDelta,
    window_size: TimeDelta,
}

impl WindowPlanner {
    /// Planner re-scanning the last `attribution_window_days` days
    ///
    /// Anything past retention plans the same as `RETENTION_DAYS + 1`, so the
    /// window is capped there.
    pub fn new(attribution_window_days: i64) -> Self {
        Self {
            attribution_window: TimeDelta::days(
                attribution_window_days.clamp(0, RETENTION_DAYS + 1),
            ),
            window_size: TimeDelta::days(1),
        }
    }

    /// Use windows of `size`; non-positive sizes fall back to one day
    #[must_use]
    pub fn with_window_size(mut self, size: TimeDelta) -> Self {
        self.window_size = if size > TimeDelta::zero() {
            size
        } else {
            TimeDelta::days(1)
        };
        self
    }

    /// Attribution window in whole days
    pub fn attribution_window_days(&self) -> i64 {
        self.attribution_window.num_days()
    }

    /// Where the sync starts, before day rounding.
    ///
    /// Recent bookmarks still re-scan the whole attribution window; very old
    /// ones are replaced by the retention limit. The result never reaches
    /// further back than [`MAX_LOOKBACK_DAYS`].
    pub fn plan_start(&self, last_bookmark: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        let gap_days = (now - last_bookmark).num_days();
        let earliest = now - TimeDelta::days(MAX_LOOKBACK_DAYS);

        let start = if gap_days < self.attribution_window.num_days() {
            now - self.attribution_window
        } else if gap_days > RETENTION_DAYS {
            earliest
        } else {
            last_bookmark
        };

        start.max(earliest)
    }

    /// Windows covering `[midnight(start) - 1d, midnight(now) + 1d)`
    pub fn plan(&self, last_bookmark: DateTime<Utc>, now: DateTime<Utc>) -> Windows {
        let start = self.plan_start(last_bookmark, now);
        let abs_start = midnight(start) - TimeDelta::days(1);
        let abs_end = midnight(now) + TimeDelta::days(1);

        Windows {
            next_start: abs_start,
            end: abs_end,
            step: self.window_size,
        }
    }
}

/// Lazy iterator over consecutive windows
#[derive(Debug, Clone)]
pub struct Windows {
    next_start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: TimeDelta,
}

impl Windows {
    /// Start of the first remaining window
    pub fn start(&self) -> DateTime<Utc> {
        self.next_start
    }

    /// End of the last window
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next_start >= self.end {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.step).min(self.end);
        self.next_start = end;
        Some(Window::new(start, end))
    }
}

/// Truncate to 00:00:00 UTC of the same day
pub fn midnight(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}
