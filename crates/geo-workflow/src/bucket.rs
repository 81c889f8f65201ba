//! Calendar time buckets
//!
//! A plan's range is cut into contiguous month or year buckets using real
//! calendar arithmetic. The first and last buckets are clipped to the
//! range, so buckets never reach outside what the caller asked for.

use crate::engine::DateWindow;
use chrono::{Datelike, NaiveDate};
use geo_plan::TimeRange;
use serde::{Deserialize, Serialize};

/// Bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One calendar month
    Monthly,
    /// One calendar year
    Yearly,
}

/// One independent unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucket {
    /// Position in chronological order
    pub index: usize,
    /// First day
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
    /// Bucket size
    pub granularity: Granularity,
}

impl TimeBucket {
    /// Day after the last day
    #[inline]
    #[must_use]
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }

    /// Remote date filter for this bucket
    #[inline]
    #[must_use]
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start, self.end_exclusive())
    }

    /// Fixed date the bucket's value is reported at
    ///
    /// The 15th of the month, or 1 July for yearly buckets, regardless of
    /// clipping or which days actually had data.
    #[must_use]
    pub fn representative_date(&self) -> NaiveDate {
        let date = match self.granularity {
            Granularity::Monthly => {
                NaiveDate::from_ymd_opt(self.start.year(), self.start.month(), 15)
            }
            Granularity::Yearly => NaiveDate::from_ymd_opt(self.start.year(), 7, 1),
        };
        date.unwrap_or(self.start)
    }

    /// Short label: `YYYY-MM` or `YYYY`
    #[must_use]
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Monthly => self.start.format("%Y-%m").to_string(),
            Granularity::Yearly => self.start.format("%Y").to_string(),
        }
    }
}

/// Last day of a calendar month
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn period_end(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Monthly => last_day_of_month(date.year(), date.month()),
        Granularity::Yearly => {
            NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(NaiveDate::MAX)
        }
    }
}

/// Partition a range into contiguous calendar buckets
///
/// Buckets are returned in chronological order and together cover
/// `[start, end]` exactly once.
#[must_use]
pub fn partition(range: &TimeRange, granularity: Granularity) -> Vec<TimeBucket> {
    let mut buckets = Vec::new();
    let mut cursor = range.start();

    while cursor <= range.end() {
        let end = period_end(cursor, granularity).min(range.end());
        buckets.push(TimeBucket {
            index: buckets.len(),
            start: cursor,
            end,
            granularity,
        });
        match end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    buckets
}
