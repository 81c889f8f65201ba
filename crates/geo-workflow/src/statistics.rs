//! Descriptive statistics over a completed series
//!
//! Point-anchored only: the trend compares the first and last points, it is
//! not a fitted line.

use crate::result::TimeSeriesPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Percent change beyond which a series is no longer "stable"
pub const TREND_THRESHOLD_PERCENT: f64 = 5.0;

/// Coarse direction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClass {
    /// Above `+5%`
    Increasing,
    /// Below `-5%`
    Decreasing,
    /// Within `±5%`
    Stable,
}

impl TrendClass {
    /// Classify a first-to-last percent change
    #[must_use]
    pub fn classify(change_percent: f64) -> Self {
        if change_percent > TREND_THRESHOLD_PERCENT {
            TrendClass::Increasing
        } else if change_percent < -TREND_THRESHOLD_PERCENT {
            TrendClass::Decreasing
        } else {
            TrendClass::Stable
        }
    }

    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrendClass::Increasing => "increasing",
            TrendClass::Decreasing => "decreasing",
            TrendClass::Stable => "stable",
        }
    }
}

impl Display for TrendClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of an ordered series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Smallest value
    pub min: f64,
    /// Date of the first occurrence of `min`
    pub min_date: NaiveDate,
    /// Largest value
    pub max: f64,
    /// Date of the first occurrence of `max`
    pub max_date: NaiveDate,
    /// Population standard deviation
    pub std_dev: f64,
    /// Trend text, e.g. `"increasing (+40.0%)"`
    pub trend: String,
    /// First-to-last percent change; `None` when the first value is zero
    pub change_percent: Option<f64>,
}

/// Summarize a series; `None` when empty
#[must_use]
pub fn summarize(series: &[TimeSeriesPoint]) -> Option<SeriesStatistics> {
    let first = series.first()?;
    let last = series.last()?;
    let count = series.len() as f64;

    let mean = series.iter().map(|p| p.value).sum::<f64>() / count;
    let variance = series
        .iter()
        .map(|p| (p.value - mean).powi(2))
        .sum::<f64>()
        / count;

    let mut min = first;
    let mut max = first;
    for point in &series[1..] {
        if point.value < min.value {
            min = point;
        }
        if point.value > max.value {
            max = point;
        }
    }

    let change_percent = percent_change(first.value, last.value);

    Some(SeriesStatistics {
        mean,
        min: min.value,
        min_date: min.date,
        max: max.value,
        max_date: max.date,
        std_dev: variance.sqrt(),
        trend: format_trend(change_percent.unwrap_or(0.0)),
        change_percent,
    })
}

/// `(last - first) / |first| * 100`; undefined for a zero first value
#[must_use]
pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first.abs() * 100.0)
}

/// `"<class> (<signed percent, 1 decimal>%)"`
#[must_use]
pub fn format_trend(change_percent: f64) -> String {
    // `+ 0.0` folds negative zero so it prints as "+0.0"
    let pct = change_percent + 0.0;
    format!("{} ({:+.1}%)", TrendClass::classify(pct), pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = NaiveDate::from_ymd_opt(2023, i as u32 + 1, 15).unwrap();
                TimeSeriesPoint::new(date, *v)
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_series() {
        let stats = summarize(&series(&[0.5, 0.6, 0.4, 0.7])).unwrap();

        assert!(approx(stats.mean, 0.55));
        assert!(approx(stats.min, 0.4));
        assert!(approx(stats.max, 0.7));
        assert_eq!(stats.min_date, NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
        assert_eq!(stats.max_date, NaiveDate::from_ymd_opt(2023, 4, 15).unwrap());
        assert!(approx(stats.std_dev, 0.0125f64.sqrt()));
        assert_eq!(stats.trend, "increasing (+40.0%)");
    }

    #[test]
    fn decreasing_and_stable() {
        let down = summarize(&series(&[10.0, 9.0, 8.0])).unwrap();
        assert_eq!(down.trend, "decreasing (-20.0%)");

        let flat = summarize(&series(&[10.0, 12.0, 10.4])).unwrap();
        assert_eq!(flat.trend, "stable (+4.0%)");
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(TrendClass::classify(5.0), TrendClass::Stable);
        assert_eq!(TrendClass::classify(5.01), TrendClass::Increasing);
        assert_eq!(TrendClass::classify(-5.0), TrendClass::Stable);
        assert_eq!(TrendClass::classify(-5.01), TrendClass::Decreasing);
    }

    #[test]
    fn ties_keep_first_occurrence() {
        let stats = summarize(&series(&[1.0, 3.0, 1.0, 3.0])).unwrap();
        assert_eq!(stats.min_date, NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
        assert_eq!(stats.max_date, NaiveDate::from_ymd_opt(2023, 2, 15).unwrap());
    }

    #[test]
    fn zero_first_value_is_stable_without_percent() {
        let stats = summarize(&series(&[0.0, 5.0])).unwrap();
        assert_eq!(stats.trend, "stable (+0.0%)");
        assert_eq!(stats.change_percent, None);
    }

    #[test]
    fn negative_baseline_uses_magnitude() {
        // -10 °C warming to -5 °C is an increase
        let stats = summarize(&series(&[-10.0, -5.0])).unwrap();
        assert_eq!(stats.trend, "increasing (+50.0%)");
    }

    #[test]
    fn single_point_and_empty() {
        let stats = summarize(&series(&[2.0])).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.trend, "stable (+0.0%)");

        assert!(summarize(&[]).is_none());
    }
}
