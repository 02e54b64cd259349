//! Statistics Calculator Module
//! Rental metrics, hourly profile, peak hours, per-category means and the
//! count distribution (histogram + kernel density estimate).

use crate::data::processor::{DataProcessor, FilteredView, ProcessorError};
use crate::data::schema::{Season, Weather, SEASON_COL, WEATHER_COL};
use polars::prelude::DataFrame;
use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Number of histogram bins used by the distribution chart.
pub const DEFAULT_BINS: usize = 30;
/// Number of peak hours listed on the dashboard.
pub const DEFAULT_PEAK_HOURS: usize = 3;
/// Sample points along the density curve.
const DENSITY_POINTS: usize = 200;

/// Sum/mean/max of the count column over a set of days.
#[derive(Debug, Clone, Serialize)]
pub struct RentalSummary {
    pub days: usize,
    pub total: i64,
    pub mean: f64,
    pub max: Option<i64>,
}

impl Default for RentalSummary {
    fn default() -> Self {
        Self {
            days: 0,
            total: 0,
            mean: f64::NAN,
            max: None,
        }
    }
}

/// Mean rentals at one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyAverage {
    pub hour: u32,
    pub mean: f64,
    pub samples: usize,
}

/// Mean rentals for one category label (season or weather).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub label: String,
    pub mean: f64,
    pub count: usize,
}

/// Equal-width histogram. `edges.len() == counts.len() + 1` unless empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => f64::NAN,
        }
    }

    /// (center, count) per bin.
    pub fn bars(&self) -> Vec<(f64, usize)> {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| ((edge[0] + edge[1]) / 2.0, count))
            .collect()
    }
}

/// Everything the dashboard shows for one filtered selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub summary: RentalSummary,
    pub hourly: Vec<HourlyAverage>,
    pub peak_hours: Vec<HourlyAverage>,
    pub by_season: Vec<CategoryMean>,
    pub by_weather: Vec<CategoryMean>,
    pub histogram: Histogram,
    pub density: Vec<[f64; 2]>,
}

/// Handles the rental statistics.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute every dashboard figure for a filtered view.
    pub fn compute_dashboard(
        view: &FilteredView,
        bins: usize,
        top_n: usize,
    ) -> Result<DashboardStats, ProcessorError> {
        let counts = DataProcessor::counts(&view.daily)?;
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

        let hourly = Self::hourly_averages(&DataProcessor::hour_counts(&view.hourly)?);
        let peak_hours = Self::peak_hours(&hourly, top_n);
        let histogram = Self::histogram(&values, bins);
        let density = Self::density_curve(&values, &histogram);

        Ok(DashboardStats {
            summary: Self::summarize_counts(&counts),
            hourly,
            peak_hours,
            by_season: Self::season_means(&view.daily)?,
            by_weather: Self::weather_means(&view.daily)?,
            histogram,
            density,
        })
    }

    /// Total, mean and best day. Empty input gives total 0, NaN mean, no max.
    pub fn summarize_counts(counts: &[i64]) -> RentalSummary {
        if counts.is_empty() {
            return RentalSummary::default();
        }

        let mean = counts.iter().map(|&c| c as f64).mean();
        RentalSummary {
            days: counts.len(),
            total: counts.iter().sum(),
            mean,
            max: counts.iter().copied().max(),
        }
    }

    /// Mean count per hour of day, ordered by hour.
    pub fn hourly_averages(pairs: &[(u32, i64)]) -> Vec<HourlyAverage> {
        let mut by_hour: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for &(hour, count) in pairs {
            let entry = by_hour.entry(hour).or_insert((0.0, 0));
            entry.0 += count as f64;
            entry.1 += 1;
        }

        by_hour
            .into_iter()
            .map(|(hour, (sum, samples))| HourlyAverage {
                hour,
                mean: sum / samples as f64,
                samples,
            })
            .collect()
    }

    /// The `n` busiest hours, busiest first. Ties go to the earlier hour.
    pub fn peak_hours(hourly: &[HourlyAverage], n: usize) -> Vec<HourlyAverage> {
        let mut ranked = hourly.to_vec();
        ranked.sort_by(|a, b| b.mean.total_cmp(&a.mean).then(a.hour.cmp(&b.hour)));
        ranked.truncate(n);
        ranked
    }

    pub fn season_means(df: &DataFrame) -> Result<Vec<CategoryMean>, ProcessorError> {
        let order: Vec<&str> = Season::ALL.iter().map(|s| s.label()).collect();
        Self::category_means_for(df, SEASON_COL, &order)
    }

    pub fn weather_means(df: &DataFrame) -> Result<Vec<CategoryMean>, ProcessorError> {
        let order: Vec<&str> = Weather::ALL.iter().map(|w| w.label()).collect();
        Self::category_means_for(df, WEATHER_COL, &order)
    }

    fn category_means_for(
        df: &DataFrame,
        column: &str,
        order: &[&str],
    ) -> Result<Vec<CategoryMean>, ProcessorError> {
        if df.column(column).is_err() {
            return Ok(Vec::new());
        }
        let pairs = DataProcessor::labelled_counts(df, column)?;
        Ok(Self::category_means(&pairs, order))
    }

    /// Mean count per label in `order`. Null labels or counts are skipped,
    /// labels with no rows are left out.
    pub fn category_means(pairs: &[(Option<String>, Option<i64>)], order: &[&str]) -> Vec<CategoryMean> {
        order
            .iter()
            .filter_map(|&label| {
                let values: Vec<f64> = pairs
                    .iter()
                    .filter(|(l, _)| l.as_deref() == Some(label))
                    .filter_map(|(_, c)| c.map(|c| c as f64))
                    .collect();
                if values.is_empty() {
                    return None;
                }
                Some(CategoryMean {
                    label: label.to_string(),
                    mean: values.iter().mean(),
                    count: values.len(),
                })
            })
            .collect()
    }

    /// Equal-width histogram over the data range. The last bin is closed.
    pub fn histogram(values: &[f64], bins: usize) -> Histogram {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Histogram::default();
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    /// Gaussian KDE (Scott's rule bandwidth) scaled to histogram counts, so the
    /// curve overlays the bars. Needs at least two distinct values.
    pub fn density_curve(values: &[f64], histogram: &Histogram) -> Vec<[f64; 2]> {
        let n = values.len();
        if n < 2 || histogram.is_empty() {
            return Vec::new();
        }

        let std = values.iter().std_dev();
        if !(std.is_finite() && std > 0.0) {
            return Vec::new();
        }
        let bandwidth = std * (n as f64).powf(-0.2);
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let scale = n as f64 * histogram.bin_width();
        let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;

        (0..DENSITY_POINTS)
            .map(|i| {
                let x = lo + i as f64 * step;
                let density = values
                    .iter()
                    .map(|&v| kernel.pdf((x - v) / bandwidth))
                    .sum::<f64>()
                    / (n as f64 * bandwidth);
                [x, density * scale]
            })
            .collect()
    }

    /// Integer with thousands separators, e.g. `3,292,679`.
    pub fn format_count(value: i64) -> String {
        let digits = value.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        if value < 0 {
            out.insert(0, '-');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_counts() {
        let summary = StatsCalculator::summarize_counts(&[985, 801, 1349]);
        assert_eq!(summary.days, 3);
        assert_eq!(summary.total, 3135);
        assert!((summary.mean - 1045.0).abs() < 1e-9);
        assert_eq!(summary.max, Some(1349));
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = StatsCalculator::summarize_counts(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.mean.is_nan());
        assert_eq!(summary.max, None);
    }

    #[test]
    fn test_evening_peak_outranks_morning_peak() {
        let pairs = vec![
            (8, 350),
            (8, 368),
            (17, 450),
            (17, 472),
            (3, 5),
            (12, 250),
        ];
        let hourly = StatsCalculator::hourly_averages(&pairs);
        assert_eq!(hourly.iter().map(|h| h.hour).collect::<Vec<_>>(), vec![3, 8, 12, 17]);

        let peaks = StatsCalculator::peak_hours(&hourly, 3);
        let hours: Vec<u32> = peaks.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![17, 8, 12]);
        assert!((peaks[0].mean - 461.0).abs() < 1e-9);
        assert!((peaks[1].mean - 359.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_hours_tie_prefers_earlier_hour() {
        let hourly = StatsCalculator::hourly_averages(&[(18, 10), (7, 10), (9, 1)]);
        let peaks = StatsCalculator::peak_hours(&hourly, 2);
        assert_eq!(peaks[0].hour, 7);
        assert_eq!(peaks[1].hour, 18);
    }

    #[test]
    fn test_peak_hours_with_fewer_hours_than_requested() {
        let hourly = StatsCalculator::hourly_averages(&[(5, 1)]);
        assert_eq!(StatsCalculator::peak_hours(&hourly, 3).len(), 1);
        assert!(StatsCalculator::peak_hours(&[], 3).is_empty());
    }

    #[test]
    fn test_category_means_follow_given_order_and_skip_nulls() {
        let pairs = vec![
            (Some("Fall".to_string()), Some(6000)),
            (Some("Spring".to_string()), Some(1000)),
            (Some("Fall".to_string()), Some(5000)),
            (None, Some(99_999)),
        ];
        let means = StatsCalculator::category_means(&pairs, &["Spring", "Summer", "Fall", "Winter"]);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].label, "Spring");
        assert_eq!(means[1].label, "Fall");
        assert!((means[1].mean - 5500.0).abs() < 1e-9);
        assert_eq!(means[1].count, 2);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let hist = StatsCalculator::histogram(&values, 30);
        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.edges.len(), 31);
        assert_eq!(hist.counts.iter().sum::<usize>(), 100);
        // Max value lands in the last, closed bin.
        assert!(hist.counts[29] > 0);
    }

    #[test]
    fn test_histogram_of_constant_values() {
        let hist = StatsCalculator::histogram(&[7.0, 7.0], 4);
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
        assert!((hist.bin_width() - 0.25).abs() < 1e-12);
        assert!(StatsCalculator::histogram(&[], 30).is_empty());
    }

    #[test]
    fn test_density_curve_area_matches_sample_size() {
        let values: Vec<f64> = (0..200).map(|v| (v % 40) as f64 * 10.0).collect();
        let hist = StatsCalculator::histogram(&values, 30);
        let curve = StatsCalculator::density_curve(&values, &hist);
        assert_eq!(curve.len(), DENSITY_POINTS);

        // Integrate with the trapezoid rule: area ~= n * bin_width (less the tails).
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1][0] - w[0][0]) * (w[0][1] + w[1][1]) / 2.0)
            .sum();
        let expected = values.len() as f64 * hist.bin_width();
        assert!(area > 0.7 * expected && area <= expected * 1.01);
    }

    #[test]
    fn test_density_curve_needs_spread() {
        let hist = StatsCalculator::histogram(&[3.0, 3.0, 3.0], 30);
        assert!(StatsCalculator::density_curve(&[3.0, 3.0, 3.0], &hist).is_empty());
    }

    #[test]
    fn test_format_count() {
        assert_eq!(StatsCalculator::format_count(0), "0");
        assert_eq!(StatsCalculator::format_count(999), "999");
        assert_eq!(StatsCalculator::format_count(1000), "1,000");
        assert_eq!(StatsCalculator::format_count(3_292_679), "3,292,679");
        assert_eq!(StatsCalculator::format_count(-45_000), "-45,000");
    }
}
