//! Static Chart Renderer
//! Writes the dashboard charts to PNG files with plotters.
//!
//! Files written by [`StaticChartRenderer::export_dashboard`]:
//! 1. `distribution.png` - histogram of daily rentals with KDE overlay
//! 2. `season.png` - mean daily rentals by season
//! 3. `weather.png` - mean daily rentals by weather
//! 4. `hourly.png` - mean rentals by hour of day

use crate::stats::{CategoryMean, DashboardStats, HourlyAverage};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const BAR: RGBColor = RGBColor(52, 152, 219);
const DENSITY: RGBColor = RGBColor(231, 76, 60);
const TREND: RGBColor = RGBColor(46, 204, 113);

type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot create export directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to draw {}: {message}", path.display())]
    Drawing { path: PathBuf, message: String },
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render all four charts into `dir`, creating it if needed.
    pub fn export_dashboard(
        dir: &Path,
        stats: &DashboardStats,
        size: (u32, u32),
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let files = [
            dir.join("distribution.png"),
            dir.join("season.png"),
            dir.join("weather.png"),
            dir.join("hourly.png"),
        ];

        Self::finish(&files[0], Self::draw_distribution(&files[0], stats, size))?;
        Self::finish(
            &files[1],
            Self::draw_category_means(
                &files[1],
                "Average Rentals by Season",
                "Season",
                &stats.by_season,
                size,
            ),
        )?;
        Self::finish(
            &files[2],
            Self::draw_category_means(
                &files[2],
                "Average Rentals by Weather",
                "Weather",
                &stats.by_weather,
                size,
            ),
        )?;
        Self::finish(&files[3], Self::draw_hourly_trend(&files[3], &stats.hourly, size))?;

        info!(dir = %dir.display(), files = files.len(), "Charts exported");
        Ok(files.to_vec())
    }

    fn finish(path: &Path, result: DrawResult) -> Result<(), RenderError> {
        result.map_err(|err| RenderError::Drawing {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn draw_distribution(path: &Path, stats: &DashboardStats, size: (u32, u32)) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let hist = &stats.histogram;
        let (x_min, x_max) = match (hist.edges.first(), hist.edges.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0.0, 1.0),
        };
        let tallest = hist
            .counts
            .iter()
            .map(|&c| c as f64)
            .chain(stats.density.iter().map(|p| p[1]))
            .fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(&root)
            .caption("Daily Rental Distribution", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0f64..y_ceiling(tallest))?;

        chart
            .configure_mesh()
            .x_desc("Rentals")
            .y_desc("Frequency")
            .draw()?;

        chart.draw_series(hist.edges.windows(2).zip(&hist.counts).map(|(edge, &count)| {
            Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], BAR.mix(0.6).filled())
        }))?;
        chart.draw_series(LineSeries::new(
            stats.density.iter().map(|p| (p[0], p[1])),
            DENSITY.stroke_width(2),
        ))?;

        root.present()?;
        Ok(())
    }

    fn draw_category_means(
        path: &Path,
        title: &str,
        x_desc: &str,
        means: &[CategoryMean],
        size: (u32, u32),
    ) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let slots = means.len().max(1) as u32;
        let tallest = means.iter().map(|m| m.mean).fold(0.0, f64::max);
        let labels: Vec<&str> = means.iter().map(|m| m.label.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..slots).into_segmented(), 0f64..y_ceiling(tallest))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc("Average rentals")
            .x_labels(slots as usize)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels
                    .get(*i as usize)
                    .map(|l| l.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR.filled())
                .margin(20)
                .data(means.iter().enumerate().map(|(i, m)| (i as u32, m.mean))),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_hourly_trend(path: &Path, hourly: &[HourlyAverage], size: (u32, u32)) -> DrawResult {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let tallest = hourly.iter().map(|h| h.mean).fold(0.0, f64::max);
        let points: Vec<(f64, f64)> = hourly.iter().map(|h| (h.hour as f64, h.mean)).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Average Rentals by Hour", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..23f64, 0f64..y_ceiling(tallest))?;

        chart
            .configure_mesh()
            .x_desc("Hour")
            .y_desc("Average rentals")
            .x_labels(24)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), TREND.stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, TREND.filled())))?;

        root.present()?;
        Ok(())
    }
}

/// Upper bound of a value axis with some headroom; never zero.
fn y_ceiling(tallest: f64) -> f64 {
    if tallest > 0.0 {
        tallest * 1.1
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_ceiling() {
        assert_eq!(y_ceiling(0.0), 1.0);
        assert_eq!(y_ceiling(f64::NAN), 1.0);
        assert!((y_ceiling(100.0) - 110.0).abs() < 1e-9);
    }
}
