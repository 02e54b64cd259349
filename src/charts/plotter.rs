//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot.

use crate::stats::{CategoryMean, DashboardStats, HourlyAverage};
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

pub const BAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const DENSITY_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red
pub const TREND_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green

pub const PALETTE: [Color32; 4] = [
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(52, 152, 219), // Blue
];

const CHART_HEIGHT: f32 = 280.0;

/// Draws the dashboard charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Histogram of daily rentals with the density curve on top.
    pub fn draw_distribution(ui: &mut egui::Ui, stats: &DashboardStats) {
        let width = stats.histogram.bin_width();
        let bars: Vec<Bar> = stats
            .histogram
            .bars()
            .into_iter()
            .map(|(center, count)| Bar::new(center, count as f64).width(width))
            .collect();

        Plot::new("distribution")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Rentals")
            .y_axis_label("Frequency")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(BAR_COLOR)
                        .name("Days"),
                );
                if !stats.density.is_empty() {
                    plot_ui.line(
                        Line::new(PlotPoints::from(stats.density.clone()))
                            .color(DENSITY_COLOR)
                            .width(2.0)
                            .name("KDE"),
                    );
                }
            });
    }

    /// Bar chart of mean rentals per category label.
    pub fn draw_category_means(ui: &mut egui::Ui, id: &str, x_label: &str, means: &[CategoryMean]) {
        let labels: Vec<String> = means.iter().map(|m| m.label.clone()).collect();
        let bars: Vec<Bar> = means
            .iter()
            .enumerate()
            .map(|(i, m)| {
                Bar::new(i as f64, m.mean)
                    .width(0.6)
                    .name(&m.label)
                    .fill(PALETTE[i % PALETTE.len()])
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .allow_drag(false)
            .x_axis_label(x_label)
            .y_axis_label("Average rentals")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Mean rentals per hour as a line with markers.
    pub fn draw_hourly_trend(ui: &mut egui::Ui, hourly: &[HourlyAverage]) {
        let points: Vec<[f64; 2]> = hourly.iter().map(|h| [h.hour as f64, h.mean]).collect();

        Plot::new("hourly_trend")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .show_grid(true)
            .include_x(0.0)
            .include_x(23.0)
            .x_axis_label("Hour")
            .y_axis_label("Average rentals")
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .color(TREND_COLOR)
                        .width(2.0)
                        .name("Mean rentals"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(4.0)
                        .color(TREND_COLOR),
                );
            });
    }
}
