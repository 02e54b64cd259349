//! Chart Viewer Widget
//! Central scrollable panel: metric tiles, charts, peak hours and conclusion.

use crate::charts::ChartPlotter;
use crate::data::DateRange;
use crate::stats::{DashboardStats, Narrative, StatsCalculator};
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;

/// Displays the figures for the current selection.
#[derive(Default)]
pub struct ChartViewer {
    pub range: Option<DateRange>,
    pub stats: Option<DashboardStats>,
    pub narrative: Option<Narrative>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.range = None;
        self.stats = None;
        self.narrative = None;
    }

    pub fn set_stats(&mut self, range: DateRange, stats: DashboardStats) {
        self.range = Some(range);
        self.stats = Some(stats);
    }

    pub fn set_narrative(&mut self, narrative: Narrative) {
        self.narrative = Some(narrative);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let (Some(range), Some(stats)) = (self.range, self.stats.as_ref()) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("Bike Rental Dashboard").size(26.0).strong());
                ui.label(format!("Showing data from {} to {}", range.start, range.end));
                if range.is_empty() {
                    ui.label(
                        RichText::new("The start date is after the end date; nothing is selected.")
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                }
                ui.add_space(SECTION_SPACING);

                Self::draw_metrics(ui, stats);
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("Daily Rental Distribution").size(16.0).strong());
                ChartPlotter::draw_distribution(ui, stats);
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("Rentals by Season and Weather").size(16.0).strong());
                ui.columns(2, |cols| {
                    ChartPlotter::draw_category_means(&mut cols[0], "by_season", "Season", &stats.by_season);
                    ChartPlotter::draw_category_means(&mut cols[1], "by_weather", "Weather", &stats.by_weather);
                });
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("Peak Rental Hours").size(16.0).strong());
                ChartPlotter::draw_hourly_trend(ui, &stats.hourly);
                Self::draw_peak_hours(ui, stats);
                ui.add_space(SECTION_SPACING);

                if let Some(narrative) = &self.narrative {
                    Self::draw_narrative(ui, narrative);
                }
            });
    }

    fn draw_metrics(ui: &mut egui::Ui, stats: &DashboardStats) {
        let summary = &stats.summary;
        let mean = if summary.mean.is_nan() {
            "-".to_string()
        } else {
            format!("{:.2}", summary.mean)
        };
        let best = summary
            .max
            .map(StatsCalculator::format_count)
            .unwrap_or_else(|| "-".to_string());

        ui.columns(3, |cols| {
            Self::metric_tile(&mut cols[0], "Total Rentals", &StatsCalculator::format_count(summary.total));
            Self::metric_tile(&mut cols[1], "Average Daily Rentals", &mean);
            Self::metric_tile(&mut cols[2], "Busiest Day", &best);
        });
    }

    fn metric_tile(ui: &mut egui::Ui, label: &str, value: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(24.0).strong());
            });
    }

    fn draw_peak_hours(ui: &mut egui::Ui, stats: &DashboardStats) {
        if stats.peak_hours.is_empty() {
            ui.label(RichText::new("No hourly data in this range.").color(Color32::GRAY));
            return;
        }
        for (i, peak) in stats.peak_hours.iter().enumerate() {
            ui.label(
                RichText::new(format!(
                    "{}. {:02}:00 → {:.2} rentals/hour",
                    i + 1,
                    peak.hour,
                    peak.mean
                ))
                .strong(),
            );
        }
    }

    fn draw_narrative(ui: &mut egui::Ui, narrative: &Narrative) {
        ui.label(RichText::new("Conclusion").size(16.0).strong());
        for section in narrative.sections() {
            ui.add_space(5.0);
            ui.label(RichText::new(&section.title).size(14.0).strong());
            for bullet in &section.bullets {
                ui.label(format!("• {}", bullet));
            }
        }
    }
}
