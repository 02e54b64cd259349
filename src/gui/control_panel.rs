//! Control Panel Widget
//! Left side panel: data sources, date range filter and export.

use crate::data::{DataSources, DateRange};
use chrono::{Duration, NaiveDate};
use egui::{Color32, RichText};
use std::path::Path;

/// Left side control panel with source selection and the date filter.
pub struct ControlPanel {
    pub sources: DataSources,
    /// Full span of the daily table; `None` until data is loaded.
    pub bounds: Option<DateRange>,
    /// Selected start/end as day offsets from `bounds.start`.
    pub start_offset: i64,
    pub end_offset: i64,
    pub status: String,
}

impl ControlPanel {
    pub fn new(sources: DataSources) -> Self {
        Self {
            sources,
            bounds: None,
            start_offset: 0,
            end_offset: 0,
            status: "Ready".to_string(),
        }
    }

    /// Set the selectable span and select all of it.
    pub fn set_bounds(&mut self, bounds: Option<DateRange>) {
        self.bounds = bounds;
        self.reset_range();
    }

    pub fn reset_range(&mut self) {
        self.start_offset = 0;
        self.end_offset = self.span_days();
    }

    /// The range currently selected, or `None` when no data is loaded.
    pub fn selected_range(&self) -> Option<DateRange> {
        let bounds = self.bounds?;
        Some(DateRange::new(
            offset_date(bounds.start, self.start_offset),
            offset_date(bounds.start, self.end_offset),
        ))
    }

    fn span_days(&self) -> i64 {
        self.bounds
            .map(|b| (b.end - b.start).num_days().max(0))
            .unwrap_or(0)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚲 Bike Rentals")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Sources =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                if Self::source_row(ui, "Daily:", &self.sources.daily) {
                    action = ControlPanelAction::BrowseDaily;
                }
                if Self::source_row(ui, "Hourly:", &self.sources.hourly) {
                    action = ControlPanelAction::BrowseHourly;
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(5.0);

        match self.bounds {
            Some(bounds) => {
                let span = self.span_days();

                ui.label(format!("Start: {}", offset_date(bounds.start, self.start_offset)));
                if ui
                    .add(egui::Slider::new(&mut self.start_offset, 0..=span).show_value(false))
                    .changed()
                {
                    action = ControlPanelAction::RangeChanged;
                }

                ui.add_space(5.0);

                ui.label(format!("End: {}", offset_date(bounds.start, self.end_offset)));
                if ui
                    .add(egui::Slider::new(&mut self.end_offset, 0..=span).show_value(false))
                    .changed()
                {
                    action = ControlPanelAction::RangeChanged;
                }

                ui.add_space(5.0);
                if ui.small_button("Full range").clicked() {
                    self.reset_range();
                    action = ControlPanelAction::RangeChanged;
                }
            }
            None => {
                ui.label(RichText::new("No data loaded").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.bounds.is_some(), |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// One "label / file name / Browse" row. Returns true when Browse was clicked.
    fn source_row(ui: &mut egui::Ui, label: &str, path: &Path) -> bool {
        let mut clicked = false;
        ui.horizontal(|ui| {
            ui.label(label);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(name).size(12.0));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("📂 Browse").clicked() {
                    clicked = true;
                }
            });
        });
        clicked
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

fn offset_date(start: NaiveDate, days: i64) -> NaiveDate {
    start + Duration::days(days)
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDaily,
    BrowseHourly,
    RangeChanged,
    ExportPng,
}
