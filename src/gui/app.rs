//! Bike Rental Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{DataProcessor, DataSources, DatasetCache, RentalTables, TableKind};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{Narrative, StatsCalculator};
use egui::SidePanel;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application window.
pub struct DashboardApp {
    cache: Arc<DatasetCache>,
    config: DashboardConfig,
    tables: Option<Arc<RentalTables>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        cache: Arc<DatasetCache>,
        config: DashboardConfig,
    ) -> Self {
        Self::with_cache(cache, config)
    }

    fn with_cache(cache: Arc<DatasetCache>, config: DashboardConfig) -> Self {
        let sources = config.sources();
        let mut app = Self {
            control_panel: ControlPanel::new(sources.clone()),
            cache,
            config,
            tables: None,
            chart_viewer: ChartViewer::new(),
        };
        app.load_sources(sources);
        app
    }

    /// Fetch the tables for `sources` and reset the selection. The sources are
    /// only adopted once they load; on failure the previous tables stay on screen.
    fn load_sources(&mut self, sources: DataSources) -> bool {
        match self.cache.get_or_load(&sources) {
            Ok(tables) => {
                let bounds = match DataProcessor::default_range(&tables) {
                    Ok(bounds) => bounds,
                    Err(e) => {
                        self.control_panel.set_status(&format!("Error: {}", e));
                        return false;
                    }
                };

                match Narrative::from_tables(&tables, self.config.peak_hours) {
                    Ok(narrative) => self.chart_viewer.set_narrative(narrative),
                    Err(e) => warn!(error = %e, "Narrative unavailable"),
                }

                self.control_panel.set_status(&format!(
                    "Loaded {} days, {} hours",
                    tables.daily().height(),
                    tables.hourly().height()
                ));
                self.control_panel.sources = sources;
                self.control_panel.set_bounds(bounds);
                self.tables = Some(tables);
                self.recompute();
                true
            }
            Err(e) => {
                error!(error = %e, "Loading rental data failed");
                self.control_panel.set_status(&format!("Error: {}", e));
                false
            }
        }
    }

    /// Filter to the selected range and refresh the figures.
    fn recompute(&mut self) {
        let (Some(tables), Some(range)) = (&self.tables, self.control_panel.selected_range()) else {
            self.chart_viewer.clear();
            return;
        };

        let result = DataProcessor::filter_tables(tables, range).and_then(|view| {
            StatsCalculator::compute_dashboard(&view, self.config.histogram_bins, self.config.peak_hours)
        });
        match result {
            Ok(stats) => self.chart_viewer.set_stats(range, stats),
            Err(e) => self.control_panel.set_status(&format!("Error: {}", e)),
        }
    }

    /// Let the user pick a new CSV for one of the tables.
    fn handle_browse(&mut self, kind: TableKind) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        info!(table = %kind, path = %path.display(), "Data source selected");
        let mut sources = self.control_panel.sources.clone();
        match kind {
            TableKind::Daily => sources.daily = path,
            TableKind::Hourly => sources.hourly = path,
        }
        self.load_sources(sources);
    }

    /// Render the current charts to PNG files in a user-chosen folder.
    fn handle_export_png(&mut self) {
        let Some(stats) = self.chart_viewer.stats.as_ref() else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        let size = (self.config.export_width, self.config.export_height);
        match StaticChartRenderer::export_dashboard(&dir, stats, size) {
            Ok(files) => {
                self.control_panel
                    .set_status(&format!("Exported {} charts", files.len()));
                if let Err(e) = open::that(&dir) {
                    warn!(error = %e, dir = %dir.display(), "Could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "Chart export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseDaily => self.handle_browse(TableKind::Daily),
                        ControlPanelAction::BrowseHourly => self.handle_browse(TableKind::Hourly),
                        ControlPanelAction::RangeChanged => self.recompute(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
