//! Water Truck Dashboard Main Application
//! Main window with control panel and dashboard view.

use crate::charts::ChartData;
use crate::config::DashboardConfig;
use crate::data::{FinancialLoader, FinancialTable, GeoLoader};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, MapView, StatusLevel};
use crate::stats::Aggregator;
use egui::SidePanel;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which input file an action refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Financial,
    Gps,
}

/// Main application window.
pub struct DashboardApp {
    financial_loader: FinancialLoader,
    geo_loader: GeoLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    financial: Option<Arc<FinancialTable>>,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        financial_loader: FinancialLoader,
        geo_loader: GeoLoader,
    ) -> Self {
        let mut app = Self {
            financial_loader,
            geo_loader,
            control_panel: ControlPanel::new(config.financial_path, config.gps_path),
            chart_viewer: ChartViewer::new(),
            financial: None,
        };

        app.load_financial(false);
        app.load_geo(false);
        app
    }

    /// Load (or re-read) the transactions file and rebuild the financial views
    fn load_financial(&mut self, reload: bool) {
        let path = self.control_panel.settings.financial_path.clone();
        let result = if reload {
            self.financial_loader.reload(&path)
        } else {
            self.financial_loader.load(&path)
        };

        match result {
            Ok(loaded) => {
                let table = loaded.table;
                let report = table.report();
                self.control_panel
                    .update_months(Aggregator::available_months(&table));
                if table.is_empty() {
                    self.control_panel.set_status(
                        StatusLevel::Warning,
                        &format!("No dated transactions in {} rows", report.raw_rows),
                    );
                } else {
                    self.control_panel.set_status(
                        StatusLevel::Success,
                        &format!(
                            "Loaded {} of {} rows ({} zero-filled amounts)",
                            report.kept_rows(),
                            report.raw_rows,
                            report.zero_filled
                        ),
                    );
                }
                self.financial = Some(table);
            }
            Err(e) => {
                error!(
                    file = %e.path().display(),
                    kind = ?e.kind(),
                    error = %e,
                    "transactions unavailable"
                );
                self.control_panel.update_months(Vec::new());
                self.control_panel
                    .set_status(StatusLevel::Error, &format!("Error: {}", e));
                self.chart_viewer.set_financial_error(e.to_string());
                self.financial = None;
            }
        }

        self.refresh_charts();
    }

    /// Load (or re-read) the GPS file and update the map
    fn load_geo(&mut self, reload: bool) {
        let path = self.control_panel.settings.gps_path.clone();
        let result = if reload {
            self.geo_loader.reload(&path)
        } else {
            self.geo_loader.load(&path)
        };

        // A transactions failure keeps the status line
        let keep_status = self.chart_viewer.financial_error.is_some();
        let map = match result {
            Ok(loaded) => match loaded.warning {
                Some(warning) => {
                    if !keep_status {
                        self.control_panel
                            .set_status(StatusLevel::Warning, &warning.to_string());
                    }
                    MapView::NoData(warning)
                }
                None => MapView::Points(loaded.table),
            },
            Err(e) => {
                warn!(
                    file = %e.path().display(),
                    kind = ?e.kind(),
                    error = %e,
                    "GPS data unavailable"
                );
                if !keep_status {
                    self.control_panel
                        .set_status(StatusLevel::Error, &format!("Error: {}", e));
                }
                MapView::Failed(e.to_string())
            }
        };
        self.chart_viewer.set_map(map);
    }

    /// Recompute aggregates for the current table and month filter
    fn refresh_charts(&mut self) {
        let Some(table) = &self.financial else {
            self.control_panel.set_counts(0, 0);
            return;
        };

        let data = ChartData::build(table, &self.control_panel.settings.month);
        self.control_panel
            .set_counts(data.summary.transactions, data.total_transactions);
        self.chart_viewer.set_chart_data(data);
    }

    /// Pick a new input file with a native dialog
    fn handle_browse(&mut self, source: Source) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        info!(file = %path.display(), ?source, "input file selected");
        match source {
            Source::Financial => {
                let settings = &mut self.control_panel.settings;
                let previous = std::mem::replace(&mut settings.financial_path, path);
                self.financial_loader.invalidate(&previous);
                self.load_financial(false);
            }
            Source::Gps => {
                let settings = &mut self.control_panel.settings;
                let previous = std::mem::replace(&mut settings.gps_path, path);
                self.geo_loader.invalidate(&previous);
                self.load_geo(false);
            }
        }
    }

    fn handle_reload(&mut self) {
        info!("reloading input files");
        self.load_financial(true);
        self.load_geo(true);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseFinancial => self.handle_browse(Source::Financial),
                        ControlPanelAction::BrowseGps => self.handle_browse(Source::Gps),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::MonthChanged => self.refresh_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
