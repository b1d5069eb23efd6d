//! Chart Viewer Widget
//! Central scrollable panel with metrics, charts, the delivery map and performance views.

use crate::charts::{
    format_liters, format_rupiah, ChartData, ChartPlotter, EXPENSE_COLOR, FLEET_COLOR,
    INCOME_COLOR, WATER_COLOR,
};
use crate::data::{EmptyResultWarning, GeoTable};
use egui::{Color32, RichText, ScrollArea};
use std::sync::Arc;

const SECTION_SPACING: f32 = 15.0;
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const WARNING_COLOR: Color32 = Color32::from_rgb(224, 168, 0);

/// What the map section can show
#[derive(Debug, Clone)]
pub enum MapView {
    NotLoaded,
    Points(Arc<GeoTable>),
    NoData(EmptyResultWarning),
    Failed(String),
}

/// Scrollable dashboard body.
pub struct ChartViewer {
    pub chart_data: Option<ChartData>,
    pub financial_error: Option<String>,
    pub map: MapView,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            chart_data: None,
            financial_error: None,
            map: MapView::NotLoaded,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chart_data(&mut self, chart_data: ChartData) {
        self.financial_error = None;
        self.chart_data = Some(chart_data);
    }

    /// Financial views halt on a load failure; nothing stale is kept.
    pub fn set_financial_error(&mut self, error: String) {
        self.chart_data = None;
        self.financial_error = Some(error);
    }

    pub fn set_map(&mut self, map: MapView) {
        self.map = map;
    }

    /// Draw the dashboard
    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("💧 Clean Water Truck Analytics")
                    .size(28.0)
                    .strong()
                    .color(Color32::from_rgb(30, 144, 255)),
            );
        });
        ui.add_space(SECTION_SPACING);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                match (&self.chart_data, &self.financial_error) {
                    (_, Some(error)) => Self::draw_error(ui, "Transactions unavailable", error),
                    (Some(data), None) => Self::draw_financial_sections(ui, data),
                    (None, None) => {
                        ui.label(RichText::new("No Data").size(20.0));
                    }
                }

                ui.separator();
                ui.add_space(SECTION_SPACING);
                self.draw_map_section(ui);

                if let Some(data) = &self.chart_data {
                    ui.separator();
                    ui.add_space(SECTION_SPACING);
                    Self::draw_performance_section(ui, data);
                }
            });
    }

    fn draw_error(ui: &mut egui::Ui, title: &str, message: &str) {
        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, ERROR_COLOR))
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(format!("⚠ {}", title)).size(16.0).strong().color(ERROR_COLOR));
                ui.label(RichText::new(message).size(13.0));
            });
        ui.add_space(SECTION_SPACING);
    }

    fn draw_financial_sections(ui: &mut egui::Ui, data: &ChartData) {
        ui.label(
            RichText::new(format!("📈 Key Metrics ({})", data.filter.label()))
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        let summary = &data.summary;
        ui.columns(4, |columns| {
            ChartPlotter::draw_metric_card(
                &mut columns[0],
                "Total Income",
                &format_rupiah(summary.total_income),
                INCOME_COLOR,
            );
            ChartPlotter::draw_metric_card(
                &mut columns[1],
                "Total Expense",
                &format_rupiah(summary.total_expense),
                EXPENSE_COLOR,
            );
            ChartPlotter::draw_metric_card(
                &mut columns[2],
                "Water Delivered",
                &format_liters(summary.total_water_liters),
                WATER_COLOR,
            );
            ChartPlotter::draw_metric_card(
                &mut columns[3],
                "Active Fleet",
                &format!("{} Trucks", summary.active_fleet),
                FLEET_COLOR,
            );
        });

        ui.add_space(SECTION_SPACING);
        ui.separator();
        ui.add_space(SECTION_SPACING);

        ui.label(RichText::new("1. Finance & Water Delivery Recap").size(18.0).strong());
        ui.add_space(8.0);
        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Finance per Month").size(14.0).strong());
            ChartPlotter::draw_monthly_finance_chart(&mut columns[0], &data.monthly);

            columns[1].label(RichText::new("Water Delivered per Month").size(14.0).strong());
            ChartPlotter::draw_water_volume_chart(&mut columns[1], &data.monthly);
        });
        ui.add_space(SECTION_SPACING);
    }

    fn draw_map_section(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("2. Delivery Locations").size(18.0).strong());
        ui.add_space(8.0);

        match &self.map {
            MapView::Points(geo) => {
                ui.label(
                    RichText::new(format!(
                        "{} delivery points ({} rows discarded). Drag to pan, scroll with Ctrl to zoom.",
                        geo.len(),
                        geo.report().dropped_rows
                    ))
                    .size(12.0)
                    .color(Color32::GRAY),
                );
                ChartPlotter::draw_delivery_map(ui, geo);
            }
            MapView::NoData(warning) => {
                ui.label(
                    RichText::new(format!("No valid GPS data to display. {}", warning))
                        .size(14.0)
                        .color(WARNING_COLOR),
                );
            }
            MapView::Failed(error) => Self::draw_error(ui, "GPS data unavailable", error),
            MapView::NotLoaded => {
                ui.label(RichText::new("GPS data not loaded").color(Color32::GRAY));
            }
        }
        ui.add_space(SECTION_SPACING);
    }

    fn draw_performance_section(ui: &mut egui::Ui, data: &ChartData) {
        ui.label(RichText::new("3. Performance").size(18.0).strong());
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Fleet Performance").size(14.0).strong());
            if data.fleet.is_empty() {
                columns[0].label(RichText::new("No identified trucks").color(Color32::GRAY));
            } else {
                ChartPlotter::draw_fleet_chart(&mut columns[0], &data.fleet);
            }

            columns[1].label(
                RichText::new(format!("Driver Trips ({})", data.filter.label()))
                    .size(14.0)
                    .strong(),
            );
            if data.drivers.is_empty() {
                columns[1].label(RichText::new("No identified drivers").color(Color32::GRAY));
            } else {
                ChartPlotter::draw_driver_chart(&mut columns[1], &data.drivers);
            }
        });
    }
}
