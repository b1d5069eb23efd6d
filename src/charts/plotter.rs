//! Chart Plotter Module
//! Creates the dashboard's interactive visualizations using egui_plot.

use crate::data::{FinancialTable, GeoTable};
use crate::stats::{Aggregator, DriverStats, FleetStats, MonthFilter, MonthlyTotals, Summary};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

pub const INCOME_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
pub const EXPENSE_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
pub const WATER_COLOR: Color32 = Color32::from_rgb(23, 162, 184);
pub const FLEET_COLOR: Color32 = Color32::from_rgb(255, 193, 7);
pub const TRIPS_COLOR: Color32 = Color32::from_rgb(155, 89, 182);
pub const MAP_POINT_COLOR: Color32 = Color32::from_rgb(231, 76, 60);

const CHART_HEIGHT: f32 = 300.0;
const MAP_HEIGHT: f32 = 500.0;
/// Degrees shown around the map centre before zooming (roughly city scale).
const MAP_SPAN: f64 = 0.05;

/// Everything the financial views need, computed once per table/month change.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub filter: MonthFilter,
    pub summary: Summary,
    pub total_transactions: usize,
    /// Whole table, regardless of the month filter
    pub monthly: Vec<MonthlyTotals>,
    /// Whole table, regardless of the month filter
    pub fleet: Vec<FleetStats>,
    pub drivers: Vec<DriverStats>,
}

impl ChartData {
    pub fn build(table: &FinancialTable, filter: &MonthFilter) -> Self {
        let filtered = Aggregator::filter_by_month(table, filter);

        Self {
            filter: filter.clone(),
            summary: Aggregator::summarize(filtered.iter().copied()),
            total_transactions: table.len(),
            monthly: Aggregator::monthly_totals(table.records()),
            fleet: Aggregator::fleet_performance(table.records()),
            drivers: Aggregator::driver_performance(filtered.iter().copied()),
        }
    }
}

/// Group digits with commas, e.g. `1,500,000`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_rupiah(value: f64) -> String {
    format!("Rp {}", format_thousands(value))
}

pub fn format_liters(value: f64) -> String {
    format!("{} Liter", format_thousands(value))
}

/// Label for an integer category position, empty between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if idx < 0.0 || (value - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Coloured headline card.
    pub fn draw_metric_card(ui: &mut egui::Ui, title: &str, value: &str, color: Color32) {
        egui::Frame::none()
            .fill(color)
            .rounding(15.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(title).size(13.0).color(Color32::WHITE));
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(value)
                            .size(22.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                });
            });
    }

    /// Grouped income/expense bars per month
    pub fn draw_monthly_finance_chart(ui: &mut egui::Ui, monthly: &[MonthlyTotals]) {
        let labels: Vec<String> = monthly.iter().map(|m| m.month.clone()).collect();

        let income: Vec<Bar> = monthly
            .iter()
            .enumerate()
            .map(|(i, m)| Bar::new(i as f64 - 0.2, m.income).width(0.4).name(&m.month))
            .collect();
        let expense: Vec<Bar> = monthly
            .iter()
            .enumerate()
            .map(|(i, m)| Bar::new(i as f64 + 0.2, m.expense).width(0.4).name(&m.month))
            .collect();

        Plot::new("monthly_finance")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label("Rp")
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .y_axis_formatter(|mark, _range| format_thousands(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(income).name("Income").color(INCOME_COLOR));
                plot_ui.bar_chart(BarChart::new(expense).name("Expense").color(EXPENSE_COLOR));
            });
    }

    /// Water volume per month as a line with markers
    pub fn draw_water_volume_chart(ui: &mut egui::Ui, monthly: &[MonthlyTotals]) {
        let labels: Vec<String> = monthly.iter().map(|m| m.month.clone()).collect();
        let points: Vec<[f64; 2]> = monthly
            .iter()
            .enumerate()
            .map(|(i, m)| [i as f64, m.water_liters])
            .collect();

        Plot::new("monthly_water")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .y_axis_label("Liter")
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .y_axis_formatter(|mark, _range| format_thousands(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(WATER_COLOR)
                        .width(2.0)
                        .name("Water delivered"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(WATER_COLOR),
                );
            });
    }

    /// Delivery points on a longitude/latitude plane centred on their mean.
    pub fn draw_delivery_map(ui: &mut egui::Ui, geo: &GeoTable) {
        let center = geo.center();

        let mut plot = Plot::new("delivery_map")
            .height(MAP_HEIGHT)
            .data_aspect(1.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format!("lat {:.5}, lon {:.5}", value.y, value.x)
                } else {
                    format!("{}\nlat {:.5}, lon {:.5}", name, value.y, value.x)
                }
            });

        if let Some((lat, lon)) = center {
            plot = plot
                .include_x(lon - MAP_SPAN)
                .include_x(lon + MAP_SPAN)
                .include_y(lat - MAP_SPAN)
                .include_y(lat + MAP_SPAN);
        }

        plot.show(ui, |plot_ui| {
            // One series per point so hovering shows the location name
            for record in geo.records() {
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(std::iter::once([
                        record.longitude,
                        record.latitude,
                    ])))
                    .radius(6.0)
                    .color(MAP_POINT_COLOR)
                    .name(&record.location_name),
                );
            }

            if let Some((lat, lon)) = center {
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(std::iter::once([lon, lat])))
                        .shape(MarkerShape::Cross)
                        .radius(8.0)
                        .color(Color32::DARK_GRAY)
                        .name("Centre"),
                );
            }
        });
    }

    /// Volume, operating cost and trip count per truck
    pub fn draw_fleet_chart(ui: &mut egui::Ui, fleet: &[FleetStats]) {
        let labels: Vec<String> = fleet.iter().map(|f| f.plate.clone()).collect();

        let series = |offset: f64, value: fn(&FleetStats) -> f64| -> Vec<Bar> {
            fleet
                .iter()
                .enumerate()
                .map(|(i, f)| Bar::new(i as f64 + offset, value(f)).width(0.25).name(&f.plate))
                .collect()
        };
        let water = series(-0.25, |f| f.water_liters);
        let expense = series(0.0, |f| f.expense);
        let trips = series(0.25, |f| f.trips as f64);

        Plot::new("fleet_performance")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .y_axis_formatter(|mark, _range| format_thousands(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(water).name("Water hauled (L)").color(WATER_COLOR));
                plot_ui.bar_chart(BarChart::new(expense).name("Operating cost (Rp)").color(EXPENSE_COLOR));
                plot_ui.bar_chart(BarChart::new(trips).name("Trips").color(FLEET_COLOR));
            });
    }

    /// Horizontal trip-count bars, busiest driver on top
    pub fn draw_driver_chart(ui: &mut egui::Ui, drivers: &[DriverStats]) {
        let n = drivers.len();
        let labels: Vec<String> = drivers.iter().rev().map(|d| d.driver.clone()).collect();

        let bars: Vec<Bar> = drivers
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Bar::new((n - 1 - i) as f64, d.trips as f64)
                    .width(0.6)
                    .name(format!("{} ({})", d.driver, format_liters(d.water_liters)))
            })
            .collect();

        Plot::new("driver_trips")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Trips")
            .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .name("Trips")
                        .color(TRIPS_COLOR),
                );
            });
    }
}
