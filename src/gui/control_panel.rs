//! Control Panel Widget
//! Left side panel with data sources, month filter and status.

use crate::stats::MonthFilter;
use egui::{Color32, ComboBox, RichText};
use std::path::{Path, PathBuf};

/// User settings for the dashboard
#[derive(Default, Clone)]
pub struct UserSettings {
    pub financial_path: PathBuf,
    pub gps_path: PathBuf,
    pub month: MonthFilter,
}

/// Severity of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Left side control panel with file selection and month filter.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub months: Vec<String>,
    pub shown_transactions: usize,
    pub total_transactions: usize,
    pub status: String,
    pub status_level: StatusLevel,
}

impl ControlPanel {
    pub fn new(financial_path: PathBuf, gps_path: PathBuf) -> Self {
        Self {
            settings: UserSettings {
                financial_path,
                gps_path,
                month: MonthFilter::All,
            },
            months: Vec::new(),
            shown_transactions: 0,
            total_transactions: 0,
            status: "Ready".to_string(),
            status_level: StatusLevel::Info,
        }
    }

    /// Update available months after a load, keeping the selection when still valid
    pub fn update_months(&mut self, months: Vec<String>) {
        if let MonthFilter::Month(selected) = &self.settings.month {
            if !months.contains(selected) {
                self.settings.month = MonthFilter::All;
            }
        }
        self.months = months;
    }

    pub fn set_counts(&mut self, shown: usize, total: usize) {
        self.shown_transactions = shown;
        self.total_transactions = total;
    }

    pub fn set_status(&mut self, level: StatusLevel, status: &str) {
        self.status_level = level;
        self.status = status.to_string();
    }

    fn file_label(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "No file selected".to_string())
    }

    fn source_row(ui: &mut egui::Ui, title: &str, path: &Path) -> bool {
        let mut clicked = false;

        ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(Self::file_label(path)).size(12.0))
                        .on_hover_text(path.display().to_string());

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            clicked = true;
                        }
                    });
                });
            });

        clicked
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("💧 Water Truck Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(30, 144, 255)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Sources =====
        ui.label(RichText::new("📁 Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        if Self::source_row(ui, "Transactions", &self.settings.financial_path) {
            action = ControlPanelAction::BrowseFinancial;
        }
        ui.add_space(5.0);
        if Self::source_row(ui, "GPS points", &self.settings.gps_path) {
            action = ControlPanelAction::BrowseGps;
        }

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if ui.button("🔄 Reload data").clicked() {
                action = ControlPanelAction::Reload;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Month Filter =====
        ui.label(RichText::new("⚙️ Filter").size(14.0).strong());
        ui.add_space(5.0);

        let before = self.settings.month.clone();
        ui.horizontal(|ui| {
            ui.add_sized([60.0, 20.0], egui::Label::new("Month:"));
            ComboBox::from_id_salt("month_filter")
                .width(200.0)
                .selected_text(self.settings.month.label())
                .show_ui(ui, |ui| {
                    ui.selectable_value(
                        &mut self.settings.month,
                        MonthFilter::All,
                        MonthFilter::All.label(),
                    );
                    for month in &self.months {
                        ui.selectable_value(
                            &mut self.settings.month,
                            MonthFilter::Month(month.clone()),
                            month.as_str(),
                        );
                    }
                });
        });
        if self.settings.month != before {
            action = ControlPanelAction::MonthChanged;
        }

        ui.add_space(5.0);
        ui.label(
            RichText::new(format!(
                "Showing {} of {} transactions",
                self.shown_transactions, self.total_transactions
            ))
            .size(11.0),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = match self.status_level {
            StatusLevel::Info => Color32::GRAY,
            StatusLevel::Success => Color32::from_rgb(40, 167, 69),
            StatusLevel::Warning => Color32::from_rgb(224, 168, 0),
            StatusLevel::Error => Color32::from_rgb(220, 53, 69),
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFinancial,
    BrowseGps,
    Reload,
    MonthChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_month_selection_falls_back_to_all() {
        let mut panel = ControlPanel::new("a.csv".into(), "b.csv".into());
        panel.update_months(vec!["2024-03 (March)".to_string()]);
        panel.settings.month = MonthFilter::Month("2024-03 (March)".to_string());

        panel.update_months(vec!["2024-03 (March)".to_string(), "2024-04 (April)".to_string()]);
        assert_eq!(panel.settings.month, MonthFilter::Month("2024-03 (March)".to_string()));

        panel.update_months(vec!["2024-04 (April)".to_string()]);
        assert_eq!(panel.settings.month, MonthFilter::All);
    }

    #[test]
    fn file_label_uses_file_name() {
        assert_eq!(ControlPanel::file_label(Path::new("data/keuangan_data.csv")), "keuangan_data.csv");
        assert_eq!(ControlPanel::file_label(Path::new("")), "No file selected");
    }
}
