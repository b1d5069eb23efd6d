//! Water Truck Dashboard - Delivery & Finance Analytics
//!
//! A Rust application that cleans transaction and GPS CSV files and displays
//! them as interactive metrics, charts and a delivery map.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::{anyhow, Result};
use config::DashboardConfig;
use data::{FinancialLoader, GeoLoader};
use eframe::egui;
use gui::DashboardApp;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env).init();

    let config = DashboardConfig::discover(std::env::args_os().nth(1).map(PathBuf::from))?;
    let load_options = config.load_options()?;
    info!(
        financial = %config.financial_path.display(),
        gps = %config.gps_path.display(),
        "starting dashboard"
    );

    // Building the loaders validates the header alias tables
    let financial_loader = FinancialLoader::new(load_options.clone())?;
    let geo_loader = GeoLoader::new(load_options)?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Water Truck Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Water Truck Dashboard",
        options,
        Box::new(move |cc| {
            Ok(Box::new(DashboardApp::new(
                cc,
                config,
                financial_loader,
                geo_loader,
            )))
        }),
    )
    .map_err(|e| anyhow!("dashboard window failed: {}", e))
}
