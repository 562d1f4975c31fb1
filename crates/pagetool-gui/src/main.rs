#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;

mod app;
#[cfg(feature = "thumbnails")]
mod backend;
mod handlers;
mod logger;
mod settings;
mod views;
mod worker;

fn main() -> eframe::Result<()> {
    let logger = logger::AppLogger::new(1000);
    if logger.clone().init().is_err() {
        eprintln!("logger already initialized");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("PDF PageTool"),
        ..Default::default()
    };

    eframe::run_native(
        "PDF PageTool",
        options,
        Box::new(move |cc| match app::PageToolApp::new(cc, logger) {
            Ok(app) => Ok(Box::new(app)),
            Err(e) => Err(e.into()),
        }),
    )
}
