//! egui/eframe desktop shell
//!
//! Renders the controller's log, session flags and device state every frame and
//! turns clicks and key presses into controller gestures.

mod app;
pub mod components;
mod theme;
mod video;

pub use app::{ChatView, ParleyApp};
pub use theme::Theme;
pub use video::VideoPreview;

use crate::config::AppConfig;
use std::future::Future;
use std::pin::Pin;

/// A camera acquisition the shell runs on its async runtime
pub type CameraTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Open the main window and run until it is closed
pub fn run(config: AppConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Parley"),
        ..Default::default()
    };

    eframe::run_native(
        "Parley",
        options,
        Box::new(move |cc| Ok(Box::new(ParleyApp::new(cc, config)?))),
    )
}
