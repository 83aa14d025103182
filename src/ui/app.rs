//! Main application struct and eframe integration

use crate::config::AppConfig;
use crate::conversation::{Capabilities, ConversationController};
use crate::ui::components::{CameraModal, Header, InputBar, MessageList, MicModal};
use crate::ui::theme::Theme;
use crate::ui::video::VideoPreview;
use crate::ui::CameraTask;
use crate::{ParleyError, Result};
use egui::{self, CentralPanel, TextureHandle, TopBottomPanel};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The whole chat window for one frame
pub struct ChatView<'a> {
    controller: &'a mut ConversationController,
    theme: &'a Theme,
    dark_mode: &'a mut bool,
    preview: Option<&'a TextureHandle>,
}

impl<'a> ChatView<'a> {
    pub fn new(
        controller: &'a mut ConversationController,
        theme: &'a Theme,
        dark_mode: &'a mut bool,
        preview: Option<&'a TextureHandle>,
    ) -> Self {
        Self {
            controller,
            theme,
            dark_mode,
            preview,
        }
    }

    /// Returns the camera acquisition started this frame, if any
    pub fn show(self, ctx: &egui::Context) -> Option<CameraTask> {
        let theme = self.theme;

        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(theme.bg_secondary).inner_margin(12.0))
            .show(ctx, |ui| {
                Header::new(&mut *self.controller, theme, &mut *self.dark_mode).show(ui);
            });

        let camera_task = TopBottomPanel::bottom("input_area")
            .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing_sm))
            .show(ctx, |ui| InputBar::new(&mut *self.controller, theme).show(ui))
            .inner;

        let messages = self.controller.messages();
        CentralPanel::default()
            .frame(egui::Frame::none().fill(theme.bg_primary).inner_margin(theme.spacing_sm))
            .show(ctx, |ui| {
                MessageList::new(&messages, theme).show(ui);
            });

        MicModal::new(&mut *self.controller, theme).show(ctx);
        CameraModal::new(&mut *self.controller, theme, self.preview).show(ctx);

        camera_task
    }
}

pub struct ParleyApp {
    controller: ConversationController,
    theme: Theme,
    dark_mode: bool,
    preview: Arc<VideoPreview>,
    preview_texture: Option<TextureHandle>,
    runtime: tokio::runtime::Runtime,
}

impl ParleyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        let dark_mode = config.ui.dark_mode;
        let theme = Theme::for_mode(dark_mode);
        theme.apply(&cc.egui_ctx);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("parley-camera")
            .enable_all()
            .build()
            .map_err(|e| ParleyError::IOError(format!("Failed to start async runtime: {}", e)))?;

        let preview = Arc::new(VideoPreview::new());
        let capabilities = Capabilities::desktop(&config, preview.clone());
        let controller = ConversationController::new(&config, capabilities);

        info!("Parley UI initialized");

        Ok(Self {
            controller,
            theme,
            dark_mode,
            preview,
            preview_texture: None,
            runtime,
        })
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        if !self.controller.camera().is_active() {
            self.preview_texture = None;
            return;
        }

        if let Some(frame) = self.preview.take_latest() {
            let image = egui::ColorImage::from_rgba_unmultiplied([frame.width, frame.height], &frame.rgba);
            match self.preview_texture.as_mut() {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.preview_texture =
                        Some(ctx.load_texture("camera_preview", image, egui::TextureOptions::LINEAR));
                }
            }
        }
    }
}

impl eframe::App for ParleyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let next_deadline = self.controller.poll(now);

        if self.theme.dark != self.dark_mode {
            self.theme = Theme::for_mode(self.dark_mode);
            self.theme.apply(ctx);
        }

        self.refresh_preview(ctx);

        let task = ChatView::new(
            &mut self.controller,
            &self.theme,
            &mut self.dark_mode,
            self.preview_texture.as_ref(),
        )
        .show(ctx);

        if let Some(task) = task {
            debug!("Starting camera acquisition");
            self.runtime.spawn(task);
        }

        // Device state changes arrive from worker threads, so keep polling while anything is live
        let live = self.controller.is_listening()
            || self.controller.is_speaking()
            || self.controller.camera().is_active()
            || self.controller.camera().is_acquiring();
        if live {
            ctx.request_repaint_after(std::time::Duration::from_millis(33));
        } else if let Some(deadline) = next_deadline {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();
        info!("Parley shutting down");
    }
}
