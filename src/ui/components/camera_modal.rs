use crate::conversation::ConversationController;
use crate::ui::theme::Theme;
use egui::{self, Align2, RichText, TextureHandle, Vec2};

/// Overlay with the camera preview
pub struct CameraModal<'a> {
    controller: &'a mut ConversationController,
    theme: &'a Theme,
    preview: Option<&'a TextureHandle>,
}

impl<'a> CameraModal<'a> {
    pub fn new(
        controller: &'a mut ConversationController,
        theme: &'a Theme,
        preview: Option<&'a TextureHandle>,
    ) -> Self {
        Self {
            controller,
            theme,
            preview,
        }
    }

    pub fn show(self, ctx: &egui::Context) {
        if !self.controller.session().camera_modal_visible {
            return;
        }

        let camera = self.controller.camera();
        let active = camera.is_active();
        let error = camera.error();
        let mut close = false;

        egui::Window::new("Camera")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let size = Vec2::new(320.0, 240.0);

                match (self.preview, active) {
                    (Some(texture), true) => {
                        ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                    }
                    _ => {
                        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                        ui.painter().rect_filled(rect, self.theme.card_rounding, egui::Color32::BLACK);
                        let status = if active { "Waiting for video..." } else { "Camera off" };
                        ui.painter().text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            status,
                            egui::FontId::proportional(14.0),
                            self.theme.text_muted,
                        );
                    }
                }

                if let Some(error) = &error {
                    ui.add_space(self.theme.spacing_sm);
                    ui.label(RichText::new(error).color(self.theme.error))
                        .widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, error));
                }

                ui.add_space(self.theme.spacing_sm);
                ui.vertical_centered(|ui| {
                    let button = ui.add(
                        egui::Button::new("Close Camera").rounding(self.theme.button_rounding),
                    );
                    button.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Close Camera"));
                    close = button.clicked();
                });
            });

        if close {
            self.controller.close_camera_modal();
        }
    }
}
