//! Input bar component
//!
//! Camera button, the message field, mic button and send button.

use crate::conversation::ConversationController;
use crate::ui::theme::Theme;
use crate::ui::CameraTask;
use egui::{self, Key, RichText, Vec2};
use std::time::Instant;

const PLACEHOLDER: &str = "Ask anything...";

pub struct InputBar<'a> {
    controller: &'a mut ConversationController,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(controller: &'a mut ConversationController, theme: &'a Theme) -> Self {
        Self { controller, theme }
    }

    /// Draw the bar. Returns the camera acquisition to run when the camera was opened.
    pub fn show(mut self, ui: &mut egui::Ui) -> Option<CameraTask> {
        let mut camera_task = None;

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.button_rounding)
            .inner_margin(egui::Margin::symmetric(8.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    camera_task = self.show_camera_button(ui);
                    self.show_text_input(ui);
                    self.show_mic_button(ui);
                    self.show_send_button(ui);
                });
            });

        camera_task
    }

    fn icon_button(&self, ui: &mut egui::Ui, icon: &str, color: egui::Color32, enabled: bool) -> egui::Response {
        let button = egui::Button::new(RichText::new(icon).size(16.0).color(color))
            .min_size(Vec2::splat(32.0))
            .rounding(self.theme.button_rounding)
            .frame(false);
        ui.add_enabled(enabled, button)
    }

    fn show_camera_button(&mut self, ui: &mut egui::Ui) -> Option<CameraTask> {
        let active = self.controller.camera().is_active();
        let (icon, tooltip, color) = if active {
            ("🎥", "Stop Camera", self.theme.success)
        } else {
            ("📷", "Start Camera", self.theme.text_muted)
        };

        let response = self.icon_button(ui, icon, color, true).on_hover_text(tooltip);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, tooltip));

        if response.clicked() {
            self.controller
                .toggle_camera()
                .map(|task| Box::pin(task) as CameraTask)
        } else {
            None
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        // Reserve room for the mic and send buttons
        let width = (ui.available_width() - 80.0).max(60.0);
        let input_id = egui::Id::new("message_input");

        if !self.controller.session().input_active {
            let placeholder = ui.add_sized(
                [width, 28.0],
                egui::Label::new(RichText::new(PLACEHOLDER).color(self.theme.text_muted))
                    .sense(egui::Sense::click()),
            );
            placeholder.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, PLACEHOLDER)
            });
            if placeholder.clicked() {
                self.controller.activate_input();
                ui.memory_mut(|memory| memory.request_focus(input_id));
            }
            return;
        }

        let session = self.controller.session_mut();
        let text_edit = egui::TextEdit::singleline(&mut session.input_text)
            .id(input_id)
            .hint_text(PLACEHOLDER)
            .desired_width(width)
            .frame(false)
            .margin(egui::Margin::symmetric(8.0, 6.0));

        let response = ui.add(text_edit);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
        });

        if response.lost_focus() {
            if ui.input(|i| i.key_pressed(Key::Enter)) {
                self.controller.commit_input(Instant::now());
            } else {
                self.controller.deactivate_input();
            }
        }
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let supported = self.controller.speech_input().is_supported();
        let listening = self.controller.is_listening();
        let (icon, tooltip, color) = if listening {
            ("⏹", "Stop Listening", self.theme.listening)
        } else {
            ("🎤", "Start Voice Input", self.theme.text_muted)
        };

        let response = self.icon_button(ui, icon, color, supported).on_hover_text(tooltip);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, supported, tooltip));

        if response.clicked() {
            self.controller.toggle_mic();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(RichText::new("⬆").size(16.0).color(egui::Color32::WHITE))
            .min_size(Vec2::splat(32.0))
            .rounding(self.theme.button_rounding)
            .fill(self.theme.primary);

        let response = ui.add(button).on_hover_text("Send");
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Send message"));

        if response.clicked() {
            self.controller.send_input(Instant::now());
        }
    }
}
