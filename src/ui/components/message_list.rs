//! Conversation thread
//!
//! Shows a welcome card while the thread is empty, then one bubble per message.

use crate::messages::{Message, Sender};
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText, Vec2};

pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self { messages, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("message_list")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing);

                if self.messages.is_empty() {
                    self.show_welcome(ui);
                } else {
                    for message in self.messages {
                        self.show_message(ui, message);
                        ui.add_space(self.theme.spacing_sm);
                    }
                }

                ui.add_space(self.theme.spacing);
            });
    }

    fn show_welcome(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);

            ui.label(
                RichText::new("Welcome to Parley")
                    .size(24.0)
                    .color(self.theme.text_primary),
            );

            ui.add_space(self.theme.spacing);

            ui.label(
                RichText::new("Type below, tap the mic to talk, or open the camera.")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(self.theme.spacing_lg);

            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing = Vec2::splat(self.theme.spacing_sm);
                self.show_hint(ui, "Say hello");
                self.show_hint(ui, "What time is it?");
                self.show_hint(ui, "Help");
            });
        });
    }

    fn show_hint(&self, ui: &mut egui::Ui, text: &str) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.label(RichText::new(text).size(12.0).color(self.theme.primary));
            });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = matches!(message.sender, Sender::User);
        let (fill, text_color, align) = if is_user {
            (self.theme.user_bubble, Color32::WHITE, Align::RIGHT)
        } else {
            (self.theme.assistant_bubble, self.theme.text_primary, Align::LEFT)
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            let max_width = ui.available_width() * 0.75;

            ui.horizontal(|ui| {
                if !is_user {
                    ui.label(
                        RichText::new("AI")
                            .size(10.0)
                            .strong()
                            .color(self.theme.primary),
                    );
                }

                egui::Frame::none()
                    .fill(fill)
                    .rounding(self.theme.bubble_rounding)
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                    .show(ui, |ui| {
                        ui.set_max_width(max_width);

                        let label = if is_user {
                            format!("User message: {}", message.text)
                        } else {
                            format!("Assistant response: {}", message.text)
                        };
                        let response = ui.label(RichText::new(&message.text).color(text_color));
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                        });
                    });
            });

            ui.label(
                RichText::new(message.local_time().format("%H:%M").to_string())
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }
}
