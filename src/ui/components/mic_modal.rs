use crate::conversation::ConversationController;
use crate::ui::theme::Theme;
use egui::{self, Align2, RichText, Vec2};

/// Overlay shown while voice input is open
pub struct MicModal<'a> {
    controller: &'a mut ConversationController,
    theme: &'a Theme,
}

impl<'a> MicModal<'a> {
    pub fn new(controller: &'a mut ConversationController, theme: &'a Theme) -> Self {
        Self { controller, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        if !self.controller.session().mic_modal_visible {
            return;
        }

        let listening = self.controller.is_listening();
        let transcript = self.controller.speech_input().transcript().to_string();
        let mut close = false;

        egui::Window::new("Voice input")
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(260.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("🎤").size(40.0).color(if listening {
                        self.theme.listening
                    } else {
                        self.theme.text_muted
                    }));

                    let status = if listening { "Listening..." } else { "Starting..." };
                    ui.label(RichText::new(status).size(16.0).color(self.theme.text_primary));

                    if !transcript.is_empty() {
                        ui.add_space(self.theme.spacing_sm);
                        ui.label(RichText::new(&transcript).italics().color(self.theme.text_secondary));
                    }

                    ui.add_space(self.theme.spacing);

                    let stop = ui.add(
                        egui::Button::new(RichText::new("Stop").color(egui::Color32::WHITE))
                            .fill(self.theme.listening)
                            .rounding(self.theme.button_rounding),
                    );
                    stop.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Stop listening"));
                    close = stop.clicked();
                });
            });

        if close {
            self.controller.close_mic_modal();
        }
    }
}
