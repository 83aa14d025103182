use crate::conversation::ConversationController;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

/// Title bar with device status, theme toggle and new-session button
pub struct Header<'a> {
    controller: &'a mut ConversationController,
    theme: &'a Theme,
    dark_mode: &'a mut bool,
}

impl<'a> Header<'a> {
    pub fn new(controller: &'a mut ConversationController, theme: &'a Theme, dark_mode: &'a mut bool) -> Self {
        Self {
            controller,
            theme,
            dark_mode,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Parley")
                    .size(20.0)
                    .strong()
                    .color(self.theme.text_primary),
            );

            if self.controller.is_speaking() {
                ui.label(RichText::new("🔊").color(self.theme.success))
                    .widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Speaking"));
            }
            if self.controller.is_listening() {
                ui.label(RichText::new("🎤").color(self.theme.listening))
                    .widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Listening"));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (icon, tooltip) = if *self.dark_mode {
                    ("☀", "Switch to Bright Mode")
                } else {
                    ("🌙", "Switch to Night Mode")
                };
                let toggle = ui
                    .add(
                        egui::Button::new(RichText::new(icon).size(16.0))
                            .min_size(Vec2::splat(32.0))
                            .rounding(self.theme.button_rounding),
                    )
                    .on_hover_text(tooltip);
                toggle.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Toggle theme"));
                if toggle.clicked() {
                    *self.dark_mode = !*self.dark_mode;
                }

                let new_session = ui
                    .add(
                        egui::Button::new(RichText::new("➕").size(16.0))
                            .min_size(Vec2::splat(32.0))
                            .rounding(self.theme.button_rounding),
                    )
                    .on_hover_text("New conversation");
                new_session.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "New session"));
                if new_session.clicked() {
                    self.controller.new_session();
                }
            });
        });
    }
}
