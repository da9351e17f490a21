use egui::RichText;

use crate::settings;

#[derive(PartialEq)]
pub enum SettingsAction {
    Save,
    ClearKey,
}

pub fn render_settings_window(
    ctx: &egui::Context,
    open: &mut bool,
    key_buffer: &mut String,
    url_buffer: &mut String,
    model_buffer: &mut String,
) -> Option<SettingsAction> {
    let mut action = None;
    egui::Window::new("Settings")
        .open(open)
        .min_size([350.0, 220.0])
        .show(ctx, |ui| {
            ui.heading("API Settings");
            ui.add_space(10.0);

            ui.group(|ui| {
                ui.label(RichText::new("Provider Configuration").strong());
                ui.add_space(8.0);

                ui.label("API Key:");
                ui.add(
                    egui::TextEdit::singleline(key_buffer)
                        .hint_text("sk-...")
                        .password(true)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(8.0);

                ui.label("API Base URL:");
                ui.add(
                    egui::TextEdit::singleline(url_buffer)
                        .hint_text(settings::DEFAULT_API_BASE_URL)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(8.0);

                ui.label("Model:");
                ui.add(
                    egui::TextEdit::singleline(model_buffer)
                        .hint_text(settings::DEFAULT_MODEL)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    if !key_buffer.is_empty() {
                        if ui.button("❌ Clear Key").clicked() {
                            action = Some(SettingsAction::ClearKey);
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("💾 Save").clicked() {
                            action = Some(SettingsAction::Save);
                        }
                    });
                });
            });
        });
    action
}
