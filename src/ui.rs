use crate::colors;
use crate::utils::{ResponseAnalysis, TokenRecord};
use egui::{Color32, FontId, RichText, Ui, Vec2};

pub fn render_header(ui: &mut Ui, has_key: bool, model: &str) -> bool {
    let mut settings_clicked = false;

    ui.horizontal(|ui| {
        ui.heading(
            RichText::new("🔍 Logprob Viewer")
                .size(28.0)
                .color(colors::ACCENT_PRIMARY),
        );

        ui.add_space(20.0);

        if has_key {
            ui.label(
                RichText::new(format!("🔑 {}", model))
                    .color(colors::SUCCESS)
                    .size(14.0),
            );
        } else {
            ui.label(
                RichText::new("❌ No API key configured").color(colors::text_muted(ui.visuals())),
            );
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(RichText::new("⚙ Settings").size(14.0)).clicked() {
                settings_clicked = true;
            }
        });
    });

    ui.add_space(8.0);
    ui.separator();

    settings_clicked
}

// Returns true when the prompt was submitted, either with Enter or the
// send button.
pub fn render_prompt_input(ui: &mut Ui, text: &mut String, enabled: bool, is_sending: bool) -> bool {
    ui.add_space(12.0);

    let mut submitted = false;
    ui.horizontal(|ui| {
        let text_edit = egui::TextEdit::singleline(text)
            .desired_width((ui.available_width() - 130.0).max(200.0))
            .font(FontId::monospace(14.0))
            .hint_text("Type your message...");

        let response = ui.add(text_edit);
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submitted = true;
        }

        let button_text = if is_sending {
            "⏳ Sending..."
        } else {
            "📤 Send"
        };

        if ui
            .add_enabled(
                enabled,
                egui::Button::new(RichText::new(button_text).size(14.0))
                    .min_size(Vec2::new(110.0, 24.0)),
            )
            .clicked()
        {
            submitted = true;
        }
    });

    submitted
}

pub fn render_results(ui: &mut Ui, analysis: &ResponseAnalysis, height: f32) {
    ui.add_space(16.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("📊 Response")
                .size(16.0)
                .color(colors::text_primary(ui.visuals())),
        );

        ui.add_space(20.0);

        ui.label(
            RichText::new(format!("⏱ {}ms", analysis.elapsed_ms))
                .color(colors::text_muted(ui.visuals()))
                .size(12.0),
        );

        ui.add_space(10.0);

        ui.label(
            RichText::new(format!("🧮 {} tokens", analysis.tokens.len()))
                .color(colors::INFO)
                .size(12.0),
        );

        ui.add_space(10.0);

        if let Some(perplexity) = analysis.perplexity() {
            ui.label(
                RichText::new(format!("❓ Perplexity: {:.2}", perplexity))
                    .color(colors::WARNING)
                    .size(12.0),
            )
            .on_hover_text("Perplexity (lower means the model was MORE confident)");
        }
    });

    ui.add_space(12.0);

    render_legend(ui);

    ui.add_space(12.0);

    let scroll_height = (height - 100.0).max(100.0);
    egui::ScrollArea::vertical()
        .id_salt("results_scroll")
        .max_height(scroll_height)
        .show(ui, |ui| {
            render_prompt_bubble(ui, &analysis.prompt);
            ui.add_space(8.0);
            render_token_flow(ui, &analysis.tokens);
        });
}

fn render_prompt_bubble(ui: &mut Ui, prompt: &str) {
    egui::Frame::none()
        .fill(colors::secondary_bg(ui.visuals()))
        .rounding(8.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(
                RichText::new(prompt)
                    .color(colors::text_primary(ui.visuals()))
                    .size(14.0),
            );
        });
}

fn render_legend(ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("Legend:").size(12.0));
        ui.add_space(8.0);

        let blue_rect = ui.allocate_space(Vec2::new(16.0, 16.0));
        ui.painter().rect_filled(
            blue_rect.1,
            2.0,
            colors::logprob_color(0.0, colors::PRIMARY_CLAMP),
        );
        ui.label(RichText::new("Likely (logprob ≈ 0)").size(11.0));

        ui.add_space(8.0);

        let mid_rect = ui.allocate_space(Vec2::new(16.0, 16.0));
        ui.painter().rect_filled(
            mid_rect.1,
            2.0,
            colors::logprob_color(-colors::PRIMARY_CLAMP / 2.0, colors::PRIMARY_CLAMP),
        );
        ui.label(RichText::new("Uncertain").size(11.0));

        ui.add_space(8.0);

        let yellow_rect = ui.allocate_space(Vec2::new(16.0, 16.0));
        ui.painter().rect_filled(
            yellow_rect.1,
            2.0,
            colors::logprob_color(-colors::PRIMARY_CLAMP, colors::PRIMARY_CLAMP),
        );
        ui.label(RichText::new("Unlikely (logprob ≤ -1)").size(11.0));
    });
}

fn render_token_flow(ui: &mut Ui, tokens: &[TokenRecord]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = Vec2::new(0.0, 4.0);

        for token in tokens {
            render_single_token(ui, token);
        }
    });
}

fn render_single_token(ui: &mut Ui, token: &TokenRecord) {
    let bg_color = token.get_color();

    let text_color = if is_light_color(bg_color) {
        colors::TEXT_DARK
    } else {
        colors::TEXT_WHITE
    };

    let response = ui.add(
        egui::Label::new(
            RichText::new(&token.display_text)
                .color(text_color)
                .background_color(bg_color)
                .size(14.0)
                .family(egui::FontFamily::Monospace),
        )
        .sense(egui::Sense::hover()),
    );

    response.on_hover_ui(|ui| {
        ui.set_max_width(260.0);

        ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
            // The token text should have a grey background
            ui.label(
                RichText::new(token.token.clone())
                    .strong()
                    .monospace()
                    .background_color(colors::secondary_bg(ui.visuals())),
            );
            if token.logprob.is_finite() {
                ui.label(RichText::new(format!("(logprob: {:.4})", token.logprob)));
            }
        });

        if !token.alternatives.is_empty() {
            ui.add_space(8.0);
            ui.label(RichText::new("Top 5 alternatives:").strong());
            for (i, alternative) in token.alternatives.iter().enumerate() {
                let display_alt = alternative.token.replace('\n', "↵").replace('\t', "→");
                ui.horizontal(|ui| {
                    ui.label(format!("{}.", i + 1));
                    ui.label(
                        RichText::new(display_alt)
                            .monospace()
                            .color(colors::logprob_color(
                                alternative.logprob,
                                colors::ALTERNATIVE_CLAMP,
                            )),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("{:.4}", alternative.logprob));
                    });
                });
            }
        }
    });
}

fn is_light_color(color: Color32) -> bool {
    let luminance = 0.299 * color.r() as f32 + 0.587 * color.g() as f32 + 0.114 * color.b() as f32;
    luminance > 128.0
}

pub fn render_busy(ui: &mut Ui, prompt: &str) {
    ui.add_space(16.0);
    ui.separator();
    ui.add_space(8.0);

    render_prompt_bubble(ui, prompt);

    ui.add_space(20.0);

    ui.vertical_centered(|ui| {
        ui.spinner();
        ui.add_space(8.0);
        ui.label(
            RichText::new("Waiting for the model...").color(colors::text_muted(ui.visuals())),
        );
    });
}

pub fn render_empty_state(ui: &mut Ui, has_key: bool) {
    ui.add_space(40.0);

    ui.vertical_centered(|ui| {
        ui.label(RichText::new("🔍").size(64.0));

        ui.add_space(16.0);

        let message = if has_key {
            "Type a message and press Enter"
        } else {
            "Open Settings and enter an API key to get started"
        };

        ui.label(
            RichText::new(message)
                .size(18.0)
                .color(colors::text_muted(ui.visuals())),
        );

        ui.add_space(8.0);

        ui.label(
            RichText::new("Response tokens are colored by how likely the model found them")
                .size(14.0)
                .color(colors::text_very_muted(ui.visuals())),
        );
    });
}

pub fn render_error(ui: &mut Ui, error: &str) {
    ui.add_space(12.0);

    let error_bg = colors::error_bg(ui.visuals());
    egui::Frame::none()
        .fill(error_bg)
        .rounding(8.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("❌").size(18.0));
                ui.add_space(8.0);
                ui.label(RichText::new(error).color(colors::ERROR).size(14.0));
            });
        });
}
