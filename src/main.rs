mod api;
mod colors;
mod settings;
mod ui;
mod ui_settings;
mod utils;

use eframe::egui;
use std::sync::mpsc;
use std::thread;

use crate::api::ApiConfig;
use crate::settings::{sanitize_base_url, Settings, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::ui_settings::SettingsAction;
use crate::utils::{ResponseAnalysis, WorkerCommand, WorkerMessage};

struct ViewerApp {
    settings: Settings,

    input: String,

    sent_prompt: Option<String>,

    analysis: Option<ResponseAnalysis>,

    error_message: Option<String>,

    is_sending: bool,

    show_settings: bool,

    key_buffer: String,

    url_buffer: String,

    model_buffer: String,

    worker_tx: Option<mpsc::Sender<WorkerCommand>>,

    worker_rx: Option<mpsc::Receiver<WorkerMessage>>,

    worker_handle: Option<thread::JoinHandle<()>>,
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let _ = env_logger::try_init();

        let settings = Settings::load();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (msg_tx, msg_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            api::run_request_worker(cmd_rx, msg_tx);
        });

        Self {
            key_buffer: settings.api_key.clone().unwrap_or_default(),
            url_buffer: settings.api_base_url.clone(),
            model_buffer: settings.model.clone(),
            settings,
            input: String::new(),
            sent_prompt: None,
            analysis: None,
            error_message: None,
            is_sending: false,
            show_settings: false,
            worker_tx: Some(cmd_tx),
            worker_rx: Some(msg_rx),
            worker_handle: Some(handle),
        }
    }

    // One request in flight at a time: the send action is disabled while the
    // worker is busy, typing stays possible.
    fn can_send(&self) -> bool {
        !self.input.trim().is_empty()
            && self.settings.api_key.is_some()
            && !self.is_sending
            && self.worker_tx.is_some()
    }

    fn send_message(&mut self) {
        if !self.can_send() {
            return;
        }

        // Without a configured key the send action does nothing at all.
        let config = match ApiConfig::from_settings(&self.settings) {
            Ok(config) => config,
            Err(_) => return,
        };

        let prompt = self.input.trim().to_string();

        if let Some(ref tx) = self.worker_tx {
            self.is_sending = true;
            self.error_message = None;
            self.sent_prompt = Some(prompt.clone());

            if let Err(e) = tx.send(WorkerCommand::Send { prompt, config }) {
                self.error_message = Some(format!("Failed to send command: {}", e));
                self.is_sending = false;
                return;
            }

            self.input.clear();
        }
    }

    fn process_worker_messages(&mut self) {
        if let Some(ref rx) = self.worker_rx {
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    WorkerMessage::Started => {
                        self.is_sending = true;
                    }
                    WorkerMessage::Completed(analysis) => {
                        self.analysis = Some(analysis);
                        self.is_sending = false;
                    }
                    WorkerMessage::Error(error) => {
                        let prompt = self.sent_prompt.clone().unwrap_or_default();
                        self.analysis = Some(ResponseAnalysis::error_sentinel(prompt));
                        self.error_message = Some(error);
                        self.is_sending = false;
                    }
                }
            }
        }
    }

    fn apply_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::Save => {
                let key = self.key_buffer.trim();
                self.settings.api_key = if key.is_empty() {
                    None
                } else {
                    Some(key.to_string())
                };

                let url = sanitize_base_url(self.url_buffer.trim());
                self.settings.api_base_url = if url.is_empty() {
                    DEFAULT_API_BASE_URL.to_string()
                } else {
                    url
                };

                let model = self.model_buffer.trim();
                self.settings.model = if model.is_empty() {
                    DEFAULT_MODEL.to_string()
                } else {
                    model.to_string()
                };

                self.url_buffer = self.settings.api_base_url.clone();
                self.model_buffer = self.settings.model.clone();

                if let Err(e) = self.settings.save() {
                    log::warn!("Failed to save settings: {}", e);
                }
            }
            SettingsAction::ClearKey => {
                self.key_buffer.clear();
            }
        }
    }

    fn shutdown_worker(&mut self) {
        if let Some(tx) = self.worker_tx.take() {
            let _ = tx.send(WorkerCommand::Shutdown);
        }
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
        self.worker_rx = None;
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_worker_messages();

        if self.is_sending {
            ctx.request_repaint();
        }

        if self.show_settings {
            let mut open = true;
            let action = ui_settings::render_settings_window(
                ctx,
                &mut open,
                &mut self.key_buffer,
                &mut self.url_buffer,
                &mut self.model_buffer,
            );
            self.show_settings = open;
            if let Some(action) = action {
                self.apply_settings_action(action);
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none().inner_margin(20.0).show(ui, |ui| {
                if ui::render_header(ui, self.settings.api_key.is_some(), &self.settings.model) {
                    self.show_settings = true;
                }

                ui.add_space(12.0);

                // Reserve room for the error banner and the prompt row below
                // the scrollable results.
                let results_height = (ui.available_height() - 90.0).max(120.0);

                if self.is_sending {
                    ui::render_busy(ui, self.sent_prompt.as_deref().unwrap_or(""));
                } else if let Some(ref analysis) = self.analysis {
                    ui::render_results(ui, analysis, results_height);
                } else {
                    ui::render_empty_state(ui, self.settings.api_key.is_some());
                }

                if let Some(ref error) = self.error_message {
                    ui::render_error(ui, error);
                }

                let can_send = self.can_send();
                let is_sending = self.is_sending;
                if ui::render_prompt_input(ui, &mut self.input, can_send, is_sending) {
                    self.send_message();
                }
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown_worker();
    }
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Logprob Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Logprob Viewer",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)))),
    )
}
