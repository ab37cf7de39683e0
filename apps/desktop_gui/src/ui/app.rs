use std::time::Duration;

use client_core::{
    render, state::Severity, Action, AppState, BindingTable, ClientSettings, Page,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{err_label, UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::panels;

#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

pub struct TravellerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: AppState,
    page: Page,
    server_url: String,
    status_banner: Option<StatusBanner>,
    confirm_delete: bool,
}

impl TravellerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &ClientSettings,
        bindings: &BindingTable,
        startup_error: Option<UiError>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            state: AppState::new(settings.features),
            page: Page::new(bindings),
            server_url: settings.server_url.to_string(),
            status_banner: None,
            confirm_delete: false,
        };
        if let Some(err) = startup_error {
            app.show_error(err);
        }
        app.dispatch(Action::Refresh);
        app
    }

    fn show_error(&mut self, err: UiError) {
        tracing::error!(context = ?err.context(), "{}", err.message());
        self.status_banner = Some(StatusBanner {
            message: format!("{} error: {}", err_label(err.category()), err.message()),
        });
    }

    fn dispatch(&mut self, action: Action) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Perform(action),
            &mut self.state,
        );
        self.rerender();
    }

    fn rerender(&mut self) {
        render(&self.state, &mut self.page);
    }

    fn process_ui_events(&mut self) {
        let mut changed = false;
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Report(report) => self.state.apply(report),
                UiEvent::Error(err) => self.show_error(err),
            }
            changed = true;
        }
        if changed {
            self.rerender();
        }
    }

    fn on_clicked(&mut self, action: Action) {
        if action == Action::Delete {
            self.confirm_delete = true;
        } else {
            self.dispatch(action);
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
        }
    }

    fn show_status_line(&self, ui: &mut egui::Ui) {
        let text = self
            .page
            .text(client_core::ElementId::MessageDisplay)
            .unwrap_or_default();
        let is_error = self.state.pending().is_empty()
            && self
                .state
                .status()
                .is_some_and(|status| status.severity == Severity::Error);
        ui.horizontal(|ui| {
            if !self.state.pending().is_empty() {
                ui.spinner();
            }
            if is_error {
                ui.colored_label(egui::Color32::from_rgb(220, 110, 110), text);
            } else {
                ui.label(text);
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak(&self.server_url);
            });
        });
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_delete {
            return;
        }
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Delete character")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Delete this character? This cannot be undone.");
                ui.horizontal(|ui| {
                    confirmed = ui.button("Delete").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });
        if confirmed {
            self.confirm_delete = false;
            self.dispatch(Action::Delete);
        } else if cancelled {
            self.confirm_delete = false;
        }
    }
}

impl eframe::App for TravellerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            self.show_status_line(ui);
        });

        egui::SidePanel::left("character_record")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Character");
                ui.separator();
                panels::record_panel(ui, &self.page);
            });

        let mut clicked = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            if !self.state.is_initialized() {
                ui.label("Loading character...");
                return;
            }
            clicked = panels::action_panel(ui, &self.page);
            panels::outcome_log(ui, &self.page);
        });
        if let Some(action) = clicked {
            self.on_clicked(action);
        }

        self.show_delete_confirmation(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
