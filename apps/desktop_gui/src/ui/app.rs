use std::time::Duration;

use client_core::{FetchStatus, MapOptions, MapSession, Settings, StoreCommand, StoreOutcome};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::VenueId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::{
    map_canvas::MapCanvas,
    panels::{detail_panel, draft_form, DetailAction, DraftAction},
};

struct PendingDelete {
    id: VenueId,
    prompt: String,
}

pub struct VenueMapApp {
    session: MapSession,
    canvas: MapCanvas,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    status_banner: Option<UiError>,
    pending_delete: Option<PendingDelete>,
    alert: Option<String>,
}

impl VenueMapApp {
    pub fn new(
        settings: &Settings,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup_error: Option<UiError>,
    ) -> Self {
        let mut canvas = MapCanvas::new(MapOptions::from_settings(&settings.map));
        let mut session = MapSession::from_settings(&settings.map);
        let initial = session.mount(&mut canvas);

        let mut app = Self {
            session,
            canvas,
            cmd_tx,
            ui_rx,
            status: "Loading venues...".to_string(),
            status_banner: startup_error,
            pending_delete: None,
            alert: None,
        };
        app.dispatch(initial);
        app
    }

    fn dispatch(&mut self, command: StoreCommand) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Store(command),
            &mut self.status,
        );
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "ui: {}",
                        err.message()
                    );
                    self.status = err.message().to_string();
                    self.status_banner = Some(err);
                }
                UiEvent::Store(outcome) => self.apply_store_outcome(outcome),
            }
        }
    }

    fn apply_store_outcome(&mut self, outcome: StoreOutcome) {
        let context = UiErrorContext::for_outcome(&outcome);
        match outcome.error() {
            Some(err) => {
                let ui_error = UiError::from_store(context, &err);
                self.status = ui_error.message().to_string();
                if context == UiErrorContext::LoadVenues {
                    self.status_banner = Some(ui_error);
                }
            }
            None => {
                if context == UiErrorContext::LoadVenues {
                    self.status_banner = None;
                }
            }
        }

        let follow_up = self.session.apply_outcome(outcome, &mut self.canvas);
        if context == UiErrorContext::LoadVenues && self.session.fetch_status() == FetchStatus::Loaded {
            self.status = format!("{} venues", self.session.venues().len());
        }
        if let Some(alert) = self.session.take_alerts().pop() {
            self.alert = Some(alert);
        }
        if let Some(command) = follow_up {
            self.dispatch(command);
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("venue_map_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.monospace(self.session.readout());
                ui.separator();
                if ui.button("Reset view").clicked() {
                    self.session.reset_view(&mut self.canvas);
                }
                let placing = self.session.mode().is_placing();
                let toggle_label = if placing { "Cancel" } else { "Add venue" };
                if ui.add(egui::Button::new(toggle_label).selected(placing)).clicked() {
                    self.session.toggle_add();
                }
                if placing {
                    ui.weak("Click the map to place the new venue");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(&self.status);
                });
            });
            if let Some(banner) = &self.status_banner {
                ui.colored_label(egui::Color32::from_rgb(214, 69, 65), banner.message());
            }
        });
    }

    fn show_panels(&mut self, ctx: &egui::Context) {
        if let Some(venue) = self.session.selection().cloned() {
            match detail_panel(ctx, &venue) {
                DetailAction::None => {}
                DetailAction::Close => self.session.clear_selection(),
                DetailAction::Edit => {
                    self.session.start_editing();
                }
                DetailAction::Delete => {
                    self.pending_delete = Some(PendingDelete {
                        prompt: self.session.delete_prompt(&venue.id),
                        id: venue.id,
                    });
                }
            }
        }

        match draft_form(ctx, &mut self.session) {
            DraftAction::None => {}
            DraftAction::Cancel => self.session.cancel_draft(),
            DraftAction::Save => match self.session.submit_draft() {
                Ok(command) => self.dispatch(command),
                Err(err) => {
                    let err = UiError::from_submit(err);
                    self.status = err.message().to_string();
                }
            },
        }
    }

    fn show_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.pending_delete else {
            return;
        };
        let mut decision = None;
        egui::Window::new("Delete venue")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&pending.prompt);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Keep").clicked() {
                        decision = Some(false);
                    }
                });
            });

        let Some(confirmed) = decision else {
            return;
        };
        if let Some(pending) = self.pending_delete.take() {
            let mut answer = |_: &str| confirmed;
            if let Some(command) = self.session.request_delete(&pending.id, &mut answer) {
                self.dispatch(command);
            }
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.alert else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alert = None;
        }
    }

    fn show_map(&mut self, ctx: &egui::Context) {
        let highlight = self
            .session
            .selection()
            .and_then(|venue| self.session.markers().marker_for(&venue.id));
        self.canvas.set_highlight(highlight);
        self.canvas.set_draft_pin(self.session.draft_location());
        self.canvas.set_placing(self.session.mode().is_placing());

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                for event in self.canvas.show(ui) {
                    self.session.handle_map_event(event, &mut self.canvas);
                }
            });
    }
}

impl eframe::App for VenueMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_top_bar(ctx);
        self.show_panels(ctx);
        self.show_delete_confirm(ctx);
        self.show_alert(ctx);
        self.show_map(ctx);

        if self.canvas.is_flying() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl Drop for VenueMapApp {
    fn drop(&mut self) {
        self.session.unmount(&mut self.canvas);
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
        tracing::debug!("ui: session unmounted");
    }
}
