//! Venue form and detail panels.

use client_core::MapSession;
use eframe::egui;
use shared::domain::Venue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    None,
    Save,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    None,
    Close,
    Edit,
    Delete,
}

/// Floating form for the open draft. Returns `DraftAction::None` when no
/// draft is open.
pub fn draft_form(ctx: &egui::Context, session: &mut MapSession) -> DraftAction {
    let Some(draft) = session.mode().draft() else {
        return DraftAction::None;
    };
    let title = if draft.editing.is_some() {
        "Edit venue"
    } else {
        "New venue"
    };
    let location = draft.location;
    let Some(form) = session.form_mut() else {
        return DraftAction::None;
    };

    let mut action = DraftAction::None;
    egui::Window::new(title)
        .id(egui::Id::new("venue_draft_form"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            egui::Grid::new("venue_draft_grid")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut form.name);
                    ui.end_row();

                    ui.label("Address");
                    ui.text_edit_singleline(&mut form.address);
                    ui.end_row();

                    ui.label("Opens");
                    ui.add(egui::TextEdit::singleline(&mut form.hours_start).desired_width(60.0));
                    ui.end_row();

                    ui.label("Closes");
                    ui.add(egui::TextEdit::singleline(&mut form.hours_end).desired_width(60.0));
                    ui.end_row();

                    ui.label("Location");
                    match location {
                        Some(at) => ui.monospace(format!("{:.5}, {:.5}", at.lng, at.lat)),
                        None => ui.weak("not placed"),
                    };
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let can_save = !form.name.trim().is_empty() && location.is_some();
                if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                    action = DraftAction::Save;
                }
                if ui.button("Cancel").clicked() {
                    action = DraftAction::Cancel;
                }
            });
        });
    action
}

pub fn detail_panel(ctx: &egui::Context, venue: &Venue) -> DetailAction {
    let mut action = DetailAction::None;
    egui::SidePanel::right("venue_detail_panel")
        .resizable(false)
        .exact_width(280.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&venue.name);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        action = DetailAction::Close;
                    }
                });
            });
            ui.separator();
            if !venue.address.is_empty() {
                ui.label(&venue.address);
            }
            if !venue.hours.is_empty() {
                ui.label(format!("Open: {}", venue.hours));
            }
            if let Some(at) = venue.location() {
                ui.weak(format!("{:.5}, {:.5}", at.lng, at.lat));
            }
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Edit").clicked() {
                    action = DetailAction::Edit;
                }
                if ui.button("Delete").clicked() {
                    action = DetailAction::Delete;
                }
            });
        });
    action
}
