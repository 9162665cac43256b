//! Selection and form coordination over venues, mode, viewport and markers.
//!
//! `MapSession` never awaits. Operations that need the store hand back a
//! `StoreCommand`; whoever owns the async side runs it and feeds the
//! `StoreOutcome` to `apply_outcome`, which may ask for a follow-up refresh.

use shared::domain::{LngLat, Venue, VenueFields, VenueId, Viewport};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    config::MapSettings,
    map::{MapEvent, MapWidget},
    markers::MarkerSync,
    mode::{FormData, Mode, ModeMachine},
    store::{execute, StoreCommand, StoreError, StoreOutcome, VenueStore},
    viewport::ViewportController,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    NotLoaded,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no venue form is open")]
    NoDraft,
    #[error("venue name must not be empty")]
    EmptyName,
    #[error("venue has no location")]
    MissingLocation,
}

/// Destructive-action gate.
pub trait ConfirmPrompt {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug)]
pub struct MapSession {
    venues: Vec<Venue>,
    fetch_status: FetchStatus,
    selection: Option<Venue>,
    mode: ModeMachine,
    viewport: ViewportController,
    markers: MarkerSync,
    alerts: Vec<String>,
    mounted: bool,
}

impl MapSession {
    pub fn new(viewport: ViewportController) -> Self {
        Self {
            venues: Vec::new(),
            fetch_status: FetchStatus::NotLoaded,
            selection: None,
            mode: ModeMachine::new(),
            viewport,
            markers: MarkerSync::new(),
            alerts: Vec::new(),
            mounted: false,
        }
    }

    pub fn from_settings(map: &MapSettings) -> Self {
        Self::new(ViewportController::from_settings(map))
    }

    /// Binds to a freshly constructed widget and asks for the initial load.
    pub fn mount(&mut self, widget: &mut dyn MapWidget) -> StoreCommand {
        self.mounted = true;
        self.viewport.sync_from(widget);
        StoreCommand::Refresh
    }

    /// Tears down markers and releases the widget. Outcomes arriving later
    /// are dropped.
    pub fn unmount(&mut self, widget: &mut dyn MapWidget) {
        self.markers.clear(widget);
        widget.destroy();
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn venue(&self, id: &VenueId) -> Option<&Venue> {
        self.venues.iter().find(|venue| &venue.id == id)
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.fetch_status
    }

    pub fn selection(&self) -> Option<&Venue> {
        self.selection.as_ref()
    }

    pub fn mode(&self) -> &Mode {
        self.mode.mode()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn readout(&self) -> String {
        self.viewport.viewport().readout()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> &MarkerSync {
        &self.markers
    }

    /// Messages that need the user's attention, oldest first.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Single entry point for widget events; the current mode is consulted
    /// when the event arrives.
    pub fn handle_map_event(&mut self, event: MapEvent, widget: &mut dyn MapWidget) {
        match event {
            MapEvent::Moved => self.viewport.sync_from(widget),
            MapEvent::Clicked(at) => {
                if self.mode.on_map_click(at) {
                    self.selection = None;
                    debug!(lng = at.lng, lat = at.lat, "session: draft placed");
                }
            }
            MapEvent::MarkerClicked(marker) => match self.markers.venue_for(marker).cloned() {
                Some(id) => {
                    self.select(&id, widget);
                }
                None => debug!(marker = marker.0, "session: click on stale marker ignored"),
            },
        }
    }

    pub fn toggle_add(&mut self) -> bool {
        self.mode.toggle_placing()
    }

    /// Shows a venue in the detail panel, closes any open form and flies
    /// the map to it.
    pub fn select(&mut self, id: &VenueId, widget: &mut dyn MapWidget) -> bool {
        let Some(venue) = self.venue(id).cloned() else {
            warn!(venue_id = %id, "session: cannot select unknown venue");
            return false;
        };
        self.mode.discard_draft();
        if let Some(at) = venue.location() {
            self.viewport.focus_on(widget, at);
        }
        self.selection = Some(venue);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn reset_view(&mut self, widget: &mut dyn MapWidget) {
        self.viewport.reset_to_default(widget);
        self.selection = None;
    }

    /// Opens the edit form for the selected venue and clears the selection.
    pub fn start_editing(&mut self) -> bool {
        let Some(venue) = self.selection.take() else {
            return false;
        };
        self.mode.start_editing(&venue);
        true
    }

    pub fn cancel_draft(&mut self) {
        self.mode.cancel();
    }

    pub fn form_mut(&mut self) -> Option<&mut FormData> {
        self.mode.form_mut()
    }

    pub fn draft_location(&self) -> Option<LngLat> {
        self.mode.draft().and_then(|draft| draft.location)
    }

    /// Validates the open draft and builds the store write for it. Nothing
    /// changes locally until the outcome arrives.
    pub fn submit_draft(&self) -> Result<StoreCommand, SubmitError> {
        let result = self.build_submit();
        if let Err(err) = &result {
            warn!(error = %err, "session: draft not submitted");
        }
        result
    }

    fn build_submit(&self) -> Result<StoreCommand, SubmitError> {
        let draft = self.mode.draft().ok_or(SubmitError::NoDraft)?;
        let name = draft.form.name.trim();
        if name.is_empty() {
            return Err(SubmitError::EmptyName);
        }
        let location = draft.location.ok_or(SubmitError::MissingLocation)?;

        let fields = VenueFields {
            name: name.to_string(),
            address: draft.form.address.clone(),
            hours: draft.form.hours(),
            location: None,
        };
        Ok(match &draft.editing {
            Some(id) => StoreCommand::Update {
                id: id.clone(),
                fields,
            },
            None => StoreCommand::Create(VenueFields {
                location: Some(location),
                ..fields
            }),
        })
    }

    pub fn delete_prompt(&self, id: &VenueId) -> String {
        let label = self
            .venue(id)
            .map_or_else(|| id.to_string(), |venue| venue.name.clone());
        format!("Are you sure you want to delete \"{label}\"?")
    }

    /// Asks `prompt` first; a declined prompt issues nothing and changes
    /// nothing.
    pub fn request_delete(
        &self,
        id: &VenueId,
        prompt: &mut impl ConfirmPrompt,
    ) -> Option<StoreCommand> {
        if !prompt.confirm(&self.delete_prompt(id)) {
            debug!(venue_id = %id, "session: delete declined");
            return None;
        }
        Some(StoreCommand::Delete { id: id.clone() })
    }

    pub fn apply_outcome(
        &mut self,
        outcome: StoreOutcome,
        widget: &mut dyn MapWidget,
    ) -> Option<StoreCommand> {
        if !self.mounted {
            debug!("session: dropping store outcome after unmount");
            return None;
        }

        match outcome {
            StoreOutcome::Listed(Ok(venues)) => {
                self.venues = venues;
                self.fetch_status = FetchStatus::Loaded;
                let rendered = self.markers.rebuild(&self.venues, widget);
                info!(
                    venues = self.venues.len(),
                    markers = rendered,
                    "session: venue list applied"
                );
                None
            }
            StoreOutcome::Listed(Err(err)) => {
                error!(error = %err, "session: venue list unavailable");
                self.fetch_status = FetchStatus::Failed;
                self.venues.clear();
                self.selection = None;
                self.markers.rebuild(&self.venues, widget);
                None
            }
            StoreOutcome::Created(Ok(id)) => {
                info!(venue_id = %id, "session: venue created");
                self.finish_write();
                Some(StoreCommand::Refresh)
            }
            StoreOutcome::Updated { id, result: Ok(()) } => {
                info!(venue_id = %id, "session: venue updated");
                self.finish_write();
                Some(StoreCommand::Refresh)
            }
            StoreOutcome::Created(Err(err)) | StoreOutcome::Updated { result: Err(err), .. } => {
                error!(error = %err, "session: save failed; form kept open");
                None
            }
            StoreOutcome::Deleted { id, result: Ok(()) } => {
                info!(venue_id = %id, "session: venue deleted");
                self.selection = None;
                Some(StoreCommand::Refresh)
            }
            StoreOutcome::Deleted { id, result: Err(err) } => {
                error!(venue_id = %id, error = %err, "session: delete failed");
                self.alerts.push(format!("Could not delete venue: {err}"));
                None
            }
        }
    }

    fn finish_write(&mut self) {
        self.mode.cancel();
        self.selection = None;
    }
}

/// Runs `command` and every follow-up it triggers. Stops at the first
/// failed outcome, after the session has recorded it.
pub async fn drive(
    store: &dyn VenueStore,
    session: &mut MapSession,
    widget: &mut dyn MapWidget,
    command: StoreCommand,
) -> Result<(), StoreError> {
    let mut next = Some(command);
    while let Some(command) = next.take() {
        debug!(command = command.name(), "session: running store command");
        let outcome = execute(store, command).await;
        let failure = outcome.error();
        next = session.apply_outcome(outcome, widget);
        if let Some(err) = failure {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
