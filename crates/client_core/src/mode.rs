//! Interaction mode: idle, placing a new venue, or filling a draft.

use shared::domain::{LngLat, Venue, VenueId};
use tracing::debug;

pub const DEFAULT_HOURS_START: &str = "12:00";
pub const DEFAULT_HOURS_END: &str = "00:00";
const HOURS_SEPARATOR: &str = " - ";

pub fn compose_hours(start: &str, end: &str) -> String {
    format!("{start}{HOURS_SEPARATOR}{end}")
}

/// Splits `"<start> - <end>"`. Anything else yields the default pair.
pub fn parse_hours(hours: &str) -> (String, String) {
    let parts: Vec<&str> = hours.split(HOURS_SEPARATOR).collect();
    match parts.as_slice() {
        [start, end] => (start.trim().to_string(), end.trim().to_string()),
        _ => (DEFAULT_HOURS_START.to_string(), DEFAULT_HOURS_END.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub address: String,
    pub hours_start: String,
    pub hours_end: String,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            hours_start: DEFAULT_HOURS_START.to_string(),
            hours_end: DEFAULT_HOURS_END.to_string(),
        }
    }
}

impl FormData {
    pub fn from_venue(venue: &Venue) -> Self {
        let (hours_start, hours_end) = parse_hours(&venue.hours);
        Self {
            name: venue.name.clone(),
            address: venue.address.clone(),
            hours_start,
            hours_end,
        }
    }

    pub fn hours(&self) -> String {
        compose_hours(&self.hours_start, &self.hours_end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// `Some` while editing an existing venue.
    pub editing: Option<VenueId>,
    pub location: Option<LngLat>,
    pub form: FormData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    #[default]
    Idle,
    /// Waiting for a map click to place a new venue.
    Placing,
    Drafting(Draft),
}

impl Mode {
    pub fn is_placing(&self) -> bool {
        matches!(self, Self::Placing)
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Self::Drafting(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn editing_id(&self) -> Option<&VenueId> {
        self.draft().and_then(|draft| draft.editing.as_ref())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Placing => "placing",
            Self::Drafting(Draft { editing: None, .. }) => "creating",
            Self::Drafting(_) => "editing",
        }
    }
}

/// Owns the one mode value that map clicks are dispatched against.
#[derive(Debug, Default)]
pub struct ModeMachine {
    mode: Mode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.mode.draft()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormData> {
        match &mut self.mode {
            Mode::Drafting(draft) => Some(&mut draft.form),
            _ => None,
        }
    }

    /// Flips placing on or off. An open draft is discarded when turning
    /// placing on. Returns whether placing is now active.
    pub fn toggle_placing(&mut self) -> bool {
        let next = match self.mode {
            Mode::Placing => Mode::Idle,
            _ => Mode::Placing,
        };
        self.transition(next);
        self.mode.is_placing()
    }

    /// Map click dispatch. Only a click while placing opens a draft.
    pub fn on_map_click(&mut self, at: LngLat) -> bool {
        if !self.mode.is_placing() {
            return false;
        }
        self.transition(Mode::Drafting(Draft {
            editing: None,
            location: Some(at),
            form: FormData::default(),
        }));
        true
    }

    pub fn start_editing(&mut self, venue: &Venue) {
        self.transition(Mode::Drafting(Draft {
            editing: Some(venue.id.clone()),
            location: venue.location(),
            form: FormData::from_venue(venue),
        }));
    }

    /// Drops an open draft. Placing and idle are left as they are.
    pub fn discard_draft(&mut self) -> bool {
        if self.mode.draft().is_none() {
            return false;
        }
        self.transition(Mode::Idle);
        true
    }

    pub fn cancel(&mut self) {
        self.transition(Mode::Idle);
    }

    fn transition(&mut self, next: Mode) {
        debug!(from = self.mode.label(), to = next.label(), "mode: transition");
        self.mode = next;
    }
}
