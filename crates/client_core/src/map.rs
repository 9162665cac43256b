//! Boundary to the map rendering widget.

use std::collections::BTreeMap;

use shared::domain::{LngLat, Viewport};
use tracing::warn;

use crate::config::MapSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Construction arguments for a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: LngLat,
    pub zoom: f64,
    pub style: String,
}

impl MapOptions {
    pub fn from_settings(map: &MapSettings) -> Self {
        Self {
            center: map.default_center,
            zoom: map.default_zoom,
            style: map.style.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Center or zoom changed; read the new values back from the widget.
    Moved,
    /// Click on the map itself, not on a listening marker.
    Clicked(LngLat),
    MarkerClicked(MarkerId),
}

pub trait MapWidget {
    fn center(&self) -> LngLat;
    fn zoom(&self) -> f64;
    /// Animated move. The widget reports `MapEvent::Moved` as it goes.
    fn fly_to(&mut self, center: LngLat, zoom: f64);
    fn add_marker(&mut self, at: LngLat) -> MarkerId;
    /// Attaches the marker's click handler. A click on a listening marker is
    /// reported as `MarkerClicked` and never reaches the map click handler.
    fn listen_marker_clicks(&mut self, marker: MarkerId);
    fn remove_marker(&mut self, marker: MarkerId);
    fn destroy(&mut self);
}

#[derive(Debug, Clone)]
struct HeadlessMarker {
    at: LngLat,
    listeners: u32,
}

/// Widget without a screen. Moves are instant and queued as events so the
/// owner can feed them back like a real widget would.
#[derive(Debug)]
pub struct HeadlessMap {
    center: LngLat,
    zoom: f64,
    style: String,
    next_marker: u64,
    markers: BTreeMap<MarkerId, HeadlessMarker>,
    flights: Vec<Viewport>,
    removed_markers: u64,
    pending: Vec<MapEvent>,
    destroyed: bool,
}

impl HeadlessMap {
    pub fn new(options: MapOptions) -> Self {
        Self {
            center: options.center,
            zoom: options.zoom,
            style: options.style,
            next_marker: 0,
            markers: BTreeMap::new(),
            flights: Vec::new(),
            removed_markers: 0,
            pending: Vec::new(),
            destroyed: false,
        }
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, LngLat)> + '_ {
        self.markers.iter().map(|(id, marker)| (*id, marker.at))
    }

    pub fn marker_at(&self, at: LngLat) -> Option<MarkerId> {
        self.markers
            .iter()
            .find(|(_, marker)| marker.at == at)
            .map(|(id, _)| *id)
    }

    pub fn listener_count(&self, marker: MarkerId) -> u32 {
        self.markers.get(&marker).map_or(0, |m| m.listeners)
    }

    pub fn removed_markers(&self) -> u64 {
        self.removed_markers
    }

    pub fn flights(&self) -> &[Viewport] {
        &self.flights
    }

    pub fn last_flight(&self) -> Option<Viewport> {
        self.flights.last().copied()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn take_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Simulates a user pan/zoom gesture.
    pub fn pan(&mut self, center: LngLat, zoom: f64) -> MapEvent {
        self.center = center;
        self.zoom = zoom;
        MapEvent::Moved
    }

    pub fn click(&self, at: LngLat) -> MapEvent {
        MapEvent::Clicked(at)
    }

    /// `None` when the marker has no click handler: the click is swallowed
    /// by the marker element and the map never sees it.
    pub fn click_marker(&self, marker: MarkerId) -> Option<MapEvent> {
        (self.listener_count(marker) > 0).then_some(MapEvent::MarkerClicked(marker))
    }
}

impl MapWidget for HeadlessMap {
    fn center(&self) -> LngLat {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
        self.flights.push(Viewport { center, zoom });
        self.pending.push(MapEvent::Moved);
    }

    fn add_marker(&mut self, at: LngLat) -> MarkerId {
        if self.destroyed {
            warn!("map: marker added to a destroyed widget");
        }
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(id, HeadlessMarker { at, listeners: 0 });
        id
    }

    fn listen_marker_clicks(&mut self, marker: MarkerId) {
        if let Some(entry) = self.markers.get_mut(&marker) {
            entry.listeners += 1;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if self.markers.remove(&marker).is_some() {
            self.removed_markers += 1;
        }
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.pending.clear();
        self.destroyed = true;
    }
}
