//! Keeps rendered markers congruent with the venue list.

use std::collections::BTreeMap;

use shared::domain::{Venue, VenueId};
use tracing::debug;

use crate::map::{MapWidget, MarkerId};

#[derive(Debug, Default)]
pub struct MarkerSync {
    rendered: BTreeMap<MarkerId, VenueId>,
}

impl MarkerSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every rendered marker, then adds one listening marker per
    /// placeable venue. Returns the number of markers rendered.
    pub fn rebuild(&mut self, venues: &[Venue], widget: &mut dyn MapWidget) -> usize {
        self.clear(widget);

        for venue in venues.iter().filter(|venue| venue.is_placeable()) {
            let Some(at) = venue.location() else {
                continue;
            };
            let marker = widget.add_marker(at);
            widget.listen_marker_clicks(marker);
            self.rendered.insert(marker, venue.id.clone());
        }

        debug!(
            rendered = self.rendered.len(),
            skipped = venues.len() - self.rendered.len(),
            "markers: rebuilt"
        );
        self.rendered.len()
    }

    pub fn clear(&mut self, widget: &mut dyn MapWidget) {
        for marker in std::mem::take(&mut self.rendered).into_keys() {
            widget.remove_marker(marker);
        }
    }

    pub fn venue_for(&self, marker: MarkerId) -> Option<&VenueId> {
        self.rendered.get(&marker)
    }

    pub fn marker_for(&self, venue: &VenueId) -> Option<MarkerId> {
        self.rendered
            .iter()
            .find(|(_, id)| *id == venue)
            .map(|(marker, _)| *marker)
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapSettings,
        map::{HeadlessMap, MapOptions},
    };

    fn venue(id: &str, lat: Option<f64>, lng: Option<f64>) -> Venue {
        Venue {
            id: VenueId::new(id),
            name: id.to_uppercase(),
            address: String::new(),
            hours: String::new(),
            lat,
            lng,
        }
    }

    fn map() -> HeadlessMap {
        HeadlessMap::new(MapOptions::from_settings(&MapSettings::default()))
    }

    #[test]
    fn renders_only_placeable_venues() {
        let mut map = map();
        let mut sync = MarkerSync::new();
        let venues = vec![
            venue("a", Some(47.5), Some(21.6)),
            venue("b", None, Some(21.6)),
            venue("zero", Some(0.0), Some(0.0)),
            venue("c", Some(47.6), Some(21.7)),
        ];

        assert_eq!(sync.rebuild(&venues, &mut map), 2);
        assert_eq!(map.marker_count(), 2);
        assert!(sync.marker_for(&VenueId::new("zero")).is_none());
    }

    #[test]
    fn repeated_rebuilds_leave_one_listener_per_marker() {
        let mut map = map();
        let mut sync = MarkerSync::new();
        let venues = vec![
            venue("a", Some(47.5), Some(21.6)),
            venue("b", Some(47.6), Some(21.7)),
        ];

        for _ in 0..5 {
            sync.rebuild(&venues, &mut map);
        }

        assert_eq!(map.marker_count(), 2);
        assert_eq!(map.removed_markers(), 8);
        for (marker, _) in map.markers() {
            assert_eq!(map.listener_count(marker), 1);
            assert!(sync.venue_for(marker).is_some());
        }
    }

    #[test]
    fn removing_a_venue_removes_exactly_its_marker() {
        let mut map = map();
        let mut sync = MarkerSync::new();
        let a = venue("a", Some(47.5), Some(21.6));
        let b = venue("b", Some(47.6), Some(21.7));

        sync.rebuild(&[a.clone(), b], &mut map);
        sync.rebuild(&[a.clone()], &mut map);

        let remaining: Vec<_> = map.markers().map(|(_, at)| at).collect();
        assert_eq!(remaining, vec![a.location().expect("location")]);

        sync.rebuild(&[], &mut map);
        assert_eq!(map.marker_count(), 0);
        assert!(sync.is_empty());
    }
}
