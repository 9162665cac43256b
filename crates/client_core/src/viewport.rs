//! Mirrors the widget's camera and issues programmatic moves.

use shared::domain::{LngLat, Viewport};

use crate::{config::MapSettings, map::MapWidget};

#[derive(Debug, Clone)]
pub struct ViewportController {
    current: Viewport,
    default: Viewport,
    focus_zoom: f64,
}

impl ViewportController {
    pub fn new(default: Viewport, focus_zoom: f64) -> Self {
        Self {
            current: default,
            default,
            focus_zoom,
        }
    }

    pub fn from_settings(map: &MapSettings) -> Self {
        Self::new(
            Viewport {
                center: map.default_center,
                zoom: map.default_zoom,
            },
            map.focus_zoom,
        )
    }

    pub fn viewport(&self) -> Viewport {
        self.current
    }

    pub fn default_viewport(&self) -> Viewport {
        self.default
    }

    /// Copies the widget's camera. Never commands the widget.
    pub fn sync_from(&mut self, widget: &dyn MapWidget) {
        self.current = Viewport {
            center: widget.center(),
            zoom: widget.zoom(),
        };
    }

    pub fn reset_to_default(&self, widget: &mut dyn MapWidget) {
        widget.fly_to(self.default.center, self.default.zoom);
    }

    pub fn focus_on(&self, widget: &mut dyn MapWidget, at: LngLat) {
        self.focus_on_zoomed(widget, at, self.focus_zoom);
    }

    pub fn focus_on_zoomed(&self, widget: &mut dyn MapWidget, at: LngLat, zoom: f64) {
        widget.fly_to(at, zoom);
    }
}
