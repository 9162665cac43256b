//! Web Mercator canvas that stands in for a slippy-map widget.

use std::collections::BTreeMap;

use client_core::{MapEvent, MapOptions, MapWidget, MarkerId};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use shared::domain::{LngLat, Viewport};

const TILE_SIZE: f64 = 512.0;
const MAX_LATITUDE: f64 = 85.051_128_78;
const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 22.0;
const FLIGHT_SECONDS: f64 = 0.8;
const MARKER_RADIUS: f32 = 7.0;
const MARKER_HIT_RADIUS: f32 = 11.0;
const SCROLL_ZOOM_RATE: f64 = 0.002;
const GRID_STEPS: [f64; 11] = [30.0, 10.0, 5.0, 1.0, 0.5, 0.1, 0.05, 0.01, 0.005, 0.001, 0.0005];
const MIN_GRID_SPACING_PX: f64 = 80.0;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Absolute world pixel coordinates at `zoom`.
pub fn project(at: LngLat, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (at.lng + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * std::f64::consts::PI)) * size;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> LngLat {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / size;
    LngLat::new(lng, n.sinh().atan().to_degrees())
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    background: Color32,
    grid: Color32,
    label: Color32,
    marker: Color32,
    marker_outline: Color32,
    highlight: Color32,
    draft: Color32,
}

impl Palette {
    fn for_style(style: &str) -> Self {
        if style.eq_ignore_ascii_case("dark") {
            Self {
                background: Color32::from_rgb(24, 28, 36),
                grid: Color32::from_rgb(52, 58, 70),
                label: Color32::from_rgb(120, 128, 140),
                marker: Color32::from_rgb(242, 153, 74),
                marker_outline: Color32::from_rgb(20, 20, 20),
                highlight: Color32::from_rgb(255, 214, 102),
                draft: Color32::from_rgb(94, 196, 255),
            }
        } else {
            Self {
                background: Color32::from_rgb(236, 232, 222),
                grid: Color32::from_rgb(208, 202, 188),
                label: Color32::from_rgb(150, 144, 130),
                marker: Color32::from_rgb(214, 69, 65),
                marker_outline: Color32::WHITE,
                highlight: Color32::from_rgb(250, 176, 5),
                draft: Color32::from_rgb(33, 118, 210),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CanvasMarker {
    at: LngLat,
    listening: bool,
}

/// In-progress `fly_to`. The clock starts on the first frame after the call.
#[derive(Debug, Clone, Copy)]
pub struct Flight {
    from: Viewport,
    to: Viewport,
    started_at: Option<f64>,
}

impl Flight {
    pub fn new(from: Viewport, to: Viewport) -> Self {
        Self {
            from,
            to,
            started_at: None,
        }
    }

    /// Camera at time `now` and whether the flight has landed.
    pub fn sample(&mut self, now: f64) -> (Viewport, bool) {
        let started_at = *self.started_at.get_or_insert(now);
        let t = ((now - started_at) / FLIGHT_SECONDS).clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        let lerp = |a: f64, b: f64| a + (b - a) * eased;
        let viewport = Viewport {
            center: LngLat::new(
                lerp(self.from.center.lng, self.to.center.lng),
                lerp(self.from.center.lat, self.to.center.lat),
            ),
            zoom: lerp(self.from.zoom, self.to.zoom),
        };
        (viewport, t >= 1.0)
    }
}

pub struct MapCanvas {
    center: LngLat,
    zoom: f64,
    palette: Palette,
    next_marker: u64,
    markers: BTreeMap<MarkerId, CanvasMarker>,
    flight: Option<Flight>,
    highlight: Option<MarkerId>,
    draft_pin: Option<LngLat>,
    placing: bool,
    destroyed: bool,
}

impl MapCanvas {
    pub fn new(options: MapOptions) -> Self {
        Self {
            center: options.center,
            zoom: options.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            palette: Palette::for_style(&options.style),
            next_marker: 0,
            markers: BTreeMap::new(),
            flight: None,
            highlight: None,
            draft_pin: None,
            placing: false,
            destroyed: false,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn set_highlight(&mut self, marker: Option<MarkerId>) {
        self.highlight = marker;
    }

    pub fn set_draft_pin(&mut self, at: Option<LngLat>) {
        self.draft_pin = at;
    }

    pub fn set_placing(&mut self, placing: bool) {
        self.placing = placing;
    }

    fn to_screen(&self, rect: Rect, at: LngLat) -> Pos2 {
        let (cx, cy) = project(self.center, self.zoom);
        let (x, y) = project(at, self.zoom);
        rect.center() + Vec2::new((x - cx) as f32, (y - cy) as f32)
    }

    fn to_lng_lat(&self, rect: Rect, pos: Pos2) -> LngLat {
        let (cx, cy) = project(self.center, self.zoom);
        let offset = pos - rect.center();
        unproject(cx + offset.x as f64, cy + offset.y as f64, self.zoom)
    }

    /// Topmost marker under `pos`; later markers paint on top.
    fn marker_hit(&self, rect: Rect, pos: Pos2) -> Option<(MarkerId, bool)> {
        self.markers
            .iter()
            .rev()
            .find(|(_, marker)| self.to_screen(rect, marker.at).distance(pos) <= MARKER_HIT_RADIUS)
            .map(|(id, marker)| (*id, marker.listening))
    }

    fn pan_by(&mut self, delta: Vec2) {
        let (cx, cy) = project(self.center, self.zoom);
        self.center = unproject(cx - delta.x as f64, cy - delta.y as f64, self.zoom);
    }

    fn zoom_around(&mut self, rect: Rect, cursor: Pos2, zoom: f64) {
        let anchor = self.to_lng_lat(rect, cursor);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let (ax, ay) = project(anchor, self.zoom);
        let offset = cursor - rect.center();
        self.center = unproject(ax - offset.x as f64, ay - offset.y as f64, self.zoom);
    }

    /// Handles input for this frame, paints, and returns what happened.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Vec<MapEvent> {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        if self.destroyed {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut moved = false;

        if let Some(flight) = self.flight.as_mut() {
            let (viewport, landed) = flight.sample(ui.input(|i| i.time));
            self.center = viewport.center;
            self.zoom = viewport.zoom;
            if landed {
                self.flight = None;
            }
            moved = true;
            ui.ctx().request_repaint();
        }

        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.flight = None;
                self.pan_by(delta);
                moved = true;
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(cursor) = response.hover_pos() {
                    self.flight = None;
                    self.zoom_around(rect, cursor, self.zoom + scroll as f64 * SCROLL_ZOOM_RATE);
                    moved = true;
                }
            }
        }

        if moved {
            events.push(MapEvent::Moved);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                match self.marker_hit(rect, pos) {
                    Some((marker, true)) => events.push(MapEvent::MarkerClicked(marker)),
                    // The marker element swallows the click.
                    Some((_, false)) => {}
                    None => events.push(MapEvent::Clicked(self.to_lng_lat(rect, pos))),
                }
            }
        }

        self.paint(&ui.painter_at(rect), rect);

        if self.placing {
            response.on_hover_cursor(egui::CursorIcon::Crosshair);
        }
        events
    }

    fn grid_step(&self) -> f64 {
        let degree_px = world_size(self.zoom) / 360.0;
        GRID_STEPS
            .iter()
            .rev()
            .copied()
            .find(|step| step * degree_px >= MIN_GRID_SPACING_PX)
            .unwrap_or(GRID_STEPS[0])
    }

    fn paint(&self, painter: &egui::Painter, rect: Rect) {
        let palette = self.palette;
        painter.rect_filled(rect, 0.0, palette.background);

        let step = self.grid_step();
        let top_left = self.to_lng_lat(rect, rect.left_top());
        let bottom_right = self.to_lng_lat(rect, rect.right_bottom());
        let grid = Stroke::new(1.0, palette.grid);
        let font = FontId::monospace(10.0);

        let mut lng = (top_left.lng / step).floor() * step;
        while lng <= bottom_right.lng {
            let x = self.to_screen(rect, LngLat::new(lng, self.center.lat)).x;
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
            painter.text(
                Pos2::new(x + 3.0, rect.bottom() - 3.0),
                Align2::LEFT_BOTTOM,
                format!("{lng:.4}"),
                font.clone(),
                palette.label,
            );
            lng += step;
        }

        let mut lat = (bottom_right.lat / step).floor() * step;
        while lat <= top_left.lat {
            let y = self.to_screen(rect, LngLat::new(self.center.lng, lat)).y;
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
            painter.text(
                Pos2::new(rect.left() + 3.0, y - 2.0),
                Align2::LEFT_BOTTOM,
                format!("{lat:.4}"),
                font.clone(),
                palette.label,
            );
            lat += step;
        }

        for (id, marker) in &self.markers {
            let pos = self.to_screen(rect, marker.at);
            if !rect.expand(MARKER_HIT_RADIUS).contains(pos) {
                continue;
            }
            let fill = if self.highlight == Some(*id) {
                palette.highlight
            } else {
                palette.marker
            };
            painter.circle_filled(pos, MARKER_RADIUS, fill);
            painter.circle_stroke(pos, MARKER_RADIUS, Stroke::new(2.0, palette.marker_outline));
        }

        if let Some(at) = self.draft_pin {
            let pos = self.to_screen(rect, at);
            painter.circle_stroke(pos, MARKER_RADIUS + 3.0, Stroke::new(2.5, palette.draft));
            painter.circle_filled(pos, 3.0, palette.draft);
        }
    }
}

impl MapWidget for MapCanvas {
    fn center(&self) -> LngLat {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        let from = Viewport {
            center: self.center,
            zoom: self.zoom,
        };
        let to = Viewport {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        self.flight = Some(Flight::new(from, to));
    }

    fn add_marker(&mut self, at: LngLat) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(
            id,
            CanvasMarker {
                at,
                listening: false,
            },
        );
        id
    }

    fn listen_marker_clicks(&mut self, marker: MarkerId) {
        if let Some(entry) = self.markers.get_mut(&marker) {
            entry.listening = true;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.markers.remove(&marker);
        if self.highlight == Some(marker) {
            self.highlight = None;
        }
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.flight = None;
        self.destroyed = true;
    }
}
