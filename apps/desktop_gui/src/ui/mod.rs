//! UI layer for desktop GUI: app shell, map canvas, and side panels.

pub mod app;
pub mod map_canvas;
pub mod panels;

pub use app::VenueMapApp;
