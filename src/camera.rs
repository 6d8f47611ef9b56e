//! Points and the pan/zoom viewport of the infinite canvas.
//!
//! The viewport is camera state only: it is never persisted and never
//! recorded in undo history.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in screen pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    /// Build a viewport, clamping zoom into the supported range.
    #[must_use]
    pub fn new(pan_x: f64, pan_y: f64, zoom: f64) -> Self {
        Self { pan_x, pan_y, zoom: clamp_zoom(zoom) }
    }

    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.pan_x) / self.zoom, y: (screen.y - self.pan_y) / self.zoom }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point { x: world.x * self.zoom + self.pan_x, y: world.y * self.zoom + self.pan_y }
    }

    /// Zoom by `factor` keeping the screen-space `anchor` fixed over the same world point.
    #[must_use]
    pub fn zoomed_at(&self, factor: f64, anchor: Point) -> Self {
        let zoom = clamp_zoom(self.zoom * factor);
        let world = self.screen_to_world(anchor);
        Self { pan_x: anchor.x - world.x * zoom, pan_y: anchor.y - world.y * zoom, zoom }
    }

    /// Shift the camera by a screen-space delta.
    #[must_use]
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        Self { pan_x: self.pan_x + dx, pan_y: self.pan_y + dy, zoom: self.zoom }
    }
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input resets to 1.0.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 }
}
