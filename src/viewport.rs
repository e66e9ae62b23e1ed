//! Viewport: zoom/pan state between scene coordinates and container pixels.
//!
//! The render transform is `screen = scene * scale + position`. Scale never
//! drops below the zoom at which the scene exactly covers the container on
//! its tighter axis, and position is clamped so the scene can never be
//! panned out of view.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{BUTTON_ZOOM_STEP, FALLBACK_MIN_ZOOM, MAX_ZOOM, WHEEL_ZOOM_STEP};
use crate::geometry::{Point, Size};

/// Direction for discrete zoom buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Smallest scale at which the scene still covers the container.
///
/// Falls back to [`FALLBACK_MIN_ZOOM`] when either size is empty or non-finite.
#[must_use]
pub fn min_zoom_for_container(container: Size, scene: Size) -> f64 {
    if !container.is_positive() || !scene.is_positive() {
        return FALLBACK_MIN_ZOOM;
    }
    (container.width / scene.width).max(container.height / scene.height)
}

/// Pan/zoom state for one editor container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    position: Point,
    container: Size,
    scene: Size,
}

impl Viewport {
    /// A viewport at scale 1.0 (or the minimum zoom, if higher), clamped.
    #[must_use]
    pub fn new(container: Size, scene: Size) -> Self {
        let mut vp = Self { scale: 1.0, position: Point::default(), container, scene };
        vp.scale = vp.clamp_scale(1.0);
        vp.clamp_position();
        vp
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    #[must_use]
    pub fn scene_size(&self) -> Size {
        self.scene
    }

    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        min_zoom_for_container(self.container, self.scene)
    }

    /// Upper bound; never below the minimum so a tiny scene can still cover.
    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        MAX_ZOOM.max(self.min_zoom())
    }

    /// Resize the container (window resize), re-clamping scale and position.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        self.scale = self.clamp_scale(self.scale);
        self.clamp_position();
    }

    /// Resize the scene (canvas settings), re-clamping scale and position.
    pub fn set_scene_size(&mut self, scene: Size) {
        self.scene = scene;
        self.scale = self.clamp_scale(self.scale);
        self.clamp_position();
    }

    /// Set scale and position directly; both are clamped.
    pub fn set_view(&mut self, scale: f64, position: Point) {
        self.scale = self.clamp_scale(scale);
        if position.is_finite() {
            self.position = position;
        }
        self.clamp_position();
    }

    /// Multiply scale by `factor`, keeping the scene point under `focal` fixed.
    ///
    /// Without a focal point the position is left as-is before clamping.
    pub fn zoom(&mut self, factor: f64, focal: Option<Point>) {
        let old = self.scale;
        let new = self.clamp_scale(old * factor);
        if let Some(f) = focal {
            let ratio = new / old;
            self.position = Point::new(f.x - (f.x - self.position.x) * ratio, f.y - (f.y - self.position.y) * ratio);
        }
        self.scale = new;
        self.clamp_position();
    }

    /// One toolbar zoom step.
    pub fn zoom_button(&mut self, direction: ZoomDirection, focal: Option<Point>) {
        let factor = match direction {
            ZoomDirection::In => BUTTON_ZOOM_STEP,
            ZoomDirection::Out => 1.0 / BUTTON_ZOOM_STEP,
        };
        self.zoom(factor, focal);
    }

    /// One wheel tick around the cursor. Negative `delta_y` (scroll up) zooms in.
    pub fn zoom_wheel(&mut self, delta_y: f64, focal: Point) {
        if delta_y < 0.0 {
            self.zoom(WHEEL_ZOOM_STEP, Some(focal));
        } else if delta_y > 0.0 {
            self.zoom(1.0 / WHEEL_ZOOM_STEP, Some(focal));
        }
    }

    /// Shift the scene by a screen-space delta, then clamp.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.position = self.position.offset(dx, dy);
        }
        self.clamp_position();
    }

    /// Minimum zoom, centred.
    pub fn fit(&mut self) {
        self.scale = self.min_zoom();
        let scaled = self.scene.scaled(self.scale);
        self.position = Point::new(
            (self.container.width - scaled.width) / 2.0,
            (self.container.height - scaled.height) / 2.0,
        );
        self.clamp_position();
    }

    /// Keep the scene in view: centre an axis where the scene is smaller
    /// than the container, otherwise stop either scene edge from moving
    /// past the matching container edge.
    pub fn clamp_position(&mut self) {
        let scaled = self.scene.scaled(self.scale);
        self.position = Point::new(
            clamp_axis(self.position.x, self.container.width, scaled.width),
            clamp_axis(self.position.y, self.container.height, scaled.height),
        );
    }

    /// Convert a container-space point (CSS pixels) to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point::new((screen.x - self.position.x) / self.scale, (screen.y - self.position.y) / self.scale)
    }

    /// Convert a scene point to container coordinates (CSS pixels).
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point::new(scene.x * self.scale + self.position.x, scene.y * self.scale + self.position.y)
    }

    /// Convert a screen-space distance (pixels) to a scene distance.
    #[must_use]
    pub fn screen_dist_to_scene(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        if !(scale.is_finite() && scale > 0.0) {
            return self.scale;
        }
        scale.clamp(self.min_zoom(), self.max_zoom())
    }
}

fn clamp_axis(position: f64, container: f64, scaled_scene: f64) -> f64 {
    if !(container.is_finite() && scaled_scene.is_finite()) {
        return position;
    }
    if scaled_scene < container {
        (container - scaled_scene) / 2.0
    } else {
        position.clamp(container - scaled_scene, 0.0)
    }
}
