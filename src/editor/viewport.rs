pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 5.0;
/// Scale change per wheel unit, applied exponentially.
pub const WHEEL_SENSITIVITY: f32 = 0.005;
/// Step of the +/- zoom buttons.
pub const BUTTON_ZOOM_STEP: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Zoom and pan applied to the displayed image. It does not depend on the
/// image content and is only reset explicitly or when a new original loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: Point,
    /// Pointer position minus offset at drag start; `Some` while dragging.
    drag_anchor: Option<Point>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::ORIGIN,
            drag_anchor: None,
        }
    }
}

fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn can_pan(&self) -> bool {
        self.scale > 1.0
    }

    /// Positive deltas (wheel down) zoom out.
    pub fn wheel(&mut self, delta_y: f32) {
        let factor = (-delta_y * WHEEL_SENSITIVITY).exp();
        self.scale = clamp_scale(self.scale * factor);
    }

    pub fn zoom_in(&mut self) {
        self.scale = clamp_scale(self.scale + BUTTON_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.scale = clamp_scale(self.scale - BUTTON_ZOOM_STEP);
    }

    /// Starts a drag if the image is zoomed in. Returns whether it started.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.can_pan() {
            return false;
        }
        self.drag_anchor = Some(Point::new(
            pointer.x - self.offset.x,
            pointer.y - self.offset.y,
        ));
        true
    }

    pub fn drag_to(&mut self, pointer: Point) {
        if let Some(anchor) = self.drag_anchor {
            self.offset = Point::new(pointer.x - anchor.x, pointer.y - anchor.y);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..200 {
            viewport.wheel(-120.0);
        }
        assert_eq!(viewport.scale(), MAX_SCALE);
        for _ in 0..200 {
            viewport.wheel(120.0);
        }
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn wheel_zoom_is_multiplicative() {
        let mut viewport = Viewport::default();
        viewport.wheel(-100.0);
        let once = viewport.scale();
        viewport.wheel(-100.0);
        assert!((viewport.scale() - once * once).abs() < 1e-4);
        viewport.wheel(100.0);
        viewport.wheel(100.0);
        assert!((viewport.scale() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn buttons_step_and_clamp() {
        let mut viewport = Viewport::default();
        for _ in 0..30 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.scale(), MAX_SCALE);
        for _ in 0..30 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn drag_requires_zoom() {
        let mut viewport = Viewport::default();
        assert!(!viewport.begin_drag(Point::new(10.0, 10.0)));
        viewport.drag_to(Point::new(50.0, 50.0));
        assert_eq!(viewport.offset(), Point::ORIGIN);
    }

    #[test]
    fn drag_tracks_pointer_relative_to_start() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        assert!(viewport.begin_drag(Point::new(100.0, 100.0)));
        viewport.drag_to(Point::new(130.0, 90.0));
        assert_eq!(viewport.offset(), Point::new(30.0, -10.0));
        viewport.end_drag();
        assert!(!viewport.is_dragging());

        // A second drag continues from the current offset.
        assert!(viewport.begin_drag(Point::new(0.0, 0.0)));
        viewport.drag_to(Point::new(5.0, 5.0));
        assert_eq!(viewport.offset(), Point::new(35.0, -5.0));
        viewport.end_drag();
        viewport.drag_to(Point::new(500.0, 500.0));
        assert_eq!(viewport.offset(), Point::new(35.0, -5.0));
    }

    #[test]
    fn reset_restores_identity() {
        let mut viewport = Viewport::default();
        viewport.wheel(-300.0);
        viewport.begin_drag(Point::new(1.0, 1.0));
        viewport.drag_to(Point::new(40.0, 2.0));
        viewport.reset();
        assert_eq!(viewport, Viewport::default());
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.offset(), Point::ORIGIN);
    }

    #[test]
    fn nan_scale_recovers() {
        let mut viewport = Viewport::default();
        viewport.wheel(f32::NAN);
        assert_eq!(viewport.scale(), 1.0);
    }
}
