/*
 * Camera Module
 *
 * Maps between world space (simulation coordinates, origin at the world
 * center) and screen space (window coordinates, origin at the window
 * center). Supports zooming about the cursor and panning by drag.
 */

use nannou::prelude::*;

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    last_cursor: Option<Vec2>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.2,
            max_zoom: 6.0,
            last_cursor: None,
        }
    }

    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.zoom = 1.0;
        self.last_cursor = None;
    }

    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    // World-space rectangle currently covered by the window
    pub fn visible_rect(&self, window_rect: Rect) -> Rect {
        let a = self.screen_to_world(pt2(window_rect.left(), window_rect.bottom()), window_rect);
        let b = self.screen_to_world(pt2(window_rect.right(), window_rect.top()), window_rect);
        Rect::from_corners(a, b)
    }

    // Zoom by the scroll amount, keeping the world point under the cursor fixed
    pub fn zoom_at(&mut self, scroll: f32, cursor: Vec2, window_rect: Rect) {
        let before = self.screen_to_world(cursor, window_rect);
        let factor = (1.0 + scroll * 0.1).max(0.1);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let after = self.screen_to_world(cursor, window_rect);
        self.position += before - after;
    }

    pub fn begin_pan(&mut self, cursor: Vec2) {
        self.last_cursor = Some(cursor);
    }

    // Move the view with the cursor while a pan is active
    pub fn pan_to(&mut self, cursor: Vec2) {
        if let Some(last) = self.last_cursor {
            self.position -= (cursor - last) / self.zoom;
            self.last_cursor = Some(cursor);
        }
    }

    pub fn end_pan(&mut self) {
        self.last_cursor = None;
    }

    pub fn is_panning(&self) -> bool {
        self.last_cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::from_w_h(800.0, 600.0)
    }

    #[test]
    fn screen_and_world_agree_after_zoom_and_pan() {
        let mut camera = Camera::new();
        camera.position = Vec2::new(40.0, -10.0);
        camera.zoom = 2.0;
        let p = Vec2::new(13.0, 27.0);
        let back = camera.screen_to_world(camera.world_to_screen(p, window()), window());
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn zoom_keeps_cursor_anchored() {
        let mut camera = Camera::new();
        let cursor = Vec2::new(120.0, -80.0);
        let under_cursor = camera.screen_to_world(cursor, window());
        camera.zoom_at(3.0, cursor, window());
        assert!(camera.zoom > 1.0);
        let still = camera.screen_to_world(cursor, window());
        assert!((still - under_cursor).length() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.zoom_at(5.0, Vec2::ZERO, window());
        }
        assert_eq!(camera.zoom, camera.max_zoom);
    }

    #[test]
    fn pan_moves_opposite_to_drag() {
        let mut camera = Camera::new();
        camera.pan_to(Vec2::new(50.0, 0.0));
        assert_eq!(camera.position, Vec2::ZERO);

        camera.begin_pan(Vec2::ZERO);
        camera.pan_to(Vec2::new(50.0, 20.0));
        assert_eq!(camera.position, Vec2::new(-50.0, -20.0));
        camera.end_pan();
        assert!(!camera.is_panning());
    }

    #[test]
    fn visible_rect_shrinks_when_zoomed_in() {
        let mut camera = Camera::new();
        assert!((camera.visible_rect(window()).w() - 800.0).abs() < 1e-3);
        camera.zoom = 2.0;
        assert!((camera.visible_rect(window()).w() - 400.0).abs() < 1e-3);
    }
}
