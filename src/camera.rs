/*
 * Camera Module
 *
 * This module defines the Camera struct that handles zooming and panning
 * in the viewer. It provides coordinate transformations between
 * map space and screen space.
 */

use nannou::prelude::*;

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.01,
            max_zoom: 50.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // Camera centred on the map with the whole map in view
    pub fn fitting(map_size: f32, window_rect: Rect) -> Self {
        let mut camera = Self::new();
        camera.fit(map_size, window_rect);
        camera
    }

    pub fn fit(&mut self, map_size: f32, window_rect: Rect) {
        let shortest_side = window_rect.w().min(window_rect.h());
        self.position = Vec2::ZERO;
        self.zoom = (0.9 * shortest_side / (2.0 * map_size)).clamp(self.min_zoom, self.max_zoom);
    }

    // Convert a point from map space to screen space
    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    // Convert a point from screen space to map space
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    // Zoom around the cursor so the point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;

        let cursor_world_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        let cursor_world_after = self.screen_to_world(cursor_position, window_rect);

        self.position += cursor_world_before - cursor_world_after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    // Pan by the cursor movement since the last drag event
    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.position -= delta / self.zoom;
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
