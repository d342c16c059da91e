/*
 * Renderer Module
 *
 * This module draws the latest snapshot of the simulation: the map
 * boundary, one circle per live agent coloured by state and sized by mass,
 * and the optional debug overlay. Agents whose circle falls outside the
 * window are skipped.
 */

use nannou::prelude::*;

use crate::agent::AgentState;
use crate::app::Model;
use crate::camera::Camera;
use crate::ui;

// Smallest on-screen radius so tiny agents stay visible when zoomed out
const MIN_RADIUS: f32 = 0.5;

pub fn state_color(state: AgentState) -> Rgb<u8> {
    match state {
        AgentState::Incubating => rgb(80, 200, 120),
        AgentState::Hunting => rgb(230, 80, 60),
        AgentState::Splitting => rgb(240, 200, 60),
        AgentState::Dead => rgb(60, 60, 60),
    }
}

// Circle area proportional to mass
pub fn screen_radius(mass: f32, camera: &Camera) -> f32 {
    (mass.max(0.0).sqrt() * camera.zoom).max(MIN_RADIUS)
}

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let camera = &model.camera;
    let map_size = model.simulation.params().map_size;

    // Map boundary
    let map_min = camera.world_to_screen(vec2(-map_size, -map_size), window_rect);
    let map_max = camera.world_to_screen(vec2(map_size, map_size), window_rect);
    let map_rect = Rect::from_corners(map_min, map_max);

    draw.rect()
        .xy(map_rect.xy())
        .wh(map_rect.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    let snapshot = &model.snapshot;
    let mut drawn = 0;

    for ((&position, &mass), &state) in snapshot
        .positions
        .iter()
        .zip(&snapshot.masses)
        .zip(&snapshot.states)
    {
        if !state.is_alive() {
            continue;
        }

        let screen_pos = camera.world_to_screen(position, window_rect);
        let radius = screen_radius(mass, camera);
        if !window_rect.pad(-radius).contains(screen_pos) {
            continue;
        }

        draw.ellipse()
            .xy(screen_pos)
            .radius(radius)
            .color(state_color(state));
        drawn += 1;
    }

    model.debug_info.set_drawn_agents(drawn);

    if model.show_debug {
        ui::draw_debug_info(&draw, &model.debug_info, window_rect, camera.zoom, map_size);
    }

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavier_agents_draw_larger() {
        let camera = Camera::new();
        assert!(screen_radius(4.0, &camera) > screen_radius(1.0, &camera));
        assert_eq!(screen_radius(4.0, &camera), 2.0);
        assert_eq!(screen_radius(0.0, &camera), MIN_RADIUS);
    }

    #[test]
    fn states_have_distinct_colors() {
        let states = [AgentState::Incubating, AgentState::Hunting, AgentState::Splitting];
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(state_color(*a), state_color(*b));
            }
        }
    }
}
