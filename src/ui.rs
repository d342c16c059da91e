/*
 * UI Module
 *
 * This module contains functions for creating and updating the viewer's
 * user interface using nannou_egui. The simulation itself is not
 * adjustable while it runs, so the panel only reports on it.
 */

use nannou_egui::{egui, Egui};

use crate::camera::Camera;
use crate::debug::DebugInfo;

// Update the UI and return whether the camera should be reset
pub fn update_ui(egui: &mut Egui, show_debug: &mut bool, debug_info: &DebugInfo, camera: &Camera) -> bool {
    let mut reset_camera = false;

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.add(egui::ProgressBar::new(debug_info.progress()).text(format!(
                "Step {} / {}",
                debug_info.step, debug_info.iterations
            )));

            ui.collapsing("Population", |ui| {
                let census = &debug_info.census;
                ui.label(format!("Alive: {}", census.alive()));
                ui.label(format!("Incubating: {}", census.incubating));
                ui.label(format!("Hunting: {}", census.hunting));
                ui.label(format!("Splitting: {}", census.splitting));
                ui.label(format!("Dead slots: {}", census.dead));
            });

            ui.collapsing("Camera Controls", |ui| {
                ui.label("Zoom: Use mouse wheel or trackpad pinch gesture");
                ui.label("Pan: Click and drag");
                if ui.button("Reset Camera").clicked() {
                    reset_camera = true;
                }
                ui.label(format!("Zoom Level: {:.2}x", camera.zoom));
                ui.label(format!(
                    "Camera Position: ({:.0}, {:.0})",
                    camera.position.x, camera.position.y
                ));
            });

            ui.collapsing("Performance", |ui| {
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Drawn agents: {}", debug_info.drawn_agents()));
            });

            ui.checkbox(show_debug, "Show Debug Info");
        });

    reset_camera
}

// Draw debug information on the screen
pub fn draw_debug_info(
    draw: &nannou::Draw,
    debug_info: &DebugInfo,
    window_rect: nannou::geom::Rect,
    camera_zoom: f32,
    map_size: f32,
) {
    // Background panel in the top-left corner
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 200.0;
    let panel_height = line_height * 6.0 + margin;
    let panel_x = window_rect.left() + panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.left() + margin;
    let text_y = window_rect.top() - margin;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Step: {}", debug_info.step),
        format!("Alive: {}", debug_info.census.alive()),
        format!("Drawn: {}", debug_info.drawn_agents()),
        format!("Zoom: {:.2}x", camera_zoom),
        format!("Map: [{:.0}, {:.0}]", -map_size, map_size),
    ];

    for (i, text) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        // nannou centres text, so shift each line right by a fixed offset
        draw.text(text)
            .x_y(text_x + 70.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
