/*
 * Application Module
 *
 * This module defines the viewer: a nannou window that polls the running
 * simulation for snapshots and draws them. The simulation runs on its own
 * thread; the viewer only ever reads it through the rendering lock.
 *
 * Snapshots are taken at most every SNAPSHOT_INTERVAL and never block the
 * window: while a batch of steps holds the lock the previous snapshot
 * stays on screen.
 */

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::debug::DebugInfo;
use crate::input::{mouse_moved, mouse_pressed, mouse_released, mouse_wheel, raw_window_event};
use crate::renderer::view;
use crate::simulation::{Simulation, Snapshot};
use crate::ui;

// nannou builds the model from a plain fn, so the launch arguments are parked here
static VIEWER: OnceLock<(Arc<Simulation>, bool)> = OnceLock::new();

pub const SNAPSHOT_INTERVAL: Duration = Duration::from_millis(100);

// Main model for the viewer
pub struct Model {
    pub simulation: Arc<Simulation>,
    pub snapshot: Snapshot,
    pub last_snapshot: Option<Instant>,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    pub show_debug: bool,
}

// Open the viewer on the calling thread. Does not return once the window loop starts.
pub fn launch(simulation: Arc<Simulation>, show_debug: bool) {
    if VIEWER.set((simulation, show_debug)).is_err() {
        warn!("viewer already launched");
        return;
    }

    nannou::app(model).update(update).exit(exit).run();
}

fn model(app: &App) -> Model {
    let (simulation, show_debug) = VIEWER.get().expect("viewer started without a simulation");
    let simulation = Arc::clone(simulation);

    let window_id = app
        .new_window()
        .title("PALS")
        .size(1024, 1024)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_wheel(mouse_wheel)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);
    let camera = Camera::fitting(simulation.params().map_size, window.rect());
    let debug_info = DebugInfo::new(simulation.iterations());

    debug!("viewer window created");

    Model {
        show_debug: *show_debug,
        simulation,
        snapshot: Snapshot::default(),
        last_snapshot: None,
        egui,
        debug_info,
        camera,
        mouse_position: Vec2::ZERO,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    refresh_snapshot(model);

    let reset_camera = ui::update_ui(&mut model.egui, &mut model.show_debug, &model.debug_info, &model.camera);
    if reset_camera {
        model.camera.fit(model.simulation.params().map_size, app.window_rect());
    }
}

fn refresh_snapshot(model: &mut Model) {
    let due = model
        .last_snapshot
        .map_or(true, |taken| taken.elapsed() >= SNAPSHOT_INTERVAL);
    if !due {
        return;
    }

    if let Some(snapshot) = model.simulation.try_snapshot() {
        model.debug_info.step = snapshot.step;
        model.debug_info.census = snapshot.census();
        model.snapshot = snapshot;
        model.last_snapshot = Some(Instant::now());
    }
}

// Closing the window must not cut the run short
fn exit(_app: &App, model: Model) {
    if !model.simulation.is_done() {
        info!("viewer closed, waiting for the simulation to finish");
    }
    while !model.simulation.is_done() {
        thread::sleep(SNAPSHOT_INTERVAL);
    }
    info!(steps = model.simulation.steps_taken(), "viewer exiting");
}
