/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that holds the viewer's
 * performance metrics and the simulation figures shown in the UI:
 * - FPS and frame time of the viewer
 * - Step reached by the last snapshot
 * - Population per state
 * - Number of agents drawn last frame
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::agent::Census;

pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub step: u64,
    pub iterations: u64,
    pub census: Census,
    // Written from the view function, which only gets &Model
    pub drawn_agents: AtomicUsize,
}

impl DebugInfo {
    pub fn new(iterations: u64) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn drawn_agents(&self) -> usize {
        self.drawn_agents.load(Ordering::Relaxed)
    }

    pub fn set_drawn_agents(&self, count: usize) {
        self.drawn_agents.store(count, Ordering::Relaxed);
    }

    // Fraction of the iteration budget already simulated
    pub fn progress(&self) -> f32 {
        if self.iterations == 0 {
            1.0
        } else {
            (self.step as f64 / self.iterations as f64).min(1.0) as f32
        }
    }
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: Duration::ZERO,
            step: 0,
            iterations: 0,
            census: Census::default(),
            drawn_agents: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let mut info = DebugInfo::new(200);
        info.step = 50;
        assert_eq!(info.progress(), 0.25);
        info.step = 400;
        assert_eq!(info.progress(), 1.0);
        assert_eq!(DebugInfo::new(0).progress(), 1.0);
    }
}
