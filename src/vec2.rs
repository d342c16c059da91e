/*
 * Vector Module
 *
 * This module provides the 2-D vector used throughout the simulation.
 * It reuses nannou's Vec2 (addition, subtraction, length, squared length)
 * and adds the few helpers the engine needs on top of it.
 */

pub use nannou::prelude::{vec2, Vec2};

// Squared Euclidean distance between two points
#[inline]
pub fn squared_distance(a: Vec2, b: Vec2) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

// Normalize a vector, returning zero for a zero-length input
#[inline]
pub fn normalized(v: Vec2) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > 0.0 {
        v / length_squared.sqrt()
    } else {
        Vec2::ZERO
    }
}

// Unit vector pointing from `from` towards `to`
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    normalized(to - from)
}

// Clamp both axes into [-map_size, map_size]
#[inline]
pub fn clamp_to_map(position: Vec2, map_size: f32) -> Vec2 {
    vec2(
        position.x.clamp(-map_size, map_size),
        position.y.clamp(-map_size, map_size),
    )
}
