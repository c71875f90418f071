//! Giardino delle Voci - two voices wandering a garden, guessing each other
//!
//! Core modules:
//! - `sim`: Deterministic simulation (observation, belief, decisions, motion)
//! - `garden`: Simulation context with init/reset lifecycle and frame pacing
//! - `config`: Tunable parameters with clamped ranges, seed coercion
//! - `error`: Errors surfaced by a failed tick or a bad config document

pub mod config;
pub mod error;
pub mod garden;
pub mod sim;

pub use config::{Config, parse_seed};
pub use error::{GardenError, Result};
pub use garden::Garden;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Default fixed simulation timestep (60 Hz, matches display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Smallest accepted sub-step
    pub const MIN_SUBSTEP: f32 = 1.0 / 480.0;
    /// Largest accepted sub-step
    pub const MAX_SUBSTEP: f32 = 1.0 / 15.0;
    /// Frame elapsed time is clamped to this to avoid catch-up spirals after a stall
    pub const MAX_FRAME_ELAPSED: f32 = 0.25;

    /// Observations of the other voice kept in memory
    pub const MEMORY_WINDOW: usize = 8;
    /// Trail points kept per agent for rendering
    pub const TRAIL_LENGTH: usize = 24;
    /// Pending events kept for the presentation layer (oldest dropped)
    pub const MAX_PENDING_EVENTS: usize = 256;

    /// Belief score weights
    pub const BELIEF_CLOSING_WEIGHT: f32 = 1.2;
    pub const BELIEF_ALIGN_WEIGHT: f32 = 1.0;
    pub const BELIEF_PROXIMITY_WEIGHT: f32 = 0.6;
    /// Distance change (pixels) that maps to a full closing score
    pub const BELIEF_CLOSING_SCALE: f32 = 6.0;
    /// Distance (pixels) at which the proximity term halves
    pub const BELIEF_PROXIMITY_SCALE: f32 = 120.0;

    /// Minimum spacing between generated resources
    pub const RESOURCE_MIN_SPACING: f32 = 60.0;
    /// Placement attempts before accepting a crowded spot
    pub const RESOURCE_PLACEMENT_ATTEMPTS: u32 = 32;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Bearing (radians) from `from` to `to`
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
