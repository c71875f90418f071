//! Steering and position integration
//!
//! Agents walk at a fixed speed and turn at a bounded rate, so a change of
//! mind shows up as a visible arc rather than a snap.

use glam::Vec2;

use super::state::Agent;
use crate::config::Config;
use crate::{bearing, heading_vec, normalize_angle};

/// Turn `heading` toward `desired` by at most `max_delta` along the shorter way
pub fn turn_toward(heading: f32, desired: f32, max_delta: f32) -> f32 {
    let delta = normalize_angle(desired - heading);
    let clamped = delta.clamp(-max_delta, max_delta);
    normalize_angle(heading + clamped)
}

/// Advance `agent` one step toward `target` (stand still without one)
pub fn integrate(agent: &mut Agent, target: Option<Vec2>, dt: f32, config: &Config) {
    let Some(target) = target else {
        agent.vel = Vec2::ZERO;
        return;
    };

    if target != agent.pos {
        let desired = bearing(agent.pos, target);
        agent.heading = turn_toward(agent.heading, desired, config.turn_speed * dt);
    }
    agent.vel = heading_vec(agent.heading) * config.agent_speed;
    agent.pos += agent.vel * dt;
    agent.pos = clamp_to_arena(agent.pos, config);
}

/// Keep a point inside the arena, `arena_margin` from each edge
pub fn clamp_to_arena(pos: Vec2, config: &Config) -> Vec2 {
    let m = config
        .arena_margin
        .min(config.arena_width * 0.5)
        .min(config.arena_height * 0.5);
    Vec2::new(
        pos.x.clamp(m, config.arena_width - m),
        pos.y.clamp(m, config.arena_height - m),
    )
}
