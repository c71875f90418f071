//! What one agent can see of the other
//!
//! Perception is a cone: the subject must be within `view_distance` and
//! within half the field of view of the observer's heading. Both limits are
//! inclusive.

use super::rng::SimRng;
use super::state::{Agent, Observation};
use crate::config::Config;
use crate::{bearing, normalize_angle};

/// True if `subject` lies inside `observer`'s view cone (boundaries inclusive)
pub fn in_view(observer: &Agent, subject: &Agent, fov: f32, view_distance: f32) -> bool {
    let distance = observer.pos.distance(subject.pos);
    if distance > view_distance {
        return false;
    }
    if distance == 0.0 {
        return true;
    }
    let deviation = normalize_angle(bearing(observer.pos, subject.pos) - observer.heading).abs();
    deviation <= fov * 0.5
}

/// Noisy glimpse of `subject`, or `None` when out of view
///
/// Draws three values (x, y, heading noise) from `rng` when perceived and
/// none otherwise.
pub fn observe(
    observer: &Agent,
    subject: &Agent,
    config: &Config,
    tick: u64,
    rng: &mut SimRng,
) -> Option<Observation> {
    if !in_view(observer, subject, config.fov, config.view_distance) {
        return None;
    }
    let dx = rng.signed() * config.position_noise;
    let dy = rng.signed() * config.position_noise;
    let dh = rng.signed() * config.angle_noise;

    Some(Observation {
        pos: subject.pos + glam::Vec2::new(dx, dy),
        heading: normalize_angle(subject.heading + dh),
        tick,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{AgentId, Preferences};
    use glam::Vec2;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn agent_at(id: AgentId, x: f32, y: f32, heading: f32) -> Agent {
        Agent::new(id, Vec2::new(x, y), heading, Preferences::default())
    }

    fn clear_sight(fov: f32, view_distance: f32) -> Config {
        Config {
            fov,
            view_distance,
            position_noise: 0.0,
            angle_noise: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_boundary_is_seen() {
        // subject straight to the side, exactly at half a π-wide cone and exactly at range
        let observer = agent_at(AgentId::A, 0.0, 0.0, 0.0);
        let subject = agent_at(AgentId::B, 0.0, 100.0, 1.0);
        assert!(in_view(&observer, &subject, PI, 100.0));

        let mut rng = SimRng::new(0);
        let obs = observe(&observer, &subject, &clear_sight(PI, 100.0), 5, &mut rng).unwrap();
        assert_eq!(obs.pos, subject.pos);
        assert_eq!(obs.heading, subject.heading);
        assert_eq!(obs.tick, 5);
    }

    #[test]
    fn test_just_past_boundary_is_unseen() {
        let observer = agent_at(AgentId::A, 0.0, 0.0, 0.0);
        let far = agent_at(AgentId::B, 100.01, 0.0, 0.0);
        assert!(!in_view(&observer, &far, PI, 100.0));

        // slightly behind the side line
        let wide = agent_at(AgentId::B, -1.0, 50.0, 0.0);
        assert!(!in_view(&observer, &wide, PI, 100.0));
        assert!(in_view(&observer, &wide, PI + 0.1, 100.0));
    }

    #[test]
    fn test_behind_is_unseen_and_draws_nothing() {
        let observer = agent_at(AgentId::A, 200.0, 200.0, 0.0);
        let subject = agent_at(AgentId::B, 150.0, 200.0, 0.0);
        let mut rng = SimRng::new(11);
        let mut untouched = SimRng::new(11);
        assert!(observe(&observer, &subject, &Config::default(), 0, &mut rng).is_none());
        assert_eq!(rng.unit().to_bits(), untouched.unit().to_bits());
    }

    #[test]
    fn test_heading_wraps_across_pi() {
        // observer looks west; subject to the west just below the axis
        let observer = agent_at(AgentId::A, 0.0, 0.0, PI - 0.01);
        let subject = agent_at(AgentId::B, -50.0, -1.0, 0.0);
        assert!(in_view(&observer, &subject, 0.2, 100.0));
    }

    #[test]
    fn test_noise_is_bounded_and_reproducible() {
        let observer = agent_at(AgentId::A, 0.0, 0.0, 0.0);
        let subject = agent_at(AgentId::B, 50.0, 0.0, FRAC_PI_2);
        let config = Config {
            position_noise: 5.0,
            angle_noise: 0.1,
            ..Default::default()
        };
        let mut r1 = SimRng::new(99);
        let mut r2 = SimRng::new(99);
        for t in 0..100 {
            let a = observe(&observer, &subject, &config, t, &mut r1).unwrap();
            let b = observe(&observer, &subject, &config, t, &mut r2).unwrap();
            assert_eq!(a, b);
            assert!((a.pos.x - 50.0).abs() <= 5.0);
            assert!(a.pos.y.abs() <= 5.0);
            assert!((a.heading - FRAC_PI_2).abs() <= 0.1 + 1e-6);
        }
    }
}
