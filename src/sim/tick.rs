//! Fixed timestep simulation tick
//!
//! Advances the garden deterministically. Within a tick agent A always goes
//! before agent B, and decisions are made before anyone moves.

use glam::Vec2;

use super::belief::update_belief;
use super::decide::{Action, choose_goal, decide};
use super::events::{Beat, SimEvent};
use super::motion::integrate;
use super::observe::observe;
use super::rng::SimRng;
use super::state::{Agent, AgentId, Effect, EffectKind, Mood, ResourceId, Stance, World};
use crate::config::Config;
use crate::error::{GardenError, Result};

/// Seconds an agent glows after a pickup
pub const PICKUP_GLOW: f32 = 1.5;

/// Split the agent pair into (`id`, the other)
fn pair_mut(agents: &mut [Agent; 2], id: AgentId) -> (&mut Agent, &Agent) {
    let [a, b] = agents;
    match id {
        AgentId::A => (a, &*b),
        AgentId::B => (b, &*a),
    }
}

/// Advance the garden by one fixed timestep
pub fn tick(
    world: &mut World,
    rng: &mut SimRng,
    config: &Config,
    dt: f32,
    events: &mut Vec<SimEvent>,
) {
    world.clock.tick += 1;
    world.clock.time += dt;

    // Narrative pause: only the countdown runs
    if world.clock.is_paused() {
        world.clock.pause_remaining = (world.clock.pause_remaining - dt).max(0.0);
        return;
    }

    let tick_no = world.clock.tick;
    let now = world.clock.time;

    // Observe both ways, then fold into beliefs
    let seen_by_a = observe(&world.agents[0], &world.agents[1], config, tick_no, rng);
    let seen_by_b = observe(&world.agents[1], &world.agents[0], config, tick_no, rng);
    update_belief(&mut world.agents[0], seen_by_a.as_ref(), &world.resources, config);
    update_belief(&mut world.agents[1], seen_by_b.as_ref(), &world.resources, config);

    // Simultaneous decisions: each sees the other as it was before deciding
    let before = world.agents.clone();
    let mut actions = [Action::Idle; 2];
    for id in AgentId::BOTH {
        let agent = &mut world.agents[id.index()];
        let prev_goal = agent.goal;
        let prev_stance = agent.stance;
        let action = decide(agent, &before[id.other().index()], &world.resources, config, rng);
        let (goal, stance, pos) = (agent.goal, agent.stance, agent.pos);

        let continuing = match (prev_stance, stance) {
            (
                Stance::Bluffing {
                    remaining: r0,
                    decoy: d0,
                },
                Stance::Bluffing {
                    remaining: r1,
                    decoy: d1,
                },
            ) => d0 == d1 && r1 + 1 == r0,
            _ => false,
        };

        if !continuing {
            if let Stance::Bluffing { decoy, .. } = prev_stance {
                reveal_bluff(world, id, decoy, pos, config, events);
            }
            if let Stance::Bluffing { decoy, .. } = stance {
                events.push(SimEvent::BluffStart {
                    tick: tick_no,
                    time: now,
                    agent: id,
                    goal: prev_goal,
                    decoy,
                });
            }
        }

        if !prev_stance.is_bluffing() && !action.is_bluff() {
            match (prev_goal, goal) {
                (Some(from), Some(to)) if from != to && world.is_available(from) => {
                    log::debug!("{:?} pivots {} -> {}", id, from, to);
                    events.push(SimEvent::GoalPivot {
                        tick: tick_no,
                        time: now,
                        agent: id,
                        from,
                        to,
                    });
                }
                _ => {}
            }
        }

        actions[id.index()] = action;
    }

    // Move
    for id in AgentId::BOTH {
        let target = actions[id.index()]
            .target()
            .and_then(|t| world.resource(t))
            .map(|r| r.pos);
        let agent = &mut world.agents[id.index()];
        integrate(agent, target, dt, config);
        agent.record_trail();
    }

    // Pickups, A first: ties on arrival go to A
    for id in AgentId::BOTH {
        resolve_pickup(world, id, config, events);
    }
    for id in AgentId::BOTH {
        let stale = world
            .agent(id)
            .goal
            .is_some_and(|g| !world.is_available(g));
        if stale {
            let (agent, other) = pair_mut(&mut world.agents, id);
            let (was, pos) = (agent.stance, agent.pos);
            agent.stance = Stance::Choosing;
            choose_goal(agent, other, &world.resources, config);
            // decoy snatched by the other voice
            if let Stance::Bluffing { decoy, .. } = was {
                reveal_bluff(world, id, decoy, pos, config, events);
            }
        }
    }

    for agent in &mut world.agents {
        agent.decay(dt);
    }

    if now - world.last_beat >= config.beat_interval {
        events.push(SimEvent::NarrativeBeat {
            tick: tick_no,
            time: now,
            beat: Beat::read(world),
        });
        world.last_beat = now;
    }

    world.effects.retain(|e| !e.is_expired(now));
}

/// Pick up the agent's goal if it is within reach
fn resolve_pickup(world: &mut World, id: AgentId, config: &Config, events: &mut Vec<SimEvent>) {
    let agent = world.agent(id);
    let Some(goal) = agent.goal else {
        return;
    };
    let Some(resource) = world.resource(goal).filter(|r| r.is_available()) else {
        return;
    };
    if agent.pos.distance(resource.pos) > config.capture_radius {
        return;
    }
    let (kind, pos) = (resource.kind, resource.pos);

    if let Some(resource) = world.resource_mut(goal) {
        resource.taken_by = Some(id);
    }
    for agent in &mut world.agents {
        agent.belief.forget(goal);
    }

    let (agent, other) = pair_mut(&mut world.agents, id);
    let (was, at) = (agent.stance, agent.pos);
    agent.carried.push(kind);
    agent.stance = Stance::Choosing;
    agent.glow = PICKUP_GLOW;
    agent.mood = Mood::Content;
    choose_goal(agent, other, &world.resources, config);

    log::debug!("{:?} picked up {:?} #{} at t={:.2}", id, kind, goal, world.clock.time);
    events.push(SimEvent::Pickup {
        tick: world.clock.tick,
        time: world.clock.time,
        agent: id,
        resource: goal,
        kind,
    });
    world.effects.push(Effect {
        kind: EffectKind::Bloom,
        pos,
        start: world.clock.time,
        duration: config.effect_duration,
    });
    world.clock.hold(config.pickup_pause);

    // walked all the way onto the decoy
    if let Stance::Bluffing { decoy, .. } = was {
        reveal_bluff(world, id, decoy, at, config, events);
    }
}

/// Announce the end of a bluff and hold the clock for the reveal
fn reveal_bluff(
    world: &mut World,
    id: AgentId,
    decoy: ResourceId,
    pos: Vec2,
    config: &Config,
    events: &mut Vec<SimEvent>,
) {
    log::debug!("{:?} reveals bluff (decoy {})", id, decoy);
    events.push(SimEvent::BluffReveal {
        tick: world.clock.tick,
        time: world.clock.time,
        agent: id,
        decoy,
    });
    world.effects.push(Effect {
        kind: EffectKind::Reveal,
        pos,
        start: world.clock.time,
        duration: config.effect_duration,
    });
    world.clock.hold(config.reveal_pause);
}

/// Check a freshly ticked world for invalid numbers or drifted beliefs
pub fn validate(world: &World) -> Result<()> {
    let any_available = world.available().next().is_some();
    for agent in &world.agents {
        let fields = [
            ("position", agent.pos.is_finite()),
            ("heading", agent.heading.is_finite()),
            ("velocity", agent.vel.is_finite()),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, ok)| !ok) {
            return Err(GardenError::NonFinite {
                agent: agent.id,
                field: *field,
            });
        }
        if any_available && !agent.belief.is_normalized(1e-3) {
            let min = agent
                .belief
                .iter()
                .map(|(_, p)| p)
                .fold(f32::INFINITY, f32::min);
            return Err(GardenError::BeliefDrift {
                agent: agent.id,
                sum: agent.belief.total(),
                min,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::belief::Belief;
    use crate::sim::state::{Preferences, Resource, ResourceKind};
    use glam::Vec2;
    use std::collections::BTreeMap;

    fn run(world: &mut World, rng: &mut SimRng, config: &Config, ticks: u32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            tick(world, rng, config, SIM_DT, &mut events);
        }
        events
    }

    /// Two agents facing away from each other, one resource each right ahead
    fn duel(config: &Config) -> World {
        let a = Agent::new(AgentId::A, Vec2::new(300.0, 300.0), std::f32::consts::PI, Preferences::default());
        let b = Agent::new(AgentId::B, Vec2::new(600.0, 300.0), 0.0, Preferences::default());
        let resources = vec![
            Resource::new(0, ResourceKind::Flower, Vec2::new(250.0, 300.0)),
            Resource::new(1, ResourceKind::Flower, Vec2::new(650.0, 300.0)),
        ];
        World::from_parts(config, [a, b], resources)
    }

    #[test]
    fn test_pause_freezes_motion_but_counts_down() {
        let config = Config::default();
        let mut world = duel(&config);
        world.clock.pause_remaining = 2.5 * SIM_DT;
        let pos = world.agents[0].pos;

        run(&mut world, &mut SimRng::new(1), &config, 2);
        assert_eq!(world.agents[0].pos, pos);
        assert_eq!(world.agents[0].goal, None);
        assert_eq!(world.clock.tick, 2);
        assert!(world.clock.is_paused());

        run(&mut world, &mut SimRng::new(1), &config, 2);
        assert!(!world.clock.is_paused());
        assert_ne!(world.agents[0].pos, pos);
    }

    #[test]
    fn test_pickup_marks_taken_and_pauses() {
        let config = Config::default();
        let mut world = duel(&config);
        let events = run(&mut world, &mut SimRng::new(1), &config, 60);

        let pickups: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Pickup { .. }))
            .collect();
        assert_eq!(pickups.len(), 2);
        assert_eq!(world.resources[0].taken_by, Some(AgentId::A));
        assert_eq!(world.resources[1].taken_by, Some(AgentId::B));
        assert_eq!(world.agents[0].carried, vec![ResourceKind::Flower]);
        assert_eq!(world.agents[0].goal, None);
        assert_eq!(world.agents[0].mood, Mood::Content);
        assert!(world.effects.iter().any(|e| e.kind == EffectKind::Bloom));
    }

    #[test]
    fn test_tied_arrival_goes_to_a() {
        let config = Config::default();
        let a = Agent::new(AgentId::A, Vec2::new(400.0, 300.0), 0.0, Preferences::default());
        let b = Agent::new(AgentId::B, Vec2::new(500.0, 300.0), std::f32::consts::PI, Preferences::default());
        let resources = vec![Resource::new(0, ResourceKind::Stone, Vec2::new(450.0, 300.0))];
        let mut world = World::from_parts(&config, [a, b], resources);

        let events = run(&mut world, &mut SimRng::new(2), &config, 60);
        assert_eq!(world.resources[0].taken_by, Some(AgentId::A));
        assert!(world.agents[1].carried.is_empty());
        assert_eq!(world.agents[1].goal, None);
        assert_eq!(
            events.iter().filter(|e| matches!(e, SimEvent::Pickup { .. })).count(),
            1
        );
    }

    #[test]
    fn test_bluff_start_and_reveal_events() {
        let config = Config {
            bluff_probability: 1.0,
            bluff_duration_ticks: 3,
            bluff_confidence: 0.5,
            reveal_pause: 0.0,
            ..Default::default()
        };
        // A faces away from B so no glimpse reshapes its belief
        let mut a = Agent::new(AgentId::A, Vec2::new(200.0, 300.0), std::f32::consts::PI, Preferences::default());
        let b = Agent::new(AgentId::B, Vec2::new(700.0, 300.0), 0.0, Preferences::default());
        let resources = vec![
            Resource::new(0, ResourceKind::Flower, Vec2::new(100.0, 300.0)),
            Resource::new(1, ResourceKind::Fruit, Vec2::new(200.0, 500.0)),
        ];
        a.goal = Some(0);
        let mut world = World::from_parts(&config, [a, b], resources);
        let mut weights = BTreeMap::new();
        weights.insert(0, 0.9);
        weights.insert(1, 0.1);
        world.agents[0].belief = Belief::from_weights(weights);

        let events = run(&mut world, &mut SimRng::new(3), &config, 4);
        let starts: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::BluffStart { agent: AgentId::A, .. }))
            .collect();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].tick(), 1);
        assert!(matches!(
            starts[0],
            SimEvent::BluffStart { goal: Some(0), decoy: 1, .. }
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::BluffReveal { agent: AgentId::A, decoy: 1, tick: 4, .. }
        )));
    }

    /// A bluffing with decoy #1; resources: #0 Stone far left, #1 Flower at `decoy`
    fn staged_bluff(config: &Config, a_at: Vec2, a_heading: f32, b_at: Vec2, decoy: Vec2) -> World {
        let mut a = Agent::new(AgentId::A, a_at, a_heading, Preferences::default());
        a.stance = Stance::Bluffing { remaining: 5, decoy: 1 };
        a.goal = Some(1);
        let b = Agent::new(AgentId::B, b_at, 0.0, Preferences::default());
        let resources = vec![
            Resource::new(0, ResourceKind::Stone, Vec2::new(100.0, 300.0)),
            Resource::new(1, ResourceKind::Flower, decoy),
        ];
        World::from_parts(config, [a, b], resources)
    }

    #[test]
    fn test_reveal_when_bluffer_takes_its_decoy() {
        let config = Config::default();
        let mut world = staged_bluff(
            &config,
            Vec2::new(200.0, 300.0),
            0.0,
            Vec2::new(700.0, 300.0),
            Vec2::new(205.0, 300.0),
        );

        let events = run(&mut world, &mut SimRng::new(4), &config, 1);
        assert!(matches!(
            events.as_slice(),
            [
                SimEvent::Pickup { agent: AgentId::A, resource: 1, .. },
                SimEvent::BluffReveal { agent: AgentId::A, decoy: 1, tick: 1, .. },
                ..
            ]
        ));
        assert_eq!(world.agents[0].stance, Stance::Choosing);
        assert!(world.effects.iter().any(|e| e.kind == EffectKind::Reveal));
        assert!(world.clock.pause_remaining >= config.pickup_pause);
    }

    #[test]
    fn test_reveal_when_decoy_is_snatched() {
        let config = Config::default();
        // B stands on the decoy and takes it on the first tick
        let mut world = staged_bluff(
            &config,
            Vec2::new(200.0, 300.0),
            std::f32::consts::PI,
            Vec2::new(600.0, 300.0),
            Vec2::new(600.0, 300.0),
        );

        let events = run(&mut world, &mut SimRng::new(4), &config, 1);
        assert_eq!(world.resources[1].taken_by, Some(AgentId::B));
        let reveals: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::BluffReveal { agent: AgentId::A, decoy: 1, .. }))
            .collect();
        assert_eq!(reveals.len(), 1);
        assert_eq!(reveals[0].tick(), 1);
        assert_eq!(world.agents[0].stance, Stance::Choosing);
        assert_eq!(world.agents[0].goal, Some(0));
    }

    #[test]
    fn test_paused_ticks_do_not_shorten_a_bluff() {
        let config = Config {
            bluff_probability: 1.0,
            bluff_duration_ticks: 3,
            bluff_confidence: 0.5,
            reveal_pause: 0.0,
            ..Default::default()
        };
        let mut a = Agent::new(AgentId::A, Vec2::new(200.0, 300.0), std::f32::consts::PI, Preferences::default());
        let b = Agent::new(AgentId::B, Vec2::new(700.0, 300.0), 0.0, Preferences::default());
        let resources = vec![
            Resource::new(0, ResourceKind::Flower, Vec2::new(100.0, 300.0)),
            Resource::new(1, ResourceKind::Fruit, Vec2::new(200.0, 500.0)),
        ];
        a.goal = Some(0);
        let mut world = World::from_parts(&config, [a, b], resources);
        let mut weights = BTreeMap::new();
        weights.insert(0, 0.9);
        weights.insert(1, 0.1);
        world.agents[0].belief = Belief::from_weights(weights);
        let mut rng = SimRng::new(3);

        let mut events = run(&mut world, &mut rng, &config, 1);
        assert_eq!(world.agents[0].stance, Stance::Bluffing { remaining: 2, decoy: 1 });

        // a narrative hold spanning three ticks
        world.clock.pause_remaining = 2.5 * SIM_DT;
        events.extend(run(&mut world, &mut rng, &config, 3));
        assert_eq!(world.clock.tick, 4);
        assert_eq!(world.agents[0].stance, Stance::Bluffing { remaining: 2, decoy: 1 });
        assert_eq!(world.agents[0].goal, Some(1));

        // the two remaining decisions, then the reveal
        events.extend(run(&mut world, &mut rng, &config, 2));
        assert_eq!(world.agents[0].goal, Some(1));
        events.extend(run(&mut world, &mut rng, &config, 1));
        let reveal_ticks: Vec<u64> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::BluffReveal { agent: AgentId::A, .. }))
            .map(|e| e.tick())
            .collect();
        assert_eq!(reveal_ticks, vec![7]);
    }

    #[test]
    fn test_beats_are_rate_limited() {
        let config = Config {
            beat_interval: 1.0,
            pickup_pause: 0.0,
            bluff_enabled: false,
            ..Default::default()
        };
        let mut world = World::generate(&config, &mut SimRng::new(5));
        let events = run(&mut world, &mut SimRng::new(5), &config, 300);
        let beats: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::NarrativeBeat { .. }))
            .collect();
        assert!((4..=5).contains(&beats.len()));
        for pair in beats.windows(2) {
            assert!(pair[1].tick() - pair[0].tick() >= 59);
        }
    }

    #[test]
    fn test_validate_flags_nan() {
        let config = Config::default();
        let mut world = duel(&config);
        assert!(validate(&world).is_ok());
        world.agents[1].pos.x = f32::NAN;
        assert!(matches!(
            validate(&world),
            Err(GardenError::NonFinite { agent: AgentId::B, field: "position" })
        ));
    }
}
