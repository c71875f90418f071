//! Target selection and bluffing
//!
//! An agent is either choosing freely or committed to a bluff. A bluff starts
//! when the agent believes the other is after its own goal; it then walks to a
//! decoy for a fixed number of decisions without re-evaluating.

use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use super::state::{Agent, Mood, Resource, ResourceId, Stance};
use crate::config::Config;

/// What an agent does this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveTo { target: ResourceId, bluff: bool },
    Idle,
}

impl Action {
    pub fn target(&self) -> Option<ResourceId> {
        match self {
            Action::MoveTo { target, .. } => Some(*target),
            Action::Idle => None,
        }
    }

    pub fn is_bluff(&self) -> bool {
        matches!(self, Action::MoveTo { bluff: true, .. })
    }
}

/// Pick this tick's action for `agent`
///
/// `other` must be the other agent's state from before this tick's decisions.
pub fn decide(
    agent: &mut Agent,
    other: &Agent,
    resources: &[Resource],
    config: &Config,
    rng: &mut SimRng,
) -> Action {
    if let Stance::Bluffing { remaining, decoy } = agent.stance {
        let decoy_alive = resources.iter().any(|r| r.id == decoy && r.is_available());
        if remaining > 0 && decoy_alive {
            agent.stance = Stance::Bluffing {
                remaining: remaining - 1,
                decoy,
            };
            agent.goal = Some(decoy);
            agent.mood = Mood::Sly;
            return Action::MoveTo {
                target: decoy,
                bluff: true,
            };
        }
        agent.stance = Stance::Choosing;
    }

    if let Some(action) = try_bluff(agent, resources, config, rng) {
        return action;
    }
    choose_goal(agent, other, resources, config)
}

/// Start a bluff if the other seems to be after our goal and the dice agree
fn try_bluff(
    agent: &mut Agent,
    resources: &[Resource],
    config: &Config,
    rng: &mut SimRng,
) -> Option<Action> {
    if !config.bluff_enabled {
        return None;
    }
    let goal = agent.goal?;
    if !resources.iter().any(|r| r.id == goal && r.is_available()) {
        return None;
    }
    let (likely, confidence) = agent.belief.most_likely(resources)?;
    if likely != goal || confidence <= config.bluff_confidence {
        return None;
    }

    let mut decoy: Option<(ResourceId, f32)> = None;
    for r in resources.iter().filter(|r| r.is_available() && r.id != goal) {
        let d = agent.pos.distance(r.pos);
        if decoy.is_none_or(|(_, best)| d < best) {
            decoy = Some((r.id, d));
        }
    }
    let (decoy, _) = decoy?;

    if !rng.chance(config.bluff_probability) {
        return None;
    }

    log::debug!("{:?} bluffs: {} -> decoy {}", agent.id, goal, decoy);
    agent.stance = Stance::Bluffing {
        remaining: config.bluff_duration_ticks.saturating_sub(1),
        decoy,
    };
    agent.goal = Some(decoy);
    agent.mood = Mood::Sly;
    Some(Action::MoveTo {
        target: decoy,
        bluff: true,
    })
}

/// Utility of heading for `resource`
///
/// preference - distance cost - conflict penalty - "other is closer" penalty
/// + cooperation bonus when the other seems to want something else.
pub fn utility(
    agent: &Agent,
    other: &Agent,
    resource: &Resource,
    others_pick: Option<ResourceId>,
    config: &Config,
) -> f32 {
    let d = agent.pos.distance(resource.pos);
    let mut score = agent.preferences.weight(resource.kind)
        - config.distance_cost * d
        - config.conflict_cost * agent.belief.prob(resource.id);
    if other.pos.distance(resource.pos) < d {
        score -= config.other_closer_penalty;
    }
    if others_pick.is_some_and(|id| id != resource.id) {
        score += config.cooperation_bonus;
    }
    score
}

/// Normal branch: argmax utility over available resources (first on ties)
///
/// Draws nothing from the RNG, so it is also used to re-target right after a
/// pickup.
pub fn choose_goal(
    agent: &mut Agent,
    other: &Agent,
    resources: &[Resource],
    config: &Config,
) -> Action {
    let others_pick = agent.belief.most_likely(resources);
    let mut best: Option<(ResourceId, f32)> = None;
    for r in resources.iter().filter(|r| r.is_available()) {
        let score = utility(agent, other, r, others_pick.map(|(id, _)| id), config);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((r.id, score));
        }
    }

    let Some((target, _)) = best else {
        agent.goal = None;
        if agent.glow <= 0.0 {
            agent.mood = Mood::Calm;
        }
        return Action::Idle;
    };

    agent.goal = Some(target);
    if agent.glow <= 0.0 {
        let available = resources.iter().filter(|r| r.is_available()).count();
        let contested = agent.belief.prob(target) > 0.5;
        let unsure = others_pick.is_none_or(|(_, p)| p * available as f32 <= 1.5);
        agent.mood = if contested {
            Mood::Wary
        } else if unsure {
            Mood::Curious
        } else {
            Mood::Calm
        };
    }
    Action::MoveTo {
        target,
        bluff: false,
    }
}
