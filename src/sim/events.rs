//! Events emitted for narration and rendering
//!
//! The core pushes these and moves on; nothing reads them back.

use serde::{Deserialize, Serialize};

use super::state::{AgentId, ResourceId, ResourceKind, World};

/// A narrative beat: a coarse reading of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beat {
    /// Both voices are heading for the same resource
    Standoff { resource: ResourceId },
    /// `chaser` walks toward what it believes the other wants
    Pursuit { chaser: AgentId, resource: ResourceId },
    Wander,
    /// Nothing left to pick up
    Endgame,
}

impl Beat {
    /// Read the current scene
    pub fn read(world: &World) -> Beat {
        if world.available().next().is_none() {
            return Beat::Endgame;
        }
        let [a, b] = &world.agents;
        match (a.goal, b.goal) {
            (Some(ga), Some(gb)) if ga == gb => return Beat::Standoff { resource: ga },
            _ => {}
        }
        for agent in &world.agents {
            match (agent.goal, agent.belief.most_likely(&world.resources)) {
                (Some(goal), Some((likely, p))) if goal == likely && p > 0.5 => {
                    return Beat::Pursuit {
                        chaser: agent.id,
                        resource: goal,
                    };
                }
                _ => {}
            }
        }
        Beat::Wander
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    Pickup {
        tick: u64,
        time: f32,
        agent: AgentId,
        resource: ResourceId,
        kind: ResourceKind,
    },
    /// An agent changed its mind outside of a bluff
    GoalPivot {
        tick: u64,
        time: f32,
        agent: AgentId,
        from: ResourceId,
        to: ResourceId,
    },
    BluffStart {
        tick: u64,
        time: f32,
        agent: AgentId,
        /// The goal being hidden
        goal: Option<ResourceId>,
        decoy: ResourceId,
    },
    /// A bluff ran its course (or lost its decoy)
    BluffReveal {
        tick: u64,
        time: f32,
        agent: AgentId,
        decoy: ResourceId,
    },
    NarrativeBeat { tick: u64, time: f32, beat: Beat },
}

impl SimEvent {
    pub fn tick(&self) -> u64 {
        match self {
            SimEvent::Pickup { tick, .. }
            | SimEvent::GoalPivot { tick, .. }
            | SimEvent::BluffStart { tick, .. }
            | SimEvent::BluffReveal { tick, .. }
            | SimEvent::NarrativeBeat { tick, .. } => *tick,
        }
    }

    pub fn agent(&self) -> Option<AgentId> {
        match self {
            SimEvent::Pickup { agent, .. }
            | SimEvent::GoalPivot { agent, .. }
            | SimEvent::BluffStart { agent, .. }
            | SimEvent::BluffReveal { agent, .. } => Some(*agent),
            SimEvent::NarrativeBeat { .. } => None,
        }
    }
}
