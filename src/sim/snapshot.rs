//! Read-only view of the garden for rendering and narration

use glam::Vec2;
use serde::Serialize;

use super::events::SimEvent;
use super::state::{
    Agent, AgentId, Effect, Mood, Resource, ResourceId, ResourceKind, Stance, World,
};

#[derive(Debug, Clone, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub pos: Vec2,
    pub heading: f32,
    pub vel: Vec2,
    pub goal: Option<ResourceId>,
    /// (resource, probability) over available resources, id order
    pub belief: Vec<(ResourceId, f32)>,
    pub mood: Mood,
    pub stance: Stance,
    pub carried: Vec<ResourceKind>,
    pub glow: f32,
    /// Newest first
    pub trail: Vec<Vec2>,
}

impl AgentView {
    fn capture(agent: &Agent, world: &World) -> Self {
        Self {
            id: agent.id,
            pos: agent.pos,
            heading: agent.heading,
            vel: agent.vel,
            goal: agent.goal,
            belief: agent
                .belief
                .iter()
                .filter(|(id, _)| world.is_available(*id))
                .collect(),
            mood: agent.mood,
            stance: agent.stance,
            carried: agent.carried.clone(),
            glow: agent.glow,
            trail: agent.trail.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub seed: u64,
    pub tick: u64,
    pub time: f32,
    pub paused: bool,
    pub width: f32,
    pub height: f32,
    pub agents: Vec<AgentView>,
    pub resources: Vec<Resource>,
    pub effects: Vec<Effect>,
    /// Events not yet drained by the presentation layer
    pub events: Vec<SimEvent>,
}

impl Snapshot {
    pub fn capture<'a>(
        world: &World,
        seed: u64,
        events: impl IntoIterator<Item = &'a SimEvent>,
    ) -> Self {
        Self {
            seed,
            tick: world.clock.tick,
            time: world.clock.time,
            paused: world.clock.is_paused(),
            width: world.width,
            height: world.height,
            agents: world
                .agents
                .iter()
                .map(|a| AgentView::capture(a, world))
                .collect(),
            resources: world.resources.clone(),
            effects: world.effects.clone(),
            events: events.into_iter().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
