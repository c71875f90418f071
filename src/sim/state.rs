//! Garden state and core simulation types
//!
//! Everything a tick reads or writes lives here. Presentation-only fields
//! (mood, trail, glow) are carried along but never feed back into decisions.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::belief::Belief;
use super::rng::SimRng;
use crate::config::Config;
use crate::consts::*;
use crate::normalize_angle;

/// One of the two voices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentId {
    A,
    B,
}

impl AgentId {
    pub const BOTH: [AgentId; 2] = [AgentId::A, AgentId::B];

    pub fn index(self) -> usize {
        match self {
            AgentId::A => 0,
            AgentId::B => 1,
        }
    }

    pub fn other(self) -> AgentId {
        match self {
            AgentId::A => AgentId::B,
            AgentId::B => AgentId::A,
        }
    }
}

/// Resource kinds scattered in the garden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Flower,
    Fruit,
    Stone,
    Feather,
}

impl ResourceKind {
    pub const COUNT: usize = 4;
    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Flower,
        ResourceKind::Fruit,
        ResourceKind::Stone,
        ResourceKind::Feather,
    ];

    pub fn index(self) -> usize {
        match self {
            ResourceKind::Flower => 0,
            ResourceKind::Fruit => 1,
            ResourceKind::Stone => 2,
            ResourceKind::Feather => 3,
        }
    }
}

pub type ResourceId = u32;

/// A collectible resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub pos: Vec2,
    /// Set once, never cleared
    pub taken_by: Option<AgentId>,
}

impl Resource {
    pub fn new(id: ResourceId, kind: ResourceKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            taken_by: None,
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.taken_by.is_none()
    }
}

/// Weights handed out to each agent, shuffled per agent at generation
///
/// The top step is wide enough that a favourite anywhere in the default arena
/// outscores the runner-up after distance, conflict and cooperation terms.
pub const PREFERENCE_LADDER: [f32; ResourceKind::COUNT] = [3.0, 1.5, 0.8, 0.4];

/// Per-kind preference weights (distinct per kind)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub weights: [f32; ResourceKind::COUNT],
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            weights: PREFERENCE_LADDER,
        }
    }
}

impl Preferences {
    pub fn shuffled(rng: &mut SimRng) -> Self {
        let mut weights = PREFERENCE_LADDER;
        rng.shuffle(&mut weights);
        Self { weights }
    }

    #[inline]
    pub fn weight(&self, kind: ResourceKind) -> f32 {
        self.weights[kind.index()]
    }

    /// Most wanted kind (first on ties)
    pub fn favorite(&self) -> ResourceKind {
        let mut best = ResourceKind::ALL[0];
        for kind in ResourceKind::ALL {
            if self.weight(kind) > self.weight(best) {
                best = kind;
            }
        }
        best
    }

    /// Second most wanted kind (first on ties)
    pub fn runner_up(&self) -> ResourceKind {
        let top = self.favorite();
        let mut best: Option<ResourceKind> = None;
        for kind in ResourceKind::ALL.into_iter().filter(|k| *k != top) {
            if best.is_none_or(|b| self.weight(kind) > self.weight(b)) {
                best = Some(kind);
            }
        }
        best.unwrap_or(top)
    }

    /// Promote the runner-up when the favourite clashes with `other`'s
    pub fn avoid_favorite_of(&mut self, other: &Preferences) {
        let top = self.favorite();
        if top == other.favorite() {
            let second = self.runner_up();
            self.weights.swap(top.index(), second.index());
        }
    }
}

/// A noisy glimpse of the other agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub pos: Vec2,
    pub heading: f32,
    /// Tick the glimpse was taken on
    pub tick: u64,
}

/// Decision stance: free choice or a committed bluff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    Choosing,
    /// Walking to `decoy` for `remaining` more decisions after this one
    Bluffing { remaining: u32, decoy: ResourceId },
}

impl Stance {
    pub fn is_bluffing(&self) -> bool {
        matches!(self, Stance::Bluffing { .. })
    }
}

/// Presentation mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mood {
    #[default]
    Calm,
    Curious,
    Wary,
    Sly,
    Content,
}

/// One of the two voices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub pos: Vec2,
    /// Heading angle (radians, [-π, π))
    pub heading: f32,
    pub vel: Vec2,
    pub carried: Vec<ResourceKind>,
    pub goal: Option<ResourceId>,
    pub preferences: Preferences,
    /// Belief over which resource the other agent is after
    pub belief: Belief,
    /// Recent noisy observations of the other agent (oldest first)
    pub memory: VecDeque<Observation>,
    pub stance: Stance,
    pub mood: Mood,
    /// Pickup glow (seconds, decays)
    #[serde(default)]
    pub glow: f32,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Agent {
    pub fn new(id: AgentId, pos: Vec2, heading: f32, preferences: Preferences) -> Self {
        Self {
            id,
            pos,
            heading: normalize_angle(heading),
            vel: Vec2::ZERO,
            carried: Vec::new(),
            goal: None,
            preferences,
            belief: Belief::default(),
            memory: VecDeque::with_capacity(MEMORY_WINDOW),
            stance: Stance::Choosing,
            mood: Mood::Calm,
            glow: 0.0,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Fade presentation timers
    pub fn decay(&mut self, dt: f32) {
        if self.glow > 0.0 {
            self.glow = (self.glow - dt).max(0.0);
        }
        if self.glow == 0.0 && self.mood == Mood::Content {
            self.mood = Mood::Calm;
        }
    }
}

/// Simulated time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clock {
    /// Simulated seconds
    pub time: f32,
    pub tick: u64,
    /// While positive, decisions and motion are frozen
    pub pause_remaining: f32,
}

impl Clock {
    pub fn is_paused(&self) -> bool {
        self.pause_remaining > 0.0
    }

    /// Extend the pause to at least `secs`
    pub fn hold(&mut self, secs: f32) {
        self.pause_remaining = self.pause_remaining.max(secs);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Flourish where a resource was picked up
    Bloom,
    /// Shimmer around an agent when its bluff is revealed
    Reveal,
}

/// A transient visual event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub start: f32,
    pub duration: f32,
}

impl Effect {
    pub fn is_expired(&self, now: f32) -> bool {
        now - self.start >= self.duration
    }

    /// 0 at start, 1 at expiry
    pub fn progress(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            ((now - self.start) / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Complete garden state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    /// Indexed by `AgentId::index`
    pub agents: [Agent; 2],
    /// Sorted by id
    pub resources: Vec<Resource>,
    pub clock: Clock,
    pub effects: Vec<Effect>,
    /// Simulated time of the last narrative beat
    pub last_beat: f32,
}

impl World {
    /// Generate a garden from the seeded stream
    ///
    /// Draw order: agent A (x, y, heading, preferences), agent B, then each
    /// resource position.
    ///
    /// The two voices never share a favourite kind, and kinds are dealt
    /// starting with A's favourite then B's, so both favourites are present
    /// whenever there are at least two resources.
    pub fn generate(config: &Config, rng: &mut SimRng) -> Self {
        let (w, h) = (config.arena_width, config.arena_height);

        let mut spawn = |id: AgentId, x_lo: f32, x_hi: f32| {
            let x = rng.range(w * x_lo, w * x_hi);
            let y = rng.range(h * 0.3, h * 0.7);
            let heading = rng.range(-std::f32::consts::PI, std::f32::consts::PI);
            let prefs = Preferences::shuffled(rng);
            Agent::new(id, Vec2::new(x, y), heading, prefs)
        };
        let a = spawn(AgentId::A, 0.15, 0.3);
        let mut b = spawn(AgentId::B, 0.7, 0.85);
        b.preferences.avoid_favorite_of(&a.preferences);
        let deal = Self::kind_order(&a.preferences, &b.preferences);

        let inset = (config.arena_margin + config.capture_radius).min(w.min(h) * 0.25);
        let mut resources: Vec<Resource> = Vec::with_capacity(config.resource_count);
        for i in 0..config.resource_count {
            let mut pos = Vec2::ZERO;
            for _ in 0..RESOURCE_PLACEMENT_ATTEMPTS {
                pos = Vec2::new(rng.range(inset, w - inset), rng.range(inset, h - inset));
                let crowded = resources
                    .iter()
                    .any(|r| r.pos.distance(pos) < RESOURCE_MIN_SPACING);
                if !crowded {
                    break;
                }
            }
            let kind = deal[i % ResourceKind::COUNT];
            resources.push(Resource::new(i as ResourceId, kind, pos));
        }

        Self::from_parts(config, [a, b], resources)
    }

    /// A's favourite, B's favourite, then the rest in declaration order
    fn kind_order(a: &Preferences, b: &Preferences) -> [ResourceKind; ResourceKind::COUNT] {
        let mut order = [a.favorite(), b.favorite(), a.favorite(), a.favorite()];
        let mut next = 2;
        for kind in ResourceKind::ALL {
            if next < order.len() && !order[..2].contains(&kind) {
                order[next] = kind;
                next += 1;
            }
        }
        order
    }

    /// Assemble a garden from explicit parts; beliefs start uniform
    pub fn from_parts(config: &Config, agents: [Agent; 2], mut resources: Vec<Resource>) -> Self {
        resources.sort_by_key(|r| r.id);
        let mut world = Self {
            width: config.arena_width,
            height: config.arena_height,
            agents,
            resources,
            clock: Clock::default(),
            effects: Vec::new(),
            last_beat: 0.0,
        };
        world.reset_beliefs();
        world
    }

    /// Reset both beliefs to uniform over the available resources
    pub fn reset_beliefs(&mut self) {
        let ids: Vec<ResourceId> = self.available().map(|r| r.id).collect();
        for agent in &mut self.agents {
            agent.belief = Belief::uniform(&ids);
            agent.memory.clear();
        }
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    pub fn agent_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id.index()]
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn resource_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    /// Untaken resources, in id order
    pub fn available(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_available())
    }

    pub fn is_available(&self, id: ResourceId) -> bool {
        self.resource(id).is_some_and(|r| r.is_available())
    }
}
