//! Deterministic simulation module
//!
//! All behavior lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, drawn in a fixed order
//! - Agent A before agent B, resources in id order
//! - No rendering or platform dependencies

pub mod belief;
pub mod decide;
pub mod events;
pub mod motion;
pub mod observe;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use belief::{Belief, softmax, update_belief};
pub use decide::{Action, choose_goal, decide};
pub use events::{Beat, SimEvent};
pub use motion::integrate;
pub use observe::{in_view, observe};
pub use rng::SimRng;
pub use snapshot::{AgentView, Snapshot};
pub use state::{
    Agent, AgentId, Clock, Effect, EffectKind, Mood, Observation, Preferences, Resource,
    ResourceId, ResourceKind, Stance, World,
};
pub use tick::{tick, validate};
