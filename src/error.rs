use thiserror::Error;

use crate::sim::AgentId;

#[derive(Error, Debug)]
pub enum GardenError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Non-finite {field} on agent {agent:?}")]
    NonFinite { agent: AgentId, field: &'static str },

    #[error("Belief of agent {agent:?} drifted (sum {sum}, min {min})")]
    BeliefDrift { agent: AgentId, sum: f32, min: f32 },
}

pub type Result<T> = std::result::Result<T, GardenError>;
