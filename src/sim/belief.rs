//! Belief over the other agent's target
//!
//! Each glimpse of the other agent scores every available resource by how
//! much the other is closing in on it, how well its gaze lines up with it and
//! how near it stands. A softmax turns the scores into a distribution which is
//! blended into the running belief by the theory-of-mind strength.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Agent, Observation, Resource, ResourceId};
use crate::config::Config;
use crate::consts::*;
use crate::{bearing, normalize_angle};

/// Probability per resource id; sums to 1 over its entries unless empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    probs: BTreeMap<ResourceId, f32>,
}

impl Belief {
    pub fn uniform(ids: &[ResourceId]) -> Self {
        if ids.is_empty() {
            return Self::default();
        }
        let p = 1.0 / ids.len() as f32;
        Self {
            probs: ids.iter().map(|&id| (id, p)).collect(),
        }
    }

    /// Normalise raw non-negative weights, falling back to uniform when degenerate
    pub fn from_weights(weights: BTreeMap<ResourceId, f32>) -> Self {
        let valid = weights.values().all(|w| w.is_finite() && *w >= 0.0);
        let total: f32 = weights.values().sum();
        if !valid || !total.is_finite() || total <= 0.0 {
            let ids: Vec<ResourceId> = weights.keys().copied().collect();
            return Self::uniform(&ids);
        }
        Self {
            probs: weights.into_iter().map(|(id, w)| (id, w / total)).collect(),
        }
    }

    pub fn prob(&self, id: ResourceId) -> f32 {
        self.probs.get(&id).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f32 {
        self.probs.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, f32)> + '_ {
        self.probs.iter().map(|(&id, &p)| (id, p))
    }

    /// Most likely available target (first in id order on ties)
    pub fn most_likely(&self, resources: &[Resource]) -> Option<(ResourceId, f32)> {
        let mut best: Option<(ResourceId, f32)> = None;
        for r in resources.iter().filter(|r| r.is_available()) {
            let p = self.prob(r.id);
            if best.is_none_or(|(_, bp)| p > bp) {
                best = Some((r.id, p));
            }
        }
        best
    }

    /// Drop a taken resource and renormalise the rest
    pub fn forget(&mut self, id: ResourceId) {
        if self.probs.remove(&id).is_some() {
            *self = Self::from_weights(std::mem::take(&mut self.probs));
        }
    }

    /// All entries in [0, 1] and summing to 1 within `tolerance`
    pub fn is_normalized(&self, tolerance: f32) -> bool {
        self.is_empty()
            || (self.probs.values().all(|p| (0.0..=1.0).contains(p))
                && (self.total() - 1.0).abs() <= tolerance)
    }
}

/// Temperature softmax; uniform when scores are degenerate
pub fn softmax(scores: &[f32], temperature: f32) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let uniform = vec![1.0 / scores.len() as f32; scores.len()];
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() || scores.iter().any(|s| !s.is_finite()) {
        return uniform;
    }
    let t = temperature.max(1e-3);
    let exps: Vec<f32> = scores.iter().map(|s| ((s - max) / t).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return uniform;
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// How strongly a glimpse suggests the other agent is heading for `target`
pub fn intent_score(obs: &Observation, prev: Option<&Observation>, target: Vec2) -> f32 {
    let d_now = obs.pos.distance(target);
    let closing = prev.map_or(0.0, |p| {
        ((p.pos.distance(target) - d_now) / BELIEF_CLOSING_SCALE).clamp(-1.0, 1.0)
    });
    let alignment = normalize_angle(bearing(obs.pos, target) - obs.heading).cos();
    let proximity = 1.0 / (1.0 + d_now / BELIEF_PROXIMITY_SCALE);

    BELIEF_CLOSING_WEIGHT * closing
        + BELIEF_ALIGN_WEIGHT * alignment
        + BELIEF_PROXIMITY_WEIGHT * proximity
}

/// Fold a glimpse of the other agent into `agent`'s belief and memory
///
/// Without a glimpse nothing changes.
pub fn update_belief(
    agent: &mut Agent,
    observation: Option<&Observation>,
    resources: &[Resource],
    config: &Config,
) {
    let Some(obs) = observation else {
        return;
    };

    let available: Vec<&Resource> = resources.iter().filter(|r| r.is_available()).collect();
    if !available.is_empty() {
        let prev = agent.memory.back();
        let scores: Vec<f32> = available
            .iter()
            .map(|r| intent_score(obs, prev, r.pos))
            .collect();
        let fresh = softmax(&scores, config.belief_temperature);

        let k = config.tom_strength.clamp(0.0, 1.0);
        let blended: BTreeMap<ResourceId, f32> = available
            .iter()
            .zip(&fresh)
            .map(|(r, &p_new)| (r.id, (1.0 - k) * agent.belief.prob(r.id) + k * p_new))
            .collect();
        agent.belief = Belief::from_weights(blended);
    }

    agent.memory.push_back(*obs);
    while agent.memory.len() > config.memory_window.max(1) {
        agent.memory.pop_front();
    }
}
