//! Garden parameters and seed coercion
//!
//! Every field has a documented valid range. Values outside the range are
//! clamped by [`Config::sanitized`] (non-finite values fall back to the
//! default), never rejected.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::error::{GardenError, Result};

/// Named parameter presets (the slider panel's quick picks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Trusting voices, no deception
    Gentle,
    #[default]
    Balanced,
    /// Sharp readers who bluff often
    Cunning,
    /// Short sight and noisy glances
    Foggy,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Gentle => "Gentle",
            Preset::Balanced => "Balanced",
            Preset::Cunning => "Cunning",
            Preset::Foggy => "Foggy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gentle" => Some(Preset::Gentle),
            "balanced" | "default" => Some(Preset::Balanced),
            "cunning" => Some(Preset::Cunning),
            "foggy" | "fog" => Some(Preset::Foggy),
            _ => None,
        }
    }
}

/// Simulation parameters
///
/// | field | range | default |
/// |---|---|---|
/// | `arena_width`, `arena_height` | 200 - 4000 px | 900, 600 |
/// | `arena_margin` | 0 - 100 px | 24 |
/// | `agent_speed` | 5 - 400 px/s | 60 |
/// | `turn_speed` | 0.1 - 20 rad/s | 4 |
/// | `fov` | 0.05 - 2π rad | 2.1 |
/// | `view_distance` | 10 - 5000 px | 320 |
/// | `position_noise` | 0 - 200 px | 10 |
/// | `angle_noise` | 0 - π rad | 0.2 |
/// | `belief_temperature` | 0.01 - 10 | 0.35 |
/// | `tom_strength` | 0 - 1 | 0.35 |
/// | `distance_cost` | 0 - 0.05 per px | 0.0004 |
/// | `conflict_cost` | 0 - 5 | 0.6 |
/// | `other_closer_penalty` | 0 - 2 | 0.1 |
/// | `cooperation_bonus` | 0 - 2 | 0.15 |
/// | `bluff_probability` | 0 - 1 | 0.08 |
/// | `bluff_duration_ticks` | 1 - 600 | 90 |
/// | `bluff_confidence` | 0 - 1 | 0.45 |
/// | `capture_radius` | 2 - 100 px | 16 |
/// | `resource_count` | 1 - 32 | 6 |
/// | `time_scale` | 0 - 8 | 1 |
/// | `pickup_pause`, `reveal_pause` | 0 - 10 s | 0.8, 0.5 |
/// | `beat_interval` | 0.5 - 120 s | 4 |
/// | `effect_duration` | 0 - 10 s | 1.2 |
/// | `memory_window` | 1 - 64 | 8 |
///
/// With `capture_radius >= agent_speed / turn_speed` an agent can never orbit
/// its goal without touching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Agents are kept this far from the arena edges
    pub arena_margin: f32,

    // === Motion ===
    pub agent_speed: f32,
    /// Maximum heading change per second
    pub turn_speed: f32,
    pub capture_radius: f32,

    // === Perception ===
    /// Full field-of-view cone angle (radians)
    pub fov: f32,
    pub view_distance: f32,
    pub position_noise: f32,
    pub angle_noise: f32,

    // === Belief ===
    /// Softmax temperature (lower = sharper)
    pub belief_temperature: f32,
    /// Theory-of-mind strength: 0 ignores evidence, 1 replaces belief
    pub tom_strength: f32,
    pub memory_window: usize,

    // === Decision ===
    pub distance_cost: f32,
    pub conflict_cost: f32,
    pub other_closer_penalty: f32,
    pub cooperation_bonus: f32,

    // === Bluffing ===
    pub bluff_enabled: bool,
    pub bluff_probability: f32,
    pub bluff_duration_ticks: u32,
    /// Belief confidence above which a goal collision may trigger a bluff
    pub bluff_confidence: f32,

    // === World ===
    pub resource_count: usize,

    // === Pacing ===
    /// Multiplies wall-clock elapsed time before sub-stepping
    pub time_scale: f32,
    pub pickup_pause: f32,
    pub reveal_pause: f32,
    /// Minimum simulated seconds between narrative beats
    pub beat_interval: f32,
    /// Lifetime of visual effect records
    pub effect_duration: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_width: 900.0,
            arena_height: 600.0,
            arena_margin: 24.0,

            agent_speed: 60.0,
            turn_speed: 4.0,
            capture_radius: 16.0,

            fov: 2.1,
            view_distance: 320.0,
            position_noise: 10.0,
            angle_noise: 0.2,

            belief_temperature: 0.35,
            tom_strength: 0.35,
            memory_window: crate::consts::MEMORY_WINDOW,

            distance_cost: 0.0004,
            conflict_cost: 0.6,
            other_closer_penalty: 0.1,
            cooperation_bonus: 0.15,

            bluff_enabled: true,
            bluff_probability: 0.08,
            bluff_duration_ticks: 90,
            bluff_confidence: 0.45,

            resource_count: 6,

            time_scale: 1.0,
            pickup_pause: 0.8,
            reveal_pause: 0.5,
            beat_interval: 4.0,
            effect_duration: 1.2,
        }
    }
}

/// Clamp `value` into `[lo, hi]`, falling back to `default` when non-finite
fn fit(name: &str, value: f32, lo: f32, hi: f32, default: f32) -> f32 {
    let fitted = if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        default
    };
    if fitted != value {
        log::warn!("Config {} = {} out of range, using {}", name, value, fitted);
    }
    fitted
}

fn fit_int<T>(name: &str, value: T, lo: T, hi: T) -> T
where
    T: Ord + Copy + std::fmt::Display,
{
    let fitted = value.clamp(lo, hi);
    if fitted != value {
        log::warn!("Config {} = {} out of range, using {}", name, value, fitted);
    }
    fitted
}

impl Config {
    /// Create a config from a preset
    pub fn from_preset(preset: Preset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a preset on top of the current values
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Gentle => {
                self.bluff_enabled = false;
                self.conflict_cost = 0.3;
                self.cooperation_bonus = 0.35;
                self.tom_strength = 0.25;
            }
            Preset::Balanced => {}
            Preset::Cunning => {
                self.bluff_enabled = true;
                self.bluff_probability = 0.3;
                self.tom_strength = 0.6;
                self.belief_temperature = 0.2;
            }
            Preset::Foggy => {
                self.view_distance = 180.0;
                self.fov = 1.4;
                self.position_noise = 40.0;
                self.angle_noise = 0.6;
            }
        }
    }

    /// Parse a JSON document (missing fields take defaults) and clamp it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Build the startup config: an optional JSON document, then an optional
    /// named preset on top
    pub fn load(json: Option<&str>, preset: Option<&str>) -> Result<Self> {
        let mut config = match json {
            Some(json) => Self::from_json(json)?,
            None => Self::default(),
        };
        if let Some(name) = preset {
            let preset =
                Preset::from_str(name).ok_or_else(|| GardenError::UnknownPreset(name.to_string()))?;
            log::info!("Applying preset {}", preset.as_str());
            config.apply_preset(preset);
        }
        Ok(config.sanitized())
    }

    /// Copy with every field clamped to its documented range
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            arena_width: fit("arena_width", self.arena_width, 200.0, 4000.0, d.arena_width),
            arena_height: fit("arena_height", self.arena_height, 200.0, 4000.0, d.arena_height),
            arena_margin: fit("arena_margin", self.arena_margin, 0.0, 100.0, d.arena_margin),

            agent_speed: fit("agent_speed", self.agent_speed, 5.0, 400.0, d.agent_speed),
            turn_speed: fit("turn_speed", self.turn_speed, 0.1, 20.0, d.turn_speed),
            capture_radius: fit("capture_radius", self.capture_radius, 2.0, 100.0, d.capture_radius),

            fov: fit("fov", self.fov, 0.05, TAU, d.fov),
            view_distance: fit("view_distance", self.view_distance, 10.0, 5000.0, d.view_distance),
            position_noise: fit("position_noise", self.position_noise, 0.0, 200.0, d.position_noise),
            angle_noise: fit("angle_noise", self.angle_noise, 0.0, PI, d.angle_noise),

            belief_temperature: fit(
                "belief_temperature",
                self.belief_temperature,
                0.01,
                10.0,
                d.belief_temperature,
            ),
            tom_strength: fit("tom_strength", self.tom_strength, 0.0, 1.0, d.tom_strength),
            memory_window: fit_int("memory_window", self.memory_window, 1, 64),

            distance_cost: fit("distance_cost", self.distance_cost, 0.0, 0.05, d.distance_cost),
            conflict_cost: fit("conflict_cost", self.conflict_cost, 0.0, 5.0, d.conflict_cost),
            other_closer_penalty: fit(
                "other_closer_penalty",
                self.other_closer_penalty,
                0.0,
                2.0,
                d.other_closer_penalty,
            ),
            cooperation_bonus: fit(
                "cooperation_bonus",
                self.cooperation_bonus,
                0.0,
                2.0,
                d.cooperation_bonus,
            ),

            bluff_enabled: self.bluff_enabled,
            bluff_probability: fit(
                "bluff_probability",
                self.bluff_probability,
                0.0,
                1.0,
                d.bluff_probability,
            ),
            bluff_duration_ticks: fit_int("bluff_duration_ticks", self.bluff_duration_ticks, 1, 600),
            bluff_confidence: fit(
                "bluff_confidence",
                self.bluff_confidence,
                0.0,
                1.0,
                d.bluff_confidence,
            ),

            resource_count: fit_int("resource_count", self.resource_count, 1, 32),

            time_scale: fit("time_scale", self.time_scale, 0.0, 8.0, d.time_scale),
            pickup_pause: fit("pickup_pause", self.pickup_pause, 0.0, 10.0, d.pickup_pause),
            reveal_pause: fit("reveal_pause", self.reveal_pause, 0.0, 10.0, d.reveal_pause),
            beat_interval: fit("beat_interval", self.beat_interval, 0.5, 120.0, d.beat_interval),
            effect_duration: fit("effect_duration", self.effect_duration, 0.0, 10.0, d.effect_duration),
        }
    }
}

/// Coerce a seed string to an integer seed
///
/// Accepts integers (negative values wrap), and numeric strings with a
/// fractional part (truncated). Anything else yields 0.
pub fn parse_seed(input: &str) -> u64 {
    let s = input.trim();
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }
    if let Ok(v) = s.parse::<i64>() {
        return v as u64;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => (v.trunc() as i64) as u64,
        _ => 0,
    }
}
