//! Simulation context: owns the config, the seeded stream and the world
//!
//! Lifecycle: [`Garden::new`] builds a world from a seed, [`Garden::reset`]
//! rebuilds it from the same seed and [`Garden::reseed`] from a new one.
//! Nothing survives a reset except the config.

use std::collections::VecDeque;

use crate::config::Config;
use crate::consts::*;
use crate::error::Result;
use crate::sim::{SimEvent, SimRng, Snapshot, World, tick, validate};

pub struct Garden {
    config: Config,
    rng: SimRng,
    world: World,
    /// Events waiting for the presentation layer (bounded)
    events: VecDeque<SimEvent>,
    /// Unspent frame time
    accumulator: f32,
}

impl Garden {
    pub fn new(config: Config, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = SimRng::new(seed);
        let world = World::generate(&config, &mut rng);
        log::info!(
            "Garden seeded with {} ({} resources, {}x{})",
            seed,
            world.resources.len(),
            config.arena_width,
            config.arena_height
        );
        Self {
            config,
            rng,
            world,
            events: VecDeque::new(),
            accumulator: 0.0,
        }
    }

    /// Rebuild everything from the current seed
    pub fn reset(&mut self) {
        self.reseed(self.rng.seed());
    }

    /// Rebuild everything from `seed`
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(self.config.clone(), seed);
    }

    /// Replace the config. Behavior parameters apply from the next tick;
    /// arena size and resource count apply at the next reset.
    pub fn set_config(&mut self, config: Config) {
        self.config = config.sanitized();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for staging scenes; call [`World::reset_beliefs`] after
    /// swapping resources
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run one tick of `dt` seconds
    ///
    /// The tick runs on a scratch copy; if the result fails validation it is
    /// thrown away and the previous state stays in place.
    pub fn step_with(&mut self, dt: f32) -> Result<()> {
        let mut world = self.world.clone();
        let mut rng = self.rng.clone();
        let mut fresh = Vec::new();
        tick(&mut world, &mut rng, &self.config, dt, &mut fresh);

        if let Err(e) = validate(&world) {
            log::warn!("Tick {} discarded: {}", world.clock.tick, e);
            return Err(e);
        }

        self.world = world;
        self.rng = rng;
        for event in fresh {
            if self.events.len() == MAX_PENDING_EVENTS {
                self.events.pop_front();
            }
            self.events.push_back(event);
        }
        Ok(())
    }

    /// Run one tick at the default timestep
    pub fn step(&mut self) -> Result<()> {
        self.step_with(SIM_DT)
    }

    /// Feed wall-clock time; runs as many whole sub-steps as it covers
    ///
    /// `elapsed` is scaled by `time_scale` and clamped to
    /// [`MAX_FRAME_ELAPSED`]; `substep` is clamped to
    /// [`MIN_SUBSTEP`, `MAX_SUBSTEP`]. The remainder carries over to the next
    /// call. Returns the number of sub-steps run.
    pub fn advance(&mut self, elapsed: f32, substep: f32) -> Result<u32> {
        let substep = if substep.is_finite() {
            substep.clamp(MIN_SUBSTEP, MAX_SUBSTEP)
        } else {
            SIM_DT
        };
        let scaled = elapsed * self.config.time_scale;
        let elapsed = if scaled.is_finite() {
            scaled.clamp(0.0, MAX_FRAME_ELAPSED)
        } else {
            0.0
        };

        self.accumulator += elapsed;
        let mut steps = 0;
        while self.accumulator >= substep {
            self.accumulator -= substep;
            if let Err(e) = self.step_with(substep) {
                self.accumulator = 0.0;
                return Err(e);
            }
            steps += 1;
        }
        Ok(steps)
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world, self.seed(), &self.events)
    }
}
