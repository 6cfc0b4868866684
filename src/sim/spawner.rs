//! Hazard spawner
//!
//! Decides when something should enter the field and which kind. Placing and
//! wiring the instance is the world's job.

use rand::Rng;

use super::pool::PoolKind;
use crate::tuning::{SpawnItemConfig, SpawnerTuning};

#[derive(Debug, Clone)]
pub struct Spawner {
    /// Spawning and ramping only run while enabled
    pub enabled: bool,
    /// Seconds between spawns; set externally on reset
    pub interval: f32,
    pub items: Vec<SpawnItemConfig>,
    pub min_interval: f32,
    pub ramp_delta: f32,
    pub ramp_interval: f32,
    pub border_offset: f32,
    last_spawn: f64,
    last_ramp: f64,
}

impl Spawner {
    pub fn new(tuning: &SpawnerTuning, start_interval: f32) -> Self {
        Self {
            enabled: false,
            interval: start_interval,
            items: tuning.items.clone(),
            min_interval: tuning.min_interval,
            ramp_delta: tuning.ramp_delta,
            ramp_interval: tuning.ramp_interval,
            border_offset: tuning.border_offset,
            last_spawn: 0.0,
            last_ramp: 0.0,
        }
    }

    /// Weighted lottery over the enabled items.
    ///
    /// Each enabled item scores `r * weight` with a fresh `r` in [0, 1); the
    /// strictly highest score wins, so ties keep the first item seen and a
    /// zero score never wins.
    pub fn pick(&self, rng: &mut impl Rng) -> Option<PoolKind> {
        let mut best: Option<(PoolKind, f32)> = None;
        for item in self.items.iter().filter(|i| i.enabled) {
            let score = rng.random::<f32>() * item.weight;
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((item.kind, score));
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// True when a spawn is due at `now`; claims the slot either way the
    /// lottery goes
    pub fn spawn_due(&mut self, now: f64) -> bool {
        if now >= self.last_spawn + self.interval as f64 {
            self.last_spawn = now;
            true
        } else {
            false
        }
    }

    /// Shorten the interval by one ramp step when the ramp period has
    /// elapsed, never below the floor
    pub fn ramp(&mut self, now: f64) {
        if now >= self.last_ramp + self.ramp_interval as f64 {
            self.last_ramp = now;
            self.interval = (self.interval - self.ramp_delta).max(self.min_interval);
        }
    }

    /// Restart both cadences from `now`
    pub fn reset_timers(&mut self, now: f64) {
        self.last_spawn = now;
        self.last_ramp = now;
    }
}
