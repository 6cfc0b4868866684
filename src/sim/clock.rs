//! Frame clock and fixed-step accumulator

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Scaled game time. Every timer and the spawner read `time`, so a time
/// scale of zero freezes them along with movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    /// Scaled seconds since start
    pub time: f64,
    /// Real seconds since start
    pub unscaled_time: f64,
    pub time_scale: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Clock {
    pub fn new(time_scale: f32) -> Self {
        Self {
            time: 0.0,
            unscaled_time: 0.0,
            time_scale,
        }
    }

    /// Advance by one real step, returning the scaled delta
    pub fn advance(&mut self, dt: f32) -> f32 {
        let scaled = dt * self.time_scale;
        self.unscaled_time += dt as f64;
        self.time += scaled as f64;
        scaled
    }
}

/// Converts variable frame deltas into whole simulation steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// Feed a frame delta and return how many `SIM_DT` ticks to run
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }
}
