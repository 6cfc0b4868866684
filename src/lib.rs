//! Asteroids - a fixed-tick arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machine, pools, spawner, hazards)
//! - `tuning`: Data-driven game balance (presets, power-up effects)
//! - `highscores`: Persistent best-score storage
//! - `ui`: HUD notification seam
//! - `renderer`: Visual representation seam
//! - `error`: Configuration errors

pub mod error;
pub mod highscores;
pub mod renderer;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::ConfigError;
pub use highscores::{HighScores, ScoreStore};
pub use tuning::{GameConfig, GamePreset, PowerUpEffect};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Physics step the impulse model assumes (force applied over one step, unit mass)
    pub const IMPULSE_STEP: f32 = 0.02;

    /// Player collider radius
    pub const PLAYER_RADIUS: f32 = 0.5;
    /// Projectile collider radius
    pub const PROJECTILE_RADIUS: f32 = 0.1;
    /// Enemy collider radius
    pub const ENEMY_RADIUS: f32 = 0.6;
    /// Power-up visual radius (pickup uses the configured range instead)
    pub const POWER_UP_RADIUS: f32 = 0.4;

    /// Player blink toggle period while invulnerable after a hit
    pub const BLINK_PERIOD: f64 = 0.1;
    /// How long a HUD message stays visible
    pub const MESSAGE_DURATION: f64 = 2.0;

    /// Power-up time-scale clamp
    pub const MIN_TIME_SCALE: f32 = 0.3;
    pub const MAX_TIME_SCALE: f32 = 2.0;
    /// Shot scatter clamp (degrees)
    pub const MAX_SCATTER: f32 = 360.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Ease `from` toward `to` along the shortest arc by factor `t` (clamped to [0, 1])
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = normalize_angle(to - from);
    normalize_angle(from + delta * t.clamp(0.0, 1.0))
}

/// Unit vector pointing along `heading`
#[inline]
pub fn forward(heading: f32) -> Vec2 {
    Vec2::from_angle(heading)
}

/// Heading (radians) that looks from `from` toward `to`
#[inline]
pub fn heading_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Random unit vector
pub fn random_direction(rng: &mut impl Rng) -> Vec2 {
    Vec2::from_angle(rng.random::<f32>() * std::f32::consts::TAU)
}

/// Random point inside the unit circle (uniform by area)
pub fn random_in_unit_circle(rng: &mut impl Rng) -> Vec2 {
    random_direction(rng) * rng.random::<f32>().sqrt()
}

/// Uniform draw in `[lo, hi)`; returns `lo` for an empty range instead of panicking
#[inline]
pub fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}
