//! The player's ship
//!
//! Stats come from the [`GamePreset`]; power-ups push them around for a while
//! and are undone with the exact deltas they applied.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::entity::{AimMode, Body, BorderPolicy, MotionMode, Movable, Rotator, ShootMode, Shooter};
use super::hit::{HitEvent, HitModel, Reaction};
use super::states::GameState;
use crate::consts::*;
use crate::tuning::{GamePreset, PowerUpEffect};

/// What an applied power-up actually changed, so the revert is exact even
/// when clamps cut the requested boost short
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPowerUp {
    pub effect: PowerUpEffect,
    pub scatter_delta: f32,
    pub time_scale_delta: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub active: bool,
    /// False during the post-hit blink window
    pub attackable: bool,
    pub movable: Movable,
    pub rotator: Rotator,
    pub shooter: Shooter,
    pub hit: HitModel,
}

impl Player {
    /// Hidden player at the origin, wired to its own hit events
    pub fn new(preset: &GamePreset) -> Self {
        let mut hit = HitModel::new(preset.player_lives);
        hit.subscribe(HitEvent::LivesReduced, Reaction::PlayerHit);
        hit.subscribe(HitEvent::LivesZero, Reaction::EnterState(GameState::GameOver));

        let mut player = Self {
            body: Body::new(PLAYER_RADIUS),
            active: false,
            attackable: true,
            movable: Movable::new(preset.motion_speed, MotionMode::InputBased, BorderPolicy::Wrap, 0.0),
            rotator: Rotator {
                speed: preset.rotation_speed,
                aim: AimMode::Cursor,
            },
            shooter: Shooter {
                damage: preset.projectile_damage,
                delay: preset.shoot_delay,
                projectile_speed: preset.projectile_speed,
                projectile_lifetime: preset.projectile_lifetime,
                scatter: preset.shoot_scatter,
                mode: ShootMode::InputBased,
                last_shot: 0.0,
            },
            hit,
        };
        player.body.shape.mesh = crate::renderer::MeshType::Triangle;
        player.body.shape.vertices = 3;
        player
    }

    /// Restore every tunable (and the global time scale) to the preset
    pub fn reset_stats(&mut self, preset: &GamePreset, clock: &mut Clock) {
        self.attackable = true;
        self.hit.max_lives = preset.player_lives;
        self.movable.speed = preset.motion_speed;
        self.rotator.speed = preset.rotation_speed;
        self.shooter.scatter = preset.shoot_scatter;
        self.shooter.projectile_lifetime = preset.projectile_lifetime;
        self.shooter.delay = preset.shoot_delay;
        clock.time_scale = preset.time_scale;
    }

    /// Move back to the origin, at rest
    pub fn recenter(&mut self) {
        self.body.pos = Vec2::ZERO;
        self.body.vel = Vec2::ZERO;
    }

    /// Apply `effect` additively and report what changed
    pub fn apply_power_up(&mut self, effect: &PowerUpEffect, clock: &mut Clock) -> AppliedPowerUp {
        self.movable.speed += effect.motion_speed_boost;
        self.rotator.speed += effect.rotation_speed_boost;

        let start_scatter = self.shooter.scatter;
        self.shooter.scatter = (start_scatter - effect.shoot_accuracy_boost).clamp(0.0, MAX_SCATTER);
        let scatter_delta = start_scatter - self.shooter.scatter;

        self.shooter.projectile_lifetime += effect.projectile_lifetime_boost;
        self.shooter.delay -= effect.shoot_frequency_boost;

        let start_scale = clock.time_scale;
        clock.time_scale = (start_scale - effect.time_scale_boost).clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
        let time_scale_delta = start_scale - clock.time_scale;

        AppliedPowerUp {
            effect: effect.clone(),
            scatter_delta,
            time_scale_delta,
        }
    }

    /// Undo an applied power-up. Speeds never drop below the preset baseline.
    pub fn revert_power_up(&mut self, applied: &AppliedPowerUp, preset: &GamePreset, clock: &mut Clock) {
        let effect = &applied.effect;
        self.movable.speed = (self.movable.speed - effect.motion_speed_boost).max(preset.motion_speed);
        self.rotator.speed = (self.rotator.speed - effect.rotation_speed_boost).max(preset.rotation_speed);
        self.shooter.scatter += applied.scatter_delta;
        self.shooter.projectile_lifetime -= effect.projectile_lifetime_boost;
        self.shooter.delay += effect.shoot_frequency_boost;
        clock.time_scale += applied.time_scale_delta;
    }

    /// Collider off for the blink window
    pub fn begin_blink(&mut self) {
        self.attackable = false;
        self.body.collider_enabled = false;
    }

    /// Visible, collidable and attackable again
    pub fn end_blink(&mut self) {
        self.body.visible = true;
        self.body.collider_enabled = true;
        self.attackable = true;
    }

    pub fn collidable(&self) -> bool {
        self.active && self.attackable && self.body.collider_enabled
    }
}
