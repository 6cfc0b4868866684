//! Pooled entities and their optional capabilities
//!
//! Every entity declares at creation which behaviours it carries (movable,
//! rotatable, shooter, hittable). Wiring code checks for the capability and
//! skips entities that lack it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::border::Borders;
use super::hit::HitModel;
use super::pool::PoolKind;
use crate::consts::*;
use crate::renderer::Shape;
use crate::tuning::{GameConfig, PowerUpEffect};
use crate::{forward, heading_to, lerp_angle};

/// Identity of a pooled instance: its pool, slot and how many times the
/// slot has been acquired. An id from an earlier acquisition no longer
/// resolves once the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub kind: PoolKind,
    pub slot: usize,
    pub generation: u32,
}

impl EntityId {
    pub fn new(kind: PoolKind, slot: usize) -> Self {
        Self {
            kind,
            slot,
            generation: 0,
        }
    }
}

/// Anything that can own a projectile, take damage or be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player,
    Entity(EntityId),
}

/// Transform and visual state shared by the player and pooled entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Drift velocity (impulses accumulate here)
    pub vel: Vec2,
    /// Facing, radians
    pub heading: f32,
    /// Collider radius
    pub radius: f32,
    pub visible: bool,
    pub collider_enabled: bool,
    pub shape: Shape,
}

impl Body {
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            heading: std::f32::consts::FRAC_PI_2,
            radius,
            visible: true,
            collider_enabled: true,
            shape: Shape::circle(radius, 10, 0.0),
        }
    }
}

/// What happens when a movable leaves the border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderPolicy {
    /// Return to the pool
    Despawn,
    /// Reappear on the opposite side
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Always move forward at `speed`
    Automatic,
    /// Move forward while thrust is held
    InputBased,
    /// Drift on velocity only
    None,
}

/// Result of a border check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderOutcome {
    Inside,
    Wrapped,
    Exited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movable {
    pub speed: f32,
    pub mode: MotionMode,
    pub border_policy: BorderPolicy,
    pub border_offset: f32,
    /// Border rules suspended (timed window)
    pub immune: bool,
}

impl Movable {
    pub fn new(speed: f32, mode: MotionMode, border_policy: BorderPolicy, border_offset: f32) -> Self {
        Self {
            speed,
            mode,
            border_policy,
            border_offset,
            immune: false,
        }
    }

    /// Start an immunity window. Returns false when one is already running,
    /// in which case the caller must not schedule another end.
    pub fn begin_immunity(&mut self) -> bool {
        if self.immune {
            return false;
        }
        self.immune = true;
        true
    }

    /// Integrate drift plus forward motion for one tick
    pub fn step(&self, body: &mut Body, dt: f32, thrust: bool) {
        let moving = match self.mode {
            MotionMode::Automatic => true,
            MotionMode::InputBased => thrust,
            MotionMode::None => false,
        };
        if moving {
            body.pos += forward(body.heading) * self.speed * dt;
        }
        body.pos += body.vel * dt;
    }

    /// Apply the border policy (no-op while immune)
    pub fn border_control(&self, body: &mut Body, borders: &Borders) -> BorderOutcome {
        if self.immune || borders.within(body.pos, self.border_offset) {
            return BorderOutcome::Inside;
        }
        match self.border_policy {
            BorderPolicy::Despawn => BorderOutcome::Exited,
            BorderPolicy::Wrap => {
                body.pos = borders.opposite_position(body.pos, self.border_offset);
                BorderOutcome::Wrapped
            }
        }
    }

    /// Impulse toward `target`, proportional to distance and speed
    pub fn push_toward(&self, body: &mut Body, target: Vec2) {
        body.vel += (target - body.pos) * self.speed * IMPULSE_STEP;
    }
}

/// What a rotator turns toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimMode {
    Cursor,
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub speed: f32,
    pub aim: AimMode,
}

impl Rotator {
    /// Ease the heading toward `target`
    pub fn step(&self, body: &mut Body, target: Vec2, dt: f32) {
        if target == body.pos {
            return;
        }
        let desired = heading_to(body.pos, target);
        body.heading = lerp_angle(body.heading, desired, dt * self.speed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShootMode {
    Automatic,
    InputBased,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shooter {
    pub damage: u32,
    /// Seconds between shots
    pub delay: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    /// Degrees either side of the heading
    pub scatter: f32,
    pub mode: ShootMode,
    pub last_shot: f64,
}

impl Shooter {
    /// Claim a shot if the delay has elapsed
    pub fn try_fire(&mut self, now: f64) -> bool {
        if now >= self.last_shot + self.delay as f64 {
            self.last_shot = now;
            true
        } else {
            false
        }
    }

    pub fn wants_fire(&self, fire_held: bool) -> bool {
        match self.mode {
            ShootMode::Automatic => true,
            ShootMode::InputBased => fire_held,
        }
    }
}

/// Fracture bookkeeping for rocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockState {
    /// Share of the original rock's size this piece still represents
    pub proportion_left: f32,
    pub can_explode: bool,
}

/// Kind-specific behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Rock(RockState),
    Enemy,
    PowerUp { effect: Option<PowerUpEffect> },
    Projectile { owner: Target, damage: u32 },
    Explosion,
}

/// A pooled instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub active: bool,
    pub body: Body,
    pub movable: Option<Movable>,
    pub rotator: Option<Rotator>,
    pub shooter: Option<Shooter>,
    pub hit: Option<HitModel>,
    pub behavior: Behavior,
}

impl Entity {
    /// Fresh, inactive instance of `kind` configured from `config`
    pub fn prefab(id: EntityId, config: &GameConfig) -> Self {
        let h = &config.hazards;
        let mut entity = Self {
            id,
            active: false,
            body: Body::new(1.0),
            movable: None,
            rotator: None,
            shooter: None,
            hit: None,
            behavior: Behavior::Explosion,
        };

        match id.kind {
            PoolKind::Rocks => {
                entity.body = Body::new(h.rock_base_radius);
                entity.movable = Some(Movable::new(
                    h.rock_speed,
                    MotionMode::None,
                    BorderPolicy::Wrap,
                    h.hazard_border_offset,
                ));
                entity.hit = Some(HitModel::new(1));
                entity.behavior = Behavior::Rock(RockState {
                    proportion_left: 1.0,
                    can_explode: true,
                });
            }
            PoolKind::Enemies => {
                entity.body = Body::new(ENEMY_RADIUS);
                entity.movable = Some(Movable::new(
                    h.enemy_speed,
                    MotionMode::Automatic,
                    BorderPolicy::Wrap,
                    h.hazard_border_offset,
                ));
                entity.rotator = Some(Rotator {
                    speed: h.enemy_rotation_speed,
                    aim: AimMode::Player,
                });
                entity.shooter = Some(Shooter {
                    damage: config.preset.projectile_damage,
                    delay: h.enemy_shoot_delay,
                    projectile_speed: config.preset.projectile_speed * 0.5,
                    projectile_lifetime: config.preset.projectile_lifetime * 2.0,
                    scatter: h.enemy_shoot_scatter,
                    mode: ShootMode::Automatic,
                    last_shot: 0.0,
                });
                entity.hit = Some(HitModel::new(h.enemy_lives));
                entity.behavior = Behavior::Enemy;
            }
            PoolKind::PowerUps => {
                entity.body = Body::new(POWER_UP_RADIUS);
                entity.movable = Some(Movable::new(
                    h.power_up_speed,
                    MotionMode::None,
                    BorderPolicy::Despawn,
                    h.hazard_border_offset,
                ));
                entity.behavior = Behavior::PowerUp { effect: None };
            }
            PoolKind::Projectiles => {
                entity.body = Body::new(PROJECTILE_RADIUS);
                entity.movable = Some(Movable::new(
                    config.preset.projectile_speed,
                    MotionMode::Automatic,
                    BorderPolicy::Despawn,
                    0.0,
                ));
                entity.behavior = Behavior::Projectile {
                    owner: Target::Player,
                    damage: config.preset.projectile_damage,
                };
            }
            PoolKind::RockExplosions | PoolKind::EnemyExplosions | PoolKind::PlayerExplosions => {
                entity.body.collider_enabled = false;
            }
        }

        entity
    }

    pub fn target(&self) -> Target {
        Target::Entity(self.id)
    }

    /// Can this entity collide right now
    pub fn collidable(&self) -> bool {
        self.active && self.body.collider_enabled
    }
}
