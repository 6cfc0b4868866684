//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool kind, then slot)
//! - No rendering or platform dependencies; those sit behind the
//!   [`crate::ui::Hud`], [`crate::renderer::Renderer`] and
//!   [`crate::highscores::ScoreStore`] seams

pub mod border;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod hazards;
pub mod hit;
pub mod player;
pub mod pool;
pub mod spawner;
pub mod states;
pub mod tick;
pub mod timers;
pub mod world;

pub use border::Borders;
pub use clock::{Clock, FixedStep};
pub use collision::{Contact, circles_overlap, find_contacts};
pub use entity::{
    AimMode, Behavior, Body, BorderOutcome, BorderPolicy, Entity, EntityId, MotionMode, Movable,
    RockState, Rotator, ShootMode, Shooter, Target,
};
pub use hazards::fracture_proportions;
pub use hit::{HitEvent, HitModel, Reaction};
pub use player::{AppliedPowerUp, Player};
pub use pool::{Pool, PoolKind, Pools};
pub use spawner::Spawner;
pub use states::{GameState, StateHandler, StateMachine, StateRequest};
pub use tick::{Game, TickInput};
pub use timers::{Continuation, Scheduler, TimerOwner, TimerToken};
pub use world::{Collaborators, ResetListener, World};
