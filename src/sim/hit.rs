//! Lives and damage bookkeeping
//!
//! A [`HitModel`] owns its subscriber lists. Handlers are data
//! ([`Reaction`]s) that the world dispatches against the entity that fired
//! them, so recycling a pool slot carries no closure over stale state.
//!
//! Subscriptions survive [`HitModel::reset_lives`]. An owner that re-wires a
//! reused instance must call [`HitModel::clear_on_zero`] first, otherwise
//! handlers stack up and fire once per subscription.

use serde::{Deserialize, Serialize};

use super::pool::PoolKind;
use super::states::GameState;

/// Events a hit model raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitEvent {
    LivesReduced,
    LivesZero,
}

/// Handler run by the world on behalf of the emitting entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reaction {
    AddScore(u64),
    /// Spawn an effect from the given pool at the emitter's position
    SpawnEffect(PoolKind),
    /// Rock break-up: effect, fracture when allowed, deactivate
    Explode,
    /// Return the emitter to its pool
    Deactivate,
    /// Player lost a life: effect, HUD, stat reset, blink
    PlayerHit,
    /// Ask the state machine for a transition
    EnterState(GameState),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitModel {
    pub max_lives: u32,
    lives: u32,
    zero_fired: bool,
    on_reduced: Vec<Reaction>,
    on_zero: Vec<Reaction>,
}

impl HitModel {
    pub fn new(max_lives: u32) -> Self {
        Self {
            max_lives,
            lives: max_lives,
            zero_fired: false,
            on_reduced: Vec::new(),
            on_zero: Vec::new(),
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn subscribe(&mut self, event: HitEvent, reaction: Reaction) {
        match event {
            HitEvent::LivesReduced => self.on_reduced.push(reaction),
            HitEvent::LivesZero => self.on_zero.push(reaction),
        }
    }

    /// Drop every zero-lives handler
    pub fn clear_on_zero(&mut self) {
        self.on_zero.clear();
    }

    pub fn zero_subscribers(&self) -> usize {
        self.on_zero.len()
    }

    /// Restore lives to max and re-arm the zero-lives event
    pub fn reset_lives(&mut self) {
        self.lives = self.max_lives;
        self.zero_fired = false;
    }

    /// Take damage and return the handlers that fired, in order:
    /// every lives-reduced handler, then (once per life-cycle) the zero ones
    pub fn reduce_lives(&mut self, amount: u32) -> Vec<Reaction> {
        self.lives = self.lives.saturating_sub(amount);

        let mut fired = self.on_reduced.clone();
        if self.lives == 0 && !self.zero_fired {
            self.zero_fired = true;
            fired.extend(self.on_zero.iter().cloned());
        }
        fired
    }
}
