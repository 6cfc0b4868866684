//! Everything the game states operate on
//!
//! The world owns the clock, RNG, pools, player, spawner and timers, plus
//! the three outside collaborators (HUD, renderer, score store). Game states
//! and hit reactions mutate it; nothing here knows which state is active.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::border::Borders;
use super::clock::Clock;
use super::collision::{Contact, find_contacts};
use super::entity::{AimMode, Behavior, BorderOutcome, EntityId, Target};
use super::hit::Reaction;
use super::player::Player;
use super::pool::{PoolKind, Pools};
use super::spawner::Spawner;
use super::states::GameState;
use super::timers::{Continuation, Scheduler, TimerOwner};
use crate::consts::*;
use crate::highscores::{HighScores, ScoreStore};
use crate::renderer::{NullRenderer, Renderer};
use crate::tuning::GameConfig;
use crate::ui::{HeadlessHud, Hud};
use crate::uniform;

/// Outside collaborators the core notifies
pub struct Collaborators {
    pub hud: Box<dyn Hud>,
    pub renderer: Box<dyn Renderer>,
    pub scores: Box<dyn ScoreStore>,
}

impl Collaborators {
    /// Log-only HUD, no renderer, in-memory scores
    pub fn headless() -> Self {
        Self {
            hud: Box::new(HeadlessHud::default()),
            renderer: Box::new(NullRenderer),
            scores: Box::new(HighScores::new()),
        }
    }
}

/// Subscribers to the full game reset, notified in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetListener {
    Score,
    SpawnerTimers,
    PlayerStats,
    PlayerLives,
}

const RESET_ORDER: [ResetListener; 4] = [
    ResetListener::Score,
    ResetListener::SpawnerTimers,
    ResetListener::PlayerStats,
    ResetListener::PlayerLives,
];

pub struct World {
    /// Read-only at runtime
    pub config: GameConfig,
    pub clock: Clock,
    pub borders: Borders,
    pub pools: Pools,
    pub player: Player,
    pub spawner: Spawner,
    pub timers: Scheduler,
    pub score: u64,
    pub(crate) rng: Pcg32,
    requested_state: Option<GameState>,
    hud: Box<dyn Hud>,
    renderer: Box<dyn Renderer>,
    scores: Box<dyn ScoreStore>,
}

impl World {
    pub fn new(config: GameConfig, seed: u64, collaborators: Collaborators) -> Self {
        let Collaborators {
            hud,
            renderer,
            scores,
        } = collaborators;

        let mut world = Self {
            clock: Clock::new(config.preset.time_scale),
            borders: Borders::from_config(&config.borders),
            pools: Pools::from_config(&config),
            player: Player::new(&config.preset),
            spawner: Spawner::new(&config.spawner, config.preset.start_spawn_interval),
            timers: Scheduler::new(),
            score: 0,
            rng: Pcg32::seed_from_u64(seed),
            requested_state: None,
            hud,
            renderer,
            scores,
            config,
        };
        world
            .renderer
            .rebuild_visual(Target::Player, &world.player.body.shape);
        world
    }

    /// World with headless collaborators
    pub fn headless(config: GameConfig, seed: u64) -> Self {
        Self::new(config, seed, Collaborators::headless())
    }

    /// Scaled game time
    pub fn now(&self) -> f64 {
        self.clock.time
    }

    // ── Collaborator notifications ──────────────────────────────────────────

    pub fn show_panel(&mut self, state: GameState) {
        self.hud.toggle_panel(state);
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
        self.hud.display_score(0);
    }

    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
        self.hud.display_score(self.score);
    }

    /// Show `text` for [`MESSAGE_DURATION`], replacing any current message
    pub fn show_message(&mut self, text: &str) {
        self.timers.cancel_owner(TimerOwner::HudMessage);
        self.hud.display_message(text);
        let now = self.now();
        self.timers
            .schedule(TimerOwner::HudMessage, now, MESSAGE_DURATION, Continuation::HideMessage);
    }

    pub fn hide_message(&mut self) {
        self.timers.cancel_owner(TimerOwner::HudMessage);
        self.hud.hide_message();
    }

    /// Record the score with the store and show the final tally
    pub fn display_game_over_stats(&mut self) {
        self.scores.record_score_if_higher(self.score);
        let best = self.scores.highest_score();
        self.hud.display_game_over(self.score, best);
    }

    // ── Player ──────────────────────────────────────────────────────────────

    pub fn show_player(&mut self) {
        self.player.active = true;
        self.player.body.visible = true;
        self.renderer.set_visible(Target::Player, true);
    }

    /// Take the ship off the field, dropping any blink in progress
    pub fn hide_player(&mut self) {
        self.timers.cancel_owner(TimerOwner::PlayerBlink);
        self.player.end_blink();
        self.player.active = false;
        self.player.body.visible = false;
        self.renderer.set_visible(Target::Player, false);
    }

    /// Preset stats and time scale; pending power-up reverts are dropped
    pub fn reset_player_stats(&mut self) {
        self.timers.cancel_owner(TimerOwner::PlayerEffects);
        self.player.reset_stats(&self.config.preset, &mut self.clock);
    }

    pub fn reset_player_lives(&mut self) {
        self.player.hit.reset_lives();
        self.hud.display_lives(self.player.hit.lives());
    }

    /// A life was lost but the ship carries on
    fn player_hit(&mut self) {
        let pos = self.player.body.pos;
        self.spawn_effect(PoolKind::PlayerExplosions, pos);
        self.hud.display_lives(self.player.hit.lives());
        log::debug!("Player hit, {} lives left", self.player.hit.lives());

        self.reset_player_stats();
        self.player.recenter();
        self.start_blink();
    }

    fn start_blink(&mut self) {
        self.timers.cancel_owner(TimerOwner::PlayerBlink);
        self.player.begin_blink();
        let until = self.now() + self.config.preset.player_reset_time as f64;
        self.blink_step(until);
    }

    fn blink_step(&mut self, until: f64) {
        let now = self.now();
        if now < until {
            self.player.body.visible = !self.player.body.visible;
            self.renderer
                .set_visible(Target::Player, self.player.body.visible);
            self.timers.schedule(
                TimerOwner::PlayerBlink,
                now,
                BLINK_PERIOD,
                Continuation::BlinkStep { until },
            );
        } else {
            self.player.end_blink();
            self.renderer.set_visible(Target::Player, true);
        }
    }

    // ── Pools ───────────────────────────────────────────────────────────────

    /// Return an instance to its pool and drop its timers
    pub fn deactivate(&mut self, id: EntityId) {
        if !self.pools.is_active(id) {
            return;
        }
        self.pools.release(id);
        self.timers.cancel_owner(TimerOwner::Entity(id));
        self.renderer.set_visible(Target::Entity(id), false);
    }

    /// Deactivate every pooled instance
    pub fn release_all_pools(&mut self) {
        self.timers.cancel_entities();
        for id in self.pools.active_ids() {
            self.renderer.set_visible(Target::Entity(id), false);
        }
        self.pools.release_all();
    }

    /// Start a border-immunity window unless one is already running
    pub(crate) fn begin_border_immunity(&mut self, id: EntityId, seconds: f32) {
        let started = self
            .pools
            .get_mut(id)
            .and_then(|e| e.movable.as_mut())
            .is_some_and(|m| m.begin_immunity());
        if started {
            let now = self.now();
            self.timers.schedule(
                TimerOwner::Entity(id),
                now,
                seconds as f64,
                Continuation::EndBorderImmunity,
            );
        }
    }

    /// Short-lived visual effect at `pos`
    pub fn spawn_effect(&mut self, kind: PoolKind, pos: Vec2) {
        let id = match self.pools.acquire(kind) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Cannot spawn effect: {}", e);
                return;
            }
        };
        if let Some(effect) = self.pools.get_mut(id) {
            effect.body.pos = pos;
        }
        self.renderer.set_visible(Target::Entity(id), true);
        let now = self.now();
        self.timers.schedule(
            TimerOwner::Entity(id),
            now,
            self.config.hazards.explosion_lifetime as f64,
            Continuation::Deactivate,
        );
    }

    pub(super) fn renderer_show(&mut self, id: EntityId) {
        self.renderer.set_visible(Target::Entity(id), true);
    }

    pub(super) fn renderer_rebuild(&mut self, id: EntityId, shape: &crate::renderer::Shape) {
        self.renderer.rebuild_visual(Target::Entity(id), shape);
    }

    fn position_of(&self, target: Target) -> Option<Vec2> {
        match target {
            Target::Player => Some(self.player.body.pos),
            Target::Entity(id) => self.pools.get(id).map(|e| e.body.pos),
        }
    }

    // ── State requests and reset bus ────────────────────────────────────────

    /// Ask for a transition; applied by the game at the end of the tick
    pub fn request_state(&mut self, state: GameState) {
        self.requested_state = Some(state);
    }

    pub fn take_requested_state(&mut self) -> Option<GameState> {
        self.requested_state.take()
    }

    /// Tell every reset listener, in registration order
    pub fn broadcast_reset(&mut self) {
        log::debug!("Broadcasting game reset");
        for listener in RESET_ORDER {
            match listener {
                ResetListener::Score => self.reset_score(),
                ResetListener::SpawnerTimers => {
                    let now = self.now();
                    self.spawner.reset_timers(now);
                }
                ResetListener::PlayerStats => self.reset_player_stats(),
                ResetListener::PlayerLives => self.reset_player_lives(),
            }
        }
    }

    // ── Per-tick phases ─────────────────────────────────────────────────────

    /// Run every continuation that has come due
    pub fn run_timers(&mut self) {
        for (owner, action) in self.timers.take_due(self.clock.time) {
            match (owner, action) {
                (TimerOwner::Entity(id), Continuation::EndBorderImmunity) => {
                    if let Some(movable) = self.pools.get_mut(id).and_then(|e| e.movable.as_mut()) {
                        movable.immune = false;
                    }
                }
                (TimerOwner::Entity(id), Continuation::Deactivate) => self.deactivate(id),
                (_, Continuation::RevertPowerUp(applied)) => {
                    log::debug!("{} wore off", applied.effect.name);
                    self.player
                        .revert_power_up(&applied, &self.config.preset, &mut self.clock);
                }
                (_, Continuation::BlinkStep { until }) => self.blink_step(until),
                (_, Continuation::HideMessage) => self.hud.hide_message(),
                (owner, action) => log::warn!("Ignoring {:?} for {:?}", action, owner),
            }
        }
    }

    /// Steer, move and fire the ship
    pub fn update_player(&mut self, dt: f32, thrust: bool, fire: bool, cursor: Vec2) {
        if !self.player.active {
            return;
        }
        let now = self.now();
        let player = &mut self.player;
        player.rotator.step(&mut player.body, cursor, dt);
        player.movable.step(&mut player.body, dt, thrust);
        player.movable.border_control(&mut player.body, &self.borders);

        if player.shooter.wants_fire(fire) && player.shooter.try_fire(now) {
            self.fire(Target::Player);
        }
    }

    /// Steer, move, border-check and fire every active pooled instance
    pub fn update_entities(&mut self, dt: f32, cursor: Vec2) {
        let now = self.now();
        let borders = self.borders;
        let player_pos = self.player.collidable().then_some(self.player.body.pos);

        for id in self.pools.active_ids() {
            let Some(entity) = self.pools.get_mut(id).filter(|e| e.active) else {
                continue;
            };

            if let Some(rotator) = &entity.rotator {
                let aim = match rotator.aim {
                    AimMode::Cursor => Some(cursor),
                    AimMode::Player => player_pos,
                };
                if let Some(aim) = aim {
                    rotator.step(&mut entity.body, aim, dt);
                }
            }

            let mut outcome = BorderOutcome::Inside;
            if let Some(movable) = &entity.movable {
                movable.step(&mut entity.body, dt, false);
                outcome = movable.border_control(&mut entity.body, &borders);
            }

            let fires = entity
                .shooter
                .as_mut()
                .is_some_and(|s| s.wants_fire(false) && s.try_fire(now));

            if outcome == BorderOutcome::Exited {
                self.deactivate(id);
            } else if fires {
                self.fire(Target::Entity(id));
            }
        }
    }

    /// Spawn one projectile from `owner`'s shooter
    fn fire(&mut self, owner: Target) {
        let source = match owner {
            Target::Player => Some((
                self.player.body.pos,
                self.player.body.heading,
                self.player.shooter.clone(),
            )),
            Target::Entity(id) => self
                .pools
                .get(id)
                .and_then(|e| e.shooter.clone().map(|s| (e.body.pos, e.body.heading, s))),
        };
        let Some((pos, heading, shooter)) = source else {
            return;
        };

        let id = match self.pools.acquire(PoolKind::Projectiles) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Cannot fire: {}", e);
                return;
            }
        };
        let spread = uniform(&mut self.rng, -shooter.scatter, shooter.scatter).to_radians();

        if let Some(shot) = self.pools.get_mut(id) {
            shot.body.pos = pos;
            shot.body.heading = heading + spread;
            if let Some(movable) = shot.movable.as_mut() {
                movable.speed = shooter.projectile_speed;
            }
            shot.behavior = Behavior::Projectile {
                owner,
                damage: shooter.damage,
            };
        }
        self.renderer.set_visible(Target::Entity(id), true);

        let now = self.now();
        self.timers.schedule(
            TimerOwner::Entity(id),
            now,
            shooter.projectile_lifetime as f64,
            Continuation::Deactivate,
        );
    }

    /// Spawn a hazard when the spawner's cadence says so, then ramp
    pub fn update_spawner(&mut self) {
        if !self.spawner.enabled {
            return;
        }
        let now = self.now();
        if self.spawner.spawn_due(now) {
            match self.spawner.pick(&mut self.rng) {
                Some(kind) => self.spawn_hazard(kind),
                None => log::warn!("Failed to pick a kind to spawn"),
            }
        }
        self.spawner.ramp(now);
    }

    /// Apply damage for every contact found this tick
    pub fn resolve_collisions(&mut self) {
        for contact in find_contacts(&self.player, &self.pools) {
            match contact {
                Contact::Projectile { projectile, victim } => {
                    let damage = match self.pools.get(projectile) {
                        Some(shot) if shot.active => match shot.behavior {
                            Behavior::Projectile { damage, .. } => damage,
                            _ => continue,
                        },
                        _ => continue,
                    };
                    if self.damage(victim, damage) {
                        self.deactivate(projectile);
                    }
                }
                Contact::Ram { hazard } => {
                    let hazard_live = self.pools.get(hazard).is_some_and(|e| e.collidable());
                    if !hazard_live || !self.player.collidable() {
                        continue;
                    }
                    let amount = self.config.hazards.contact_damage;
                    self.damage(Target::Player, amount);
                    self.damage(Target::Entity(hazard), amount);
                }
            }
        }
    }

    /// Reduce `target`'s lives and run what fires. False if it could not be hit.
    fn damage(&mut self, target: Target, amount: u32) -> bool {
        let reactions = match target {
            Target::Player if self.player.collidable() => self.player.hit.reduce_lives(amount),
            Target::Player => return false,
            Target::Entity(id) => match self.pools.get_mut(id) {
                Some(entity) if entity.collidable() => match entity.hit.as_mut() {
                    Some(hit) => hit.reduce_lives(amount),
                    None => return false,
                },
                _ => return false,
            },
        };
        self.dispatch(target, reactions);
        true
    }

    /// Run hit reactions on behalf of `source`
    pub fn dispatch(&mut self, source: Target, reactions: Vec<Reaction>) {
        for reaction in reactions {
            match reaction {
                Reaction::AddScore(amount) => self.add_score(amount),
                Reaction::SpawnEffect(kind) => {
                    if let Some(pos) = self.position_of(source) {
                        self.spawn_effect(kind, pos);
                    }
                }
                Reaction::Explode => match source {
                    Target::Entity(id) => self.explode_rock(id),
                    Target::Player => log::warn!("The player cannot explode like a rock"),
                },
                Reaction::Deactivate => match source {
                    Target::Entity(id) => self.deactivate(id),
                    Target::Player => self.hide_player(),
                },
                Reaction::PlayerHit => self.player_hit(),
                Reaction::EnterState(state) => self.request_state(state),
            }
        }
    }
}
