//! Rocks, enemies and power-ups
//!
//! Per-kind hooks run when the spawner places an instance. Pooled instances
//! come back with whatever subscriptions they had, so each hook clears the
//! zero-lives list before wiring its own handlers.

use glam::Vec2;
use rand::Rng;

use super::entity::{Behavior, EntityId, RockState};
use super::hit::{HitEvent, HitModel, Reaction};
use super::pool::PoolKind;
use super::timers::{Continuation, TimerOwner};
use super::world::World;
use crate::consts::IMPULSE_STEP;
use crate::renderer::Shape;
use crate::tuning::PowerUpEffect;
use crate::{heading_to, random_direction, random_in_unit_circle};

/// Outline noise for rock meshes
const ROCK_JITTER: f32 = 0.3;
const ROCK_VERTICES: u32 = 10;

/// Split `remaining` into `pieces` shares. The first `pieces - 1` are drawn
/// uniformly from what is left; the last takes the remainder, so the shares
/// always sum to `remaining`.
pub fn fracture_proportions(remaining: f32, pieces: u32, rng: &mut impl Rng) -> Vec<f32> {
    let pieces = pieces.max(1) as usize;
    let mut left = remaining;
    let mut shares = Vec::with_capacity(pieces);
    for _ in 1..pieces {
        let share = rng.random::<f32>() * left;
        left -= share;
        shares.push(share);
    }
    shares.push(left);
    shares
}

/// Fresh zero-lives wiring for a rock of either generation
fn arm_rock(hit: &mut HitModel, score: u64) {
    hit.reset_lives();
    hit.clear_on_zero();
    hit.subscribe(HitEvent::LivesZero, Reaction::AddScore(score));
    hit.subscribe(HitEvent::LivesZero, Reaction::Explode);
}

impl World {
    /// Acquire `kind`, place it on the border and run its spawn hook
    pub(crate) fn spawn_hazard(&mut self, kind: PoolKind) {
        let id = match self.pools.acquire(kind) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Cannot spawn {:?}: {}", kind, e);
                return;
            }
        };
        let pos = self
            .borders
            .random_point_on_border(self.spawner.border_offset, &mut self.rng);
        if let Some(entity) = self.pools.get_mut(id) {
            entity.body.pos = pos;
        }
        self.on_spawned(id);
        log::debug!("Spawned {:?} at ({:.1}, {:.1})", id, pos.x, pos.y);
    }

    /// Kind-specific wiring of a freshly acquired instance
    pub(crate) fn on_spawned(&mut self, id: EntityId) {
        match id.kind {
            PoolKind::Rocks => self.rock_spawned(id),
            PoolKind::Enemies => self.enemy_spawned(id),
            PoolKind::PowerUps => self.power_up_spawned(id),
            _ => {}
        }
        if self.pools.is_active(id) {
            self.renderer_show(id);
        }
    }

    /// Point on a circle around the field center that drifting spawns aim for
    fn center_target(&mut self) -> Vec2 {
        self.borders.center()
            + random_direction(&mut self.rng) * self.config.preset.spawned_center_target_offset
    }

    fn rock_spawned(&mut self, id: EntityId) {
        let h = &self.config.hazards;
        let (radius, score, immunity) = (h.rock_base_radius, h.rock_score, h.rock_border_immunity);
        let target = self.center_target();

        let Some(rock) = self.pools.get_mut(id) else {
            return;
        };
        rock.body.radius = radius;
        rock.body.shape = Shape::circle(radius, ROCK_VERTICES, ROCK_JITTER);
        rock.behavior = Behavior::Rock(RockState {
            proportion_left: 1.0,
            can_explode: true,
        });
        if let Some(hit) = rock.hit.as_mut() {
            arm_rock(hit, score);
        }
        if let Some(movable) = &rock.movable {
            movable.push_toward(&mut rock.body, target);
        }
        let shape = rock.body.shape;

        self.renderer_rebuild(id, &shape);
        self.begin_border_immunity(id, immunity);
    }

    fn enemy_spawned(&mut self, id: EntityId) {
        let h = &self.config.hazards;
        let (lives, score, immunity) = (h.enemy_lives, h.enemy_score, h.enemy_border_immunity);
        let now = self.now();
        let aim = if self.player.active {
            self.player.body.pos
        } else {
            self.borders.center()
        };

        let Some(enemy) = self.pools.get_mut(id) else {
            return;
        };
        if enemy.body.pos != aim {
            enemy.body.heading = heading_to(enemy.body.pos, aim);
        }
        if let Some(shooter) = enemy.shooter.as_mut() {
            shooter.last_shot = now;
        }
        if let Some(hit) = enemy.hit.as_mut() {
            hit.max_lives = lives;
            hit.reset_lives();
            hit.clear_on_zero();
            hit.subscribe(HitEvent::LivesZero, Reaction::AddScore(score));
            hit.subscribe(
                HitEvent::LivesZero,
                Reaction::SpawnEffect(PoolKind::EnemyExplosions),
            );
            hit.subscribe(HitEvent::LivesZero, Reaction::Deactivate);
        }

        self.begin_border_immunity(id, immunity);
    }

    fn power_up_spawned(&mut self, id: EntityId) {
        if self.config.power_ups.is_empty() {
            log::warn!("Power-up spawned with no effects configured");
            if let Some(power_up) = self.pools.get_mut(id) {
                power_up.behavior = Behavior::PowerUp { effect: None };
            }
            return;
        }
        let index = self.rng.random_range(0..self.config.power_ups.len());
        let effect = self.config.power_ups[index].clone();
        let immunity = self.config.hazards.power_up_border_immunity;
        let target = self.center_target();

        let Some(power_up) = self.pools.get_mut(id) else {
            return;
        };
        power_up.behavior = Behavior::PowerUp {
            effect: Some(effect),
        };
        if let Some(movable) = &power_up.movable {
            movable.push_toward(&mut power_up.body, target);
        }

        self.begin_border_immunity(id, immunity);
    }

    /// Break a rock: effect, fragments when it may still fracture, then
    /// return it to the pool
    pub(crate) fn explode_rock(&mut self, id: EntityId) {
        let Some(rock) = self.pools.get(id).filter(|e| e.active) else {
            return;
        };
        let origin = rock.body.pos;
        let Behavior::Rock(state) = &rock.behavior else {
            log::warn!("{:?} is not a rock and cannot explode", id);
            return;
        };
        let (proportion, can_explode) = (state.proportion_left, state.can_explode);

        self.spawn_effect(PoolKind::RockExplosions, origin);
        if can_explode {
            let pieces = self.config.hazards.fracture_pieces;
            for share in fracture_proportions(proportion, pieces, &mut self.rng) {
                self.spawn_fragment(origin, share);
            }
        }
        self.deactivate(id);
    }

    /// Place one fracture piece near `origin`. Pieces at or below the
    /// minimum size vanish.
    fn spawn_fragment(&mut self, origin: Vec2, proportion: f32) {
        let h = &self.config.hazards;
        let radius = h.rock_base_radius * proportion;
        if radius <= h.min_rock_size {
            log::trace!("Fragment of radius {:.2} vanished", radius);
            return;
        }
        let can_explode = radius >= h.min_rock_can_explode_size;
        let (score, spread, power) = (h.rock_score, h.fracture_spawn_radius, h.explosion_power);

        let id = match self.pools.acquire(PoolKind::Rocks) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Cannot spawn fragment: {}", e);
                return;
            }
        };
        let offset = random_in_unit_circle(&mut self.rng) * spread;

        let Some(piece) = self.pools.get_mut(id) else {
            return;
        };
        piece.body.pos = origin + offset;
        piece.body.radius = radius;
        piece.body.shape = Shape::circle(radius, ROCK_VERTICES, ROCK_JITTER);
        piece.body.vel += offset * power * IMPULSE_STEP;
        piece.behavior = Behavior::Rock(RockState {
            proportion_left: proportion,
            can_explode,
        });
        if let Some(hit) = piece.hit.as_mut() {
            arm_rock(hit, score);
        }
        let shape = piece.body.shape;

        self.renderer_rebuild(id, &shape);
        self.renderer_show(id);
    }

    /// Hand every power-up within pick range to the player
    pub fn collect_power_ups(&mut self) {
        if !self.player.active {
            return;
        }
        let range = self.config.hazards.power_up_pick_range;
        let player_pos = self.player.body.pos;
        let picked: Vec<(EntityId, Option<PowerUpEffect>)> = match self.pools.pool(PoolKind::PowerUps) {
            Ok(pool) => pool
                .iter()
                .filter(|e| e.active && e.body.pos.distance(player_pos) <= range)
                .map(|e| match &e.behavior {
                    Behavior::PowerUp { effect } => (e.id, effect.clone()),
                    _ => (e.id, None),
                })
                .collect(),
            Err(_) => return,
        };

        for (id, effect) in picked {
            self.deactivate(id);
            if let Some(effect) = effect {
                self.apply_power_up(effect);
            }
        }
    }

    /// Boost the player now and schedule the exact revert
    pub fn apply_power_up(&mut self, effect: PowerUpEffect) {
        log::info!("Picked up {}", effect.name);
        let applied = self.player.apply_power_up(&effect, &mut self.clock);
        let now = self.now();
        self.timers.schedule(
            TimerOwner::PlayerEffects,
            now,
            effect.effect_time as f64,
            Continuation::RevertPowerUp(applied),
        );
        self.show_message(&effect.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::Target;
    use crate::tuning::GameConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world() -> World {
        World::headless(GameConfig::default(), 11)
    }

    fn rock_at(w: &mut World, pos: Vec2) -> EntityId {
        let id = w.pools.acquire(PoolKind::Rocks).unwrap();
        w.pools.get_mut(id).unwrap().body.pos = pos;
        w.on_spawned(id);
        id
    }

    fn rock_state(w: &World, id: EntityId) -> RockState {
        match &w.pools.get(id).unwrap().behavior {
            Behavior::Rock(state) => state.clone(),
            other => panic!("expected a rock, got {other:?}"),
        }
    }

    #[test]
    fn test_single_piece_takes_everything() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(fracture_proportions(0.7, 1, &mut rng), vec![0.7]);
    }

    #[test]
    fn test_rock_spawn_resets_state() {
        let mut w = world();
        let id = rock_at(&mut w, Vec2::new(-20.0, 0.0));
        let rock = w.pools.get(id).unwrap();
        assert_eq!(rock.body.radius, w.config.hazards.rock_base_radius);
        assert!(rock.movable.as_ref().unwrap().immune);
        // Pushed toward the middle of the field
        assert!(rock.body.vel.x > 0.0);
        assert_eq!(rock_state(&w, id), RockState { proportion_left: 1.0, can_explode: true });
    }

    #[test]
    fn test_reused_rock_fires_zero_handlers_once() {
        let mut w = world();
        let id = rock_at(&mut w, Vec2::ZERO);
        w.deactivate(id);
        let again = rock_at(&mut w, Vec2::ZERO);
        assert_eq!(again.slot, id.slot);
        assert_eq!(w.pools.get(again).unwrap().hit.as_ref().unwrap().zero_subscribers(), 2);
    }

    #[test]
    fn test_explosion_conserves_proportion() {
        let mut w = world();
        let id = rock_at(&mut w, Vec2::new(5.0, 5.0));
        w.explode_rock(id);

        assert!(!w.pools.is_active(id));
        assert_eq!(w.pools.pool(PoolKind::RockExplosions).unwrap().active_count(), 1);

        let pieces: Vec<RockState> = w
            .pools
            .active_ids()
            .into_iter()
            .filter(|id| id.kind == PoolKind::Rocks)
            .map(|id| rock_state(&w, id))
            .collect();
        let total: f32 = pieces.iter().map(|p| p.proportion_left).sum();
        assert!(total <= 1.0 + 1e-5);
        for piece in &pieces {
            let radius = w.config.hazards.rock_base_radius * piece.proportion_left;
            assert!(radius > w.config.hazards.min_rock_size);
            assert_eq!(piece.can_explode, radius >= w.config.hazards.min_rock_can_explode_size);
        }
    }

    #[test]
    fn test_small_rock_does_not_fracture() {
        let mut w = world();
        let id = rock_at(&mut w, Vec2::ZERO);
        if let Behavior::Rock(state) = &mut w.pools.get_mut(id).unwrap().behavior {
            state.can_explode = false;
        }
        w.explode_rock(id);
        assert_eq!(w.pools.pool(PoolKind::Rocks).unwrap().active_count(), 0);
        assert_eq!(w.pools.pool(PoolKind::RockExplosions).unwrap().active_count(), 1);
    }

    #[test]
    fn test_shot_rock_scores_and_explodes() {
        let mut w = world();
        let id = rock_at(&mut w, Vec2::new(8.0, 0.0));
        let fired = w.pools.get_mut(id).unwrap().hit.as_mut().unwrap().reduce_lives(1);
        w.dispatch(Target::Entity(id), fired);
        assert_eq!(w.score, w.config.hazards.rock_score);
        assert_eq!(w.pools.pool(PoolKind::RockExplosions).unwrap().active_count(), 1);
    }

    #[test]
    fn test_contacts_skip_reused_slots() {
        let mut w = world();
        w.config.hazards.min_rock_size = 0.0;
        w.show_player();
        let far = rock_at(&mut w, Vec2::new(12.0, 0.0));
        let near = rock_at(&mut w, Vec2::new(0.5, 0.0));
        for pos in [Vec2::new(0.5, 0.0), Vec2::new(12.0, 0.0)] {
            let shot = w.pools.acquire(PoolKind::Projectiles).unwrap();
            let shot = w.pools.get_mut(shot).unwrap();
            shot.body.pos = pos;
            shot.behavior = Behavior::Projectile {
                owner: Target::Player,
                damage: 1,
            };
        }

        w.resolve_collisions();

        // The far rock's first fragment took the near rock's slot, and the
        // ram recorded against the near rock must not reach it
        let reused = w.pools.pool(PoolKind::Rocks).unwrap().get(near.slot).unwrap();
        assert!(reused.active);
        assert_ne!(reused.id, near);
        let spread = w.config.hazards.fracture_spawn_radius;
        assert!(reused.body.pos.distance(Vec2::new(12.0, 0.0)) <= spread + 1e-4);
        assert!(!w.pools.is_active(far));
        assert_eq!(w.score, 2 * w.config.hazards.rock_score);
        assert_eq!(w.player.hit.lives(), w.config.preset.player_lives);
    }

    #[test]
    fn test_enemy_wiring() {
        let mut w = world();
        w.show_player();
        let id = w.pools.acquire(PoolKind::Enemies).unwrap();
        w.pools.get_mut(id).unwrap().body.pos = Vec2::new(10.0, 0.0);
        w.on_spawned(id);
        let enemy = w.pools.get(id).unwrap();
        // Facing the player at the origin
        assert!((enemy.body.heading.abs() - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(enemy.hit.as_ref().unwrap().zero_subscribers(), 3);
    }

    #[test]
    fn test_power_up_without_effects() {
        let mut config = GameConfig::default();
        config.power_ups.clear();
        let mut w = World::headless(config, 1);
        let id = w.pools.acquire(PoolKind::PowerUps).unwrap();
        w.on_spawned(id);
        let power_up = w.pools.get(id).unwrap();
        assert_eq!(power_up.behavior, Behavior::PowerUp { effect: None });
        assert!(!power_up.movable.as_ref().unwrap().immune);
    }

    #[test]
    fn test_power_up_pickup_and_revert() {
        let mut w = world();
        w.show_player();
        let id = w.pools.acquire(PoolKind::PowerUps).unwrap();
        w.pools.get_mut(id).unwrap().behavior = Behavior::PowerUp {
            effect: Some(PowerUpEffect {
                name: "Boost".into(),
                motion_speed_boost: 5.0,
                effect_time: 2.0,
                ..Default::default()
            }),
        };
        w.pools.get_mut(id).unwrap().body.pos = Vec2::new(0.5, 0.0);

        w.collect_power_ups();
        assert!(!w.pools.is_active(id));
        let base = w.config.preset.motion_speed;
        assert_eq!(w.player.movable.speed, base + 5.0);

        for _ in 0..(2.1 / SIM_DT) as u32 {
            w.clock.advance(SIM_DT);
            w.run_timers();
        }
        assert_eq!(w.player.movable.speed, base);
    }

    #[test]
    fn test_hidden_player_picks_nothing() {
        let mut w = world();
        let id = w.pools.acquire(PoolKind::PowerUps).unwrap();
        w.collect_power_ups();
        assert!(w.pools.is_active(id));
    }

    #[test]
    fn test_last_fracture_share_is_the_leftover() {
        let mut rng = Pcg32::seed_from_u64(42);
        let shares = fracture_proportions(1.0, 3, &mut rng);

        let mut replay = Pcg32::seed_from_u64(42);
        let first = replay.random::<f32>();
        let second = replay.random::<f32>() * (1.0 - first);
        assert_eq!(shares[0], first);
        assert_eq!(shares[1], second);
        assert_eq!(shares[2], 1.0 - shares[0] - shares[1]);
    }

    #[test]
    fn test_center_target_on_offset_circle() {
        let mut w = world();
        let offset = w.config.preset.spawned_center_target_offset;
        for _ in 0..20 {
            let target = w.center_target();
            let dist = target.distance(w.borders.center());
            assert!((dist - offset).abs() < 1e-4, "{dist} vs {offset}");
        }
    }

    proptest! {
        #[test]
        fn prop_fracture_sums_to_remaining(
            seed in any::<u64>(),
            remaining in 0.0f32..=1.0,
            pieces in 1u32..8,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let shares = fracture_proportions(remaining, pieces, &mut rng);
            prop_assert_eq!(shares.len(), pieces as usize);
            prop_assert!(shares.iter().all(|s| *s >= 0.0));
            let total: f32 = shares.iter().sum();
            prop_assert!((total - remaining).abs() < 1e-5);
        }
    }
}
