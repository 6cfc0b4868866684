//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically: same seed and
//! same input sequence give the same game.

use glam::Vec2;

use super::clock::FixedStep;
use super::states::{GameState, StateMachine};
use super::world::{Collaborators, World};
use crate::tuning::GameConfig;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Cancel/escape pressed this frame
    pub cancel: bool,
    /// Any other key pressed this frame
    pub any_key: bool,
    /// Thrust held
    pub thrust: bool,
    /// Fire held
    pub fire: bool,
    /// Cursor in world coordinates
    pub cursor: Vec2,
}

impl TickInput {
    /// Same held state with the one-shot presses cleared
    pub fn held(&self) -> Self {
        Self {
            cancel: false,
            any_key: false,
            ..self.clone()
        }
    }
}

/// The state machine plus the world it drives
pub struct Game {
    pub machine: StateMachine,
    pub world: World,
    stepper: FixedStep,
}

impl Game {
    /// Game in PreGame with the given collaborators
    pub fn new(config: GameConfig, seed: u64, collaborators: Collaborators) -> Self {
        let mut game = Self {
            machine: StateMachine::new(),
            world: World::new(config, seed, collaborators),
            stepper: FixedStep::default(),
        };
        game.machine.set_state(GameState::PreGame, &mut game.world);
        game
    }

    pub fn headless(config: GameConfig, seed: u64) -> Self {
        Self::new(config, seed, Collaborators::headless())
    }

    pub fn state(&self) -> Option<GameState> {
        self.machine.current()
    }

    pub fn quit_requested(&self) -> bool {
        self.machine.quit_requested()
    }

    /// Advance the game by one step of `dt` real seconds
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let world = &mut self.world;
        self.machine.update(world, input);

        let dt = world.clock.advance(dt);
        world.run_timers();

        // Paused: only the state machine runs
        if dt > 0.0 {
            world.update_player(dt, input.thrust, input.fire, input.cursor);
            world.update_entities(dt, input.cursor);
            world.update_spawner();
            world.collect_power_ups();
            world.resolve_collisions();
        }

        if let Some(next) = world.take_requested_state() {
            self.machine.set_state(next, world);
        }
    }

    /// Feed a variable frame delta; runs as many fixed ticks as it covers.
    /// One-shot presses apply to the first tick only.
    pub fn advance(&mut self, input: &TickInput, frame_dt: f32) -> u32 {
        let steps = self.stepper.steps(frame_dt);
        let held = input.held();
        for i in 0..steps {
            let input = if i == 0 { input } else { &held };
            self.tick(input, crate::consts::SIM_DT);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Behavior, PoolKind};
    use crate::tuning::PowerUpEffect;

    fn key() -> TickInput {
        TickInput {
            any_key: true,
            ..Default::default()
        }
    }

    fn cancel() -> TickInput {
        TickInput {
            cancel: true,
            ..Default::default()
        }
    }

    fn run(game: &mut Game, seconds: f32, input: &TickInput) {
        for _ in 0..(seconds / SIM_DT).ceil() as u32 {
            game.tick(input, SIM_DT);
        }
    }

    #[test]
    fn test_any_key_starts_game() {
        let mut game = Game::headless(GameConfig::default(), 12345);
        assert_eq!(game.state(), Some(GameState::PreGame));
        assert!(!game.world.spawner.enabled);

        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::PreGame));

        game.tick(&key(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::Game));
        assert!(game.world.spawner.enabled);
        assert!(game.world.player.active);
    }

    #[test]
    fn test_cancel_in_pregame_quits() {
        let mut game = Game::headless(GameConfig::default(), 1);
        game.tick(&cancel(), SIM_DT);
        assert!(game.quit_requested());
    }

    #[test]
    fn test_spawner_fills_the_field() {
        let mut game = Game::headless(GameConfig::default(), 7);
        game.tick(&key(), SIM_DT);
        let interval = game.world.config.preset.start_spawn_interval;
        run(&mut game, interval * 3.0, &TickInput::default());
        assert!(game.world.pools.active_count() > 0);
        assert!(game.world.spawner.interval < interval);
    }

    #[test]
    fn test_last_life_ends_game_within_one_tick() {
        let mut config = GameConfig::default();
        config.spawner.items.clear();
        let mut game = Game::headless(config, 99);
        game.tick(&key(), SIM_DT);

        // Drop the ship to one life, then park a rock on it
        let lives = game.world.player.hit.lives();
        let _ = game.world.player.hit.reduce_lives(lives - 1);
        let rock = game.world.pools.acquire(PoolKind::Rocks).unwrap();
        game.world.on_spawned(rock);
        game.world.pools.get_mut(rock).unwrap().body.pos = game.world.player.body.pos;

        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::GameOver));
        assert!(!game.world.spawner.enabled);
        assert!(!game.world.player.active);
        assert_eq!(game.world.pools.active_hazards(), 0);
        assert_eq!(game.world.score, game.world.config.hazards.rock_score);

        // Leaving GameOver restores the run
        game.tick(&key(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::Game));
        assert_eq!(game.world.pools.active_count(), 0);
        assert_eq!(game.world.score, 0);
        assert_eq!(game.world.player.hit.lives(), game.world.config.preset.player_lives);
        assert!(game.world.player.collidable());
        assert!(game.world.timers.is_empty());
    }

    #[test]
    fn test_power_up_wears_off() {
        let mut config = GameConfig::default();
        config.spawner.items.clear();
        let mut game = Game::headless(config, 5);
        game.tick(&key(), SIM_DT);

        let base = game.world.player.movable.speed;
        let id = game.world.pools.acquire(PoolKind::PowerUps).unwrap();
        let power_up = game.world.pools.get_mut(id).unwrap();
        power_up.behavior = Behavior::PowerUp {
            effect: Some(PowerUpEffect {
                name: "Boost".into(),
                motion_speed_boost: 5.0,
                effect_time: 2.0,
                ..Default::default()
            }),
        };
        power_up.body.pos = Vec2::new(0.2, 0.0);

        game.tick(&TickInput::default(), SIM_DT);
        assert_eq!(game.world.player.movable.speed, base + 5.0);

        run(&mut game, 2.0, &TickInput::default());
        assert_eq!(game.world.player.movable.speed, base);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut game = Game::headless(GameConfig::default(), 3);
        game.tick(&key(), SIM_DT);
        run(&mut game, 4.0, &TickInput::default());

        let scale = game.world.clock.time_scale;
        game.tick(&cancel(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::Pause));
        let frozen_at = game.world.clock.time;
        let positions: Vec<_> = game
            .world
            .pools
            .active_ids()
            .into_iter()
            .map(|id| game.world.pools.get(id).unwrap().body.pos)
            .collect();

        run(&mut game, 10.0, &TickInput::default());
        assert_eq!(game.world.clock.time, frozen_at);
        let after: Vec<_> = game
            .world
            .pools
            .active_ids()
            .into_iter()
            .map(|id| game.world.pools.get(id).unwrap().body.pos)
            .collect();
        assert_eq!(positions, after);

        game.tick(&key(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::Game));
        assert_eq!(game.world.clock.time_scale, scale);
    }

    #[test]
    fn test_pause_to_pregame_clears_field() {
        let mut game = Game::headless(GameConfig::default(), 8);
        game.tick(&key(), SIM_DT);
        run(&mut game, 10.0, &TickInput::default());
        game.tick(&cancel(), SIM_DT);
        game.tick(&cancel(), SIM_DT);
        assert_eq!(game.state(), Some(GameState::PreGame));
        assert_eq!(game.world.pools.active_count(), 0);
        assert!(!game.world.player.active);
        assert_eq!(game.world.score, 0);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            key(),
            TickInput {
                thrust: true,
                fire: true,
                cursor: Vec2::new(4.0, 2.0),
                ..Default::default()
            },
            TickInput {
                fire: true,
                cursor: Vec2::new(-3.0, 1.0),
                ..Default::default()
            },
        ];

        let mut a = Game::headless(GameConfig::default(), 99999);
        let mut b = Game::headless(GameConfig::default(), 99999);
        for input in inputs.iter().cycle().take(900) {
            a.tick(input, SIM_DT);
            b.tick(input, SIM_DT);
        }

        assert_eq!(a.state(), b.state());
        assert_eq!(a.world.score, b.world.score);
        assert_eq!(a.world.pools.active_ids(), b.world.pools.active_ids());
        assert_eq!(a.world.player.body.pos, b.world.player.body.pos);
    }

    #[test]
    fn test_advance_runs_fixed_steps() {
        let mut game = Game::headless(GameConfig::default(), 1);
        let steps = game.advance(&key(), SIM_DT * 3.5);
        assert_eq!(steps, 3);
        assert_eq!(game.state(), Some(GameState::Game));
        // Huge frame gaps are clamped
        assert!(game.advance(&TickInput::default(), 5.0) <= MAX_SUBSTEPS);
    }
}
