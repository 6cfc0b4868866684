//! Global game flow
//!
//! Four states, exactly one active. A transition clears the outgoing state
//! and initialises the incoming one; asking for the state that is already
//! active does nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tick::TickInput;
use super::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen
    PreGame,
    /// Active gameplay
    Game,
    /// Simulation frozen
    Pause,
    /// Player ran out of lives
    GameOver,
}

/// What a state's per-frame update asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRequest {
    Enter(GameState),
    /// Terminate the application
    Quit,
}

/// Enter/exit hooks plus per-frame update for one [`GameState`]
pub trait StateHandler {
    fn state(&self) -> GameState;
    fn init_state(&mut self, world: &mut World);
    fn clear_state(&mut self, world: &mut World);
    fn state_update(&mut self, world: &mut World, input: &TickInput) -> Option<StateRequest>;
}

/// Title screen: wipe the field and wait for a key
#[derive(Debug, Default)]
pub struct PreGameState;

impl StateHandler for PreGameState {
    fn state(&self) -> GameState {
        GameState::PreGame
    }

    fn init_state(&mut self, world: &mut World) {
        world.show_panel(GameState::PreGame);
        world.reset_score();
        world.spawner.enabled = false;
        world.release_all_pools();
        world.hide_player();
        world.player.recenter();
        world.reset_player_stats();
        world.reset_player_lives();
    }

    fn clear_state(&mut self, _world: &mut World) {}

    fn state_update(&mut self, _world: &mut World, input: &TickInput) -> Option<StateRequest> {
        if input.cancel {
            Some(StateRequest::Quit)
        } else if input.any_key {
            Some(StateRequest::Enter(GameState::Game))
        } else {
            None
        }
    }
}

/// Gameplay. Losing the last life forces GameOver from the hit model, not
/// from here.
#[derive(Debug, Default)]
pub struct PlayState;

impl StateHandler for PlayState {
    fn state(&self) -> GameState {
        GameState::Game
    }

    fn init_state(&mut self, world: &mut World) {
        world.show_panel(GameState::Game);
        world.show_player();
        world.spawner.enabled = true;
    }

    fn clear_state(&mut self, _world: &mut World) {}

    fn state_update(&mut self, _world: &mut World, input: &TickInput) -> Option<StateRequest> {
        input.cancel.then_some(StateRequest::Enter(GameState::Pause))
    }
}

/// Frozen simulation; restores the captured time scale on exit
#[derive(Debug, Default)]
pub struct PauseState {
    saved_time_scale: f32,
}

impl StateHandler for PauseState {
    fn state(&self) -> GameState {
        GameState::Pause
    }

    fn init_state(&mut self, world: &mut World) {
        self.saved_time_scale = world.clock.time_scale;
        world.clock.time_scale = 0.0;
        world.show_panel(GameState::Pause);
        world.spawner.enabled = false;
    }

    fn clear_state(&mut self, world: &mut World) {
        world.clock.time_scale = self.saved_time_scale;
    }

    fn state_update(&mut self, _world: &mut World, input: &TickInput) -> Option<StateRequest> {
        if input.cancel {
            Some(StateRequest::Enter(GameState::PreGame))
        } else if input.any_key {
            Some(StateRequest::Enter(GameState::Game))
        } else {
            None
        }
    }
}

/// Final score screen. Leaving it resets the whole run.
#[derive(Debug, Default)]
pub struct GameOverState;

impl StateHandler for GameOverState {
    fn state(&self) -> GameState {
        GameState::GameOver
    }

    fn init_state(&mut self, world: &mut World) {
        world.show_panel(GameState::GameOver);
        world.display_game_over_stats();
        world.hide_player();
        world.spawner.enabled = false;
        world.release_all_pools();
    }

    fn clear_state(&mut self, world: &mut World) {
        world.timers.cancel_all();
        world.hide_message();

        world.hide_player();
        world.player.recenter();

        world.spawner.enabled = false;
        world.spawner.interval = world.config.preset.start_spawn_interval;

        world.release_all_pools();
        world.broadcast_reset();
    }

    fn state_update(&mut self, _world: &mut World, input: &TickInput) -> Option<StateRequest> {
        if input.cancel {
            Some(StateRequest::Enter(GameState::PreGame))
        } else if input.any_key {
            Some(StateRequest::Enter(GameState::Game))
        } else {
            None
        }
    }
}

/// Owns one handler per state and the active key
pub struct StateMachine {
    handlers: BTreeMap<GameState, Box<dyn StateHandler>>,
    current: Option<GameState>,
    quit: bool,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Machine with the four standard handlers and no active state
    pub fn new() -> Self {
        Self::with_handlers(vec![
            Box::new(PreGameState),
            Box::new(PlayState),
            Box::new(PauseState::default()),
            Box::new(GameOverState),
        ])
    }

    pub fn with_handlers(handlers: Vec<Box<dyn StateHandler>>) -> Self {
        let handlers = handlers.into_iter().map(|h| (h.state(), h)).collect();
        Self {
            handlers,
            current: None,
            quit: false,
        }
    }

    pub fn current(&self) -> Option<GameState> {
        self.current
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Clear the active state and initialise `next`.
    ///
    /// # Panics
    /// If no handler is registered for `next`.
    pub fn set_state(&mut self, next: GameState, world: &mut World) {
        if self.current == Some(next) {
            return;
        }
        assert!(
            self.handlers.contains_key(&next),
            "no handler registered for {next:?}"
        );

        if let Some(handler) = self.current.and_then(|c| self.handlers.get_mut(&c)) {
            handler.clear_state(world);
        }
        self.current = Some(next);
        if let Some(handler) = self.handlers.get_mut(&next) {
            handler.init_state(world);
        }
        log::info!("Setting game state to {:?}", next);
    }

    /// Run the active state's update and apply what it asks for
    pub fn update(&mut self, world: &mut World, input: &TickInput) {
        let Some(current) = self.current else {
            return;
        };
        let request = self
            .handlers
            .get_mut(&current)
            .and_then(|h| h.state_update(world, input));

        match request {
            Some(StateRequest::Enter(next)) => self.set_state(next, world),
            Some(StateRequest::Quit) => {
                log::info!("Quit requested from {:?}", current);
                self.quit = true;
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Debug)]
    struct Calls {
        init: Vec<GameState>,
        clear: Vec<GameState>,
    }

    struct Counting {
        state: GameState,
        calls: Rc<RefCell<Calls>>,
    }

    impl StateHandler for Counting {
        fn state(&self) -> GameState {
            self.state
        }
        fn init_state(&mut self, _world: &mut World) {
            self.calls.borrow_mut().init.push(self.state);
        }
        fn clear_state(&mut self, _world: &mut World) {
            self.calls.borrow_mut().clear.push(self.state);
        }
        fn state_update(&mut self, _world: &mut World, input: &TickInput) -> Option<StateRequest> {
            input.any_key.then_some(StateRequest::Enter(GameState::Pause))
        }
    }

    fn counting_machine(states: &[GameState]) -> (StateMachine, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let handlers = states
            .iter()
            .map(|&state| {
                Box::new(Counting {
                    state,
                    calls: calls.clone(),
                }) as Box<dyn StateHandler>
            })
            .collect();
        (StateMachine::with_handlers(handlers), calls)
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut world = World::headless(Default::default(), 1);
        let (mut machine, calls) = counting_machine(&[GameState::PreGame, GameState::Game]);

        machine.set_state(GameState::PreGame, &mut world);
        machine.set_state(GameState::PreGame, &mut world);
        assert_eq!(calls.borrow().init, vec![GameState::PreGame]);
        assert!(calls.borrow().clear.is_empty());

        machine.set_state(GameState::Game, &mut world);
        assert_eq!(calls.borrow().clear, vec![GameState::PreGame]);
        assert_eq!(calls.borrow().init, vec![GameState::PreGame, GameState::Game]);
        assert_eq!(machine.current(), Some(GameState::Game));
    }

    #[test]
    fn test_update_applies_request() {
        let mut world = World::headless(Default::default(), 1);
        let (mut machine, calls) = counting_machine(&[GameState::Game, GameState::Pause]);
        machine.set_state(GameState::Game, &mut world);
        machine.update(&mut world, &TickInput::default());
        assert_eq!(machine.current(), Some(GameState::Game));

        let key = TickInput {
            any_key: true,
            ..Default::default()
        };
        machine.update(&mut world, &key);
        assert_eq!(machine.current(), Some(GameState::Pause));
        // Pause -> Pause request is ignored
        machine.update(&mut world, &key);
        assert_eq!(calls.borrow().init.len(), 2);
    }

    #[test]
    #[should_panic(expected = "no handler registered")]
    fn test_unknown_state_is_fatal() {
        let mut world = World::headless(Default::default(), 1);
        let (mut machine, _) = counting_machine(&[GameState::PreGame]);
        machine.set_state(GameState::GameOver, &mut world);
    }

    #[test]
    fn test_pregame_cancel_quits() {
        let mut world = World::headless(Default::default(), 1);
        let mut machine = StateMachine::new();
        machine.set_state(GameState::PreGame, &mut world);
        let cancel = TickInput {
            cancel: true,
            ..Default::default()
        };
        machine.update(&mut world, &cancel);
        assert!(machine.quit_requested());
        assert_eq!(machine.current(), Some(GameState::PreGame));
    }

    #[test]
    fn test_pause_freezes_and_restores_time_scale() {
        let mut world = World::headless(Default::default(), 1);
        let mut machine = StateMachine::new();
        machine.set_state(GameState::Game, &mut world);
        world.clock.time_scale = 0.7;

        machine.set_state(GameState::Pause, &mut world);
        assert_eq!(world.clock.time_scale, 0.0);
        assert!(!world.spawner.enabled);

        machine.set_state(GameState::Game, &mut world);
        assert_eq!(world.clock.time_scale, 0.7);
        assert!(world.spawner.enabled);
    }
}
