//! Asteroids headless runner
//!
//! Loads a config, plays an autopiloted session through the fixed-step loop
//! and prints the final score. A windowed front end plugs into the same
//! `Hud`/`Renderer` seams; this binary drives the core without one.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use glam::Vec2;

use asteroids::consts::SIM_DT;
use asteroids::renderer::NullRenderer;
use asteroids::sim::{Collaborators, Game, GameState, PoolKind, TickInput};
use asteroids::ui::HeadlessHud;
use asteroids::{GameConfig, HighScores, ScoreStore};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Game config JSON; defaults are used when omitted or unreadable.
    #[arg(value_name = "CONFIG.json")]
    config: Option<PathBuf>,
    /// Fixed simulation frames to play before stopping.
    #[arg(long, value_name = "N", default_value_t = 60 * 60)]
    frames: u32,
    /// Seed for the simulation RNG.
    #[arg(long, value_name = "S", default_value_t = 12345)]
    seed: u64,
    /// High-score file to read and update.
    #[arg(long, value_name = "PATH", default_value = "highscores.json")]
    scores: PathBuf,
}

/// Aim at the nearest rock or enemy and keep the trigger down
fn autopilot(game: &Game) -> TickInput {
    let world = &game.world;
    let ship = world.player.body.pos;
    let nearest = world
        .pools
        .active_ids()
        .into_iter()
        .filter(|id| matches!(id.kind, PoolKind::Rocks | PoolKind::Enemies))
        .filter_map(|id| world.pools.get(id))
        .map(|e| e.body.pos)
        .min_by(|a, b| a.distance_squared(ship).total_cmp(&b.distance_squared(ship)));

    TickInput {
        fire: nearest.is_some(),
        cursor: nearest.unwrap_or(ship + Vec2::Y),
        ..Default::default()
    }
}

fn main() {
    let args = CliArgs::parse();

    let (config, load_error) = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => (config, None),
            Err(e) => (GameConfig::default(), Some(e)),
        },
        None => (GameConfig::default(), None),
    };

    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();
    log::info!("Asteroids starting (seed {})", args.seed);
    if let Some(e) = load_error {
        log::warn!("Using default config: {}", e);
    }

    let scores = Rc::new(RefCell::new(HighScores::load_or_default(&args.scores)));
    let hud = Rc::new(RefCell::new(HeadlessHud::default()));
    let collaborators = Collaborators {
        hud: Box::new(hud.clone()),
        renderer: Box::new(NullRenderer),
        scores: Box::new(scores.clone()),
    };
    let mut game = Game::new(config, args.seed, collaborators);

    // Any key leaves the title screen
    let start = TickInput {
        any_key: true,
        ..Default::default()
    };
    game.advance(&start, SIM_DT);

    let mut frames = 0;
    while frames < args.frames && !game.quit_requested() {
        if game.state() == Some(GameState::GameOver) {
            break;
        }
        let input = autopilot(&game);
        game.advance(&input, SIM_DT);
        frames += 1;
    }

    let score = game.world.score;
    if game.state() != Some(GameState::GameOver) {
        scores.borrow_mut().record_score_if_higher(score);
    }
    let best = scores.borrow().highest_score();
    log::info!(
        "Stopped after {} frames ({:.1}s real, {:.1}s game) in {:?} with {} lives left",
        frames,
        game.world.clock.unscaled_time,
        game.world.clock.time,
        game.state(),
        hud.borrow().lives
    );
    println!("score {score} (best {best})");

    if let Err(e) = scores.borrow().save(&args.scores) {
        log::warn!("Failed to save high scores: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["asteroids"]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.frames, 3600);
        assert_eq!(args.seed, 12345);
        assert_eq!(args.scores, PathBuf::from("highscores.json"));
    }

    #[test]
    fn test_cli_flags_and_config() {
        let args = CliArgs::try_parse_from([
            "asteroids",
            "hard.json",
            "--frames",
            "10",
            "--seed",
            "7",
            "--scores",
            "best.json",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("hard.json")));
        assert_eq!((args.frames, args.seed), (10, 7));
        assert_eq!(args.scores, PathBuf::from("best.json"));
        assert!(CliArgs::try_parse_from(["asteroids", "--frames", "many"]).is_err());
    }
}
