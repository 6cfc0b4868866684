//! HUD notification seam
//!
//! Every call is fire-and-forget: the core never reads anything back from
//! the UI.

use crate::sim::GameState;

/// UI collaborator
pub trait Hud {
    fn display_score(&mut self, score: u64);
    fn display_lives(&mut self, lives: u32);
    /// Show a transient message. Hiding it is scheduled by the core.
    fn display_message(&mut self, text: &str);
    fn hide_message(&mut self);
    /// Select the panel that matches the active game state
    fn toggle_panel(&mut self, state: GameState);
    fn display_game_over(&mut self, score: u64, best: u64);
}

/// Shared handle, so an embedder can keep reading a HUD it handed over
impl<H: Hud> Hud for std::rc::Rc<std::cell::RefCell<H>> {
    fn display_score(&mut self, score: u64) {
        self.borrow_mut().display_score(score);
    }
    fn display_lives(&mut self, lives: u32) {
        self.borrow_mut().display_lives(lives);
    }
    fn display_message(&mut self, text: &str) {
        self.borrow_mut().display_message(text);
    }
    fn hide_message(&mut self) {
        self.borrow_mut().hide_message();
    }
    fn toggle_panel(&mut self, state: GameState) {
        self.borrow_mut().toggle_panel(state);
    }
    fn display_game_over(&mut self, score: u64, best: u64) {
        self.borrow_mut().display_game_over(score, best);
    }
}

/// Maximum life icons the HUD can show
pub const MAX_LIFE_ICONS: u32 = 5;

/// HUD without a screen: logs notifications and remembers the last values
#[derive(Debug, Clone, Default)]
pub struct HeadlessHud {
    pub score: u64,
    pub lives: u32,
    pub message: Option<String>,
    pub panel: Option<GameState>,
    pub game_over: Option<(u64, u64)>,
}

impl Hud for HeadlessHud {
    fn display_score(&mut self, score: u64) {
        self.score = score;
    }

    fn display_lives(&mut self, lives: u32) {
        if lives > MAX_LIFE_ICONS {
            log::warn!("HUD can show at most {} lives, got {}", MAX_LIFE_ICONS, lives);
        }
        self.lives = lives.min(MAX_LIFE_ICONS);
    }

    fn display_message(&mut self, text: &str) {
        log::info!("HUD message: {}", text);
        self.message = Some(text.to_string());
    }

    fn hide_message(&mut self) {
        self.message = None;
    }

    fn toggle_panel(&mut self, state: GameState) {
        self.panel = Some(state);
    }

    fn display_game_over(&mut self, score: u64, best: u64) {
        log::info!("Game over: score {} (best {})", score, best);
        self.game_over = Some((score, best));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lives_clamped_to_icons() {
        let mut hud = HeadlessHud::default();
        hud.display_lives(9);
        assert_eq!(hud.lives, MAX_LIFE_ICONS);
        hud.display_lives(2);
        assert_eq!(hud.lives, 2);
    }

    #[test]
    fn test_message_show_hide() {
        let mut hud = HeadlessHud::default();
        hud.display_message("Speed Boost");
        assert_eq!(hud.message.as_deref(), Some("Speed Boost"));
        hud.hide_message();
        assert!(hud.message.is_none());
    }
}
