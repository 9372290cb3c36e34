//! Session phase state machine
//!
//! Menu -> Calibrating -> Playing -> GameOver -> (Menu | Playing)

use serde::{Deserialize, Serialize};

use super::scoring::GameOverReason;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a player count
    #[default]
    Menu,
    /// Camera warm-up before play
    Calibrating,
    /// Active gameplay
    Playing,
    /// Session ended, waiting for restart/menu
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "Menu",
            GamePhase::Calibrating => "Calibrating",
            GamePhase::Playing => "Playing",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// A phase change reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: GamePhase,
    pub to: GamePhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseController {
    pub phase: GamePhase,
    /// Warm-up length (seconds)
    pub calibration_secs: f32,
    /// Warm-up time elapsed in Calibrating
    pub calibration_elapsed: f32,
    pub game_over_reason: Option<GameOverReason>,
}

impl PhaseController {
    pub fn new(calibration_secs: f32) -> Self {
        Self {
            phase: GamePhase::Menu,
            calibration_secs,
            calibration_elapsed: 0.0,
            game_over_reason: None,
        }
    }

    fn transition(&mut self, to: GamePhase) -> PhaseChange {
        let change = PhaseChange { from: self.phase, to };
        log::info!("Phase: {} -> {}", change.from.as_str(), change.to.as_str());
        self.phase = to;
        change
    }

    /// Menu -> Calibrating; ignored in any other phase
    pub fn select_players(&mut self) -> Option<PhaseChange> {
        if self.phase != GamePhase::Menu {
            return None;
        }
        self.calibration_elapsed = 0.0;
        self.game_over_reason = None;
        Some(self.transition(GamePhase::Calibrating))
    }

    /// Advance the warm-up timer; Calibrating -> Playing once it runs out
    pub fn tick_calibration(&mut self, dt: f32) -> Option<PhaseChange> {
        if self.phase != GamePhase::Calibrating {
            return None;
        }
        self.calibration_elapsed += dt;
        if self.calibration_elapsed >= self.calibration_secs {
            return Some(self.transition(GamePhase::Playing));
        }
        None
    }

    /// Seconds left in the warm-up (0 outside Calibrating)
    pub fn calibration_remaining(&self) -> f32 {
        if self.phase != GamePhase::Calibrating {
            return 0.0;
        }
        (self.calibration_secs - self.calibration_elapsed).max(0.0)
    }

    /// Playing -> GameOver
    pub fn finish(&mut self, reason: GameOverReason) -> Option<PhaseChange> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.game_over_reason = Some(reason);
        Some(self.transition(GamePhase::GameOver))
    }

    /// GameOver -> Playing (the caller resets the session)
    pub fn restart(&mut self) -> Option<PhaseChange> {
        if self.phase != GamePhase::GameOver {
            return None;
        }
        self.game_over_reason = None;
        Some(self.transition(GamePhase::Playing))
    }

    /// GameOver -> Menu
    pub fn to_menu(&mut self) -> Option<PhaseChange> {
        if self.phase != GamePhase::GameOver {
            return None;
        }
        self.game_over_reason = None;
        Some(self.transition(GamePhase::Menu))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut phase = PhaseController::new(4.0);
        assert_eq!(phase.phase, GamePhase::Menu);
        assert!(phase.tick_calibration(1.0).is_none());

        assert!(phase.select_players().is_some());
        assert_eq!(phase.phase, GamePhase::Calibrating);
        assert!(phase.tick_calibration(3.0).is_none());
        assert_eq!(phase.calibration_remaining(), 1.0);
        assert_eq!(
            phase.tick_calibration(1.0),
            Some(PhaseChange {
                from: GamePhase::Calibrating,
                to: GamePhase::Playing
            })
        );

        assert!(phase.finish(GameOverReason::TimeUp).is_some());
        assert_eq!(phase.game_over_reason, Some(GameOverReason::TimeUp));
        // Only one terminal transition
        assert!(phase.finish(GameOverReason::AllEliminated).is_none());

        assert!(phase.restart().is_some());
        assert_eq!(phase.phase, GamePhase::Playing);
        assert_eq!(phase.game_over_reason, None);
    }

    #[test]
    fn test_invalid_inputs_ignored() {
        let mut phase = PhaseController::new(4.0);
        assert!(phase.restart().is_none());
        assert!(phase.to_menu().is_none());
        assert!(phase.finish(GameOverReason::ExitGesture).is_none());

        phase.select_players();
        // Selecting again mid-calibration does nothing
        assert!(phase.select_players().is_none());
        phase.tick_calibration(5.0);
        phase.finish(GameOverReason::ExitGesture);
        assert!(phase.to_menu().is_some());
        assert_eq!(phase.phase, GamePhase::Menu);
    }
}
