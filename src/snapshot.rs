//! Per-frame draw state
//!
//! Everything an external renderer needs to draw one frame, flattened out of
//! `GameState`. Built after each tick; never read back by the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::modes::{GameKind, GameMode, player_color};
use crate::sim::phase::GamePhase;
use crate::sim::rect::Rect;
use crate::sim::scoring::{DifficultyTier, GameOverReason, Outcome};
use crate::sim::spawn::{ObjectKind, ObjectPayload, ObjectState};
use crate::sim::state::GameState;
use crate::sim::zone::PlayerId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSprite {
    pub id: u32,
    pub kind: ObjectKind,
    pub state: ObjectState,
    pub bounds: Rect,
    /// Degrees (falling objects only)
    pub rotation: f32,
    pub color: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleSprite {
    pub pos: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub color: u32,
    /// 0..1 from remaining life
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HoopSprite {
    pub player: PlayerId,
    pub pos: Vec2,
    pub rim: Vec2,
    pub width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerSprite {
    pub player: PlayerId,
    pub slider: Rect,
    pub stack: Vec<Rect>,
}

/// Recent palm positions, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailSprite {
    pub player: PlayerId,
    pub color: u32,
    pub points: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerHud {
    pub id: PlayerId,
    pub score: u32,
    pub combo: u32,
    pub alive: bool,
    pub multiplier: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub players: Vec<PlayerHud>,
    /// Seconds left in the round
    pub remaining: f32,
    pub tier: DifficultyTier,
    /// Thumb-up hold progress (0..1)
    pub exit_progress: f32,
    /// Whole seconds left in the warm-up (0 outside Calibrating)
    pub calibration_countdown: u32,
    pub game_over: Option<GameOverReason>,
    pub outcome: Option<Outcome>,
}

/// One frame of draw state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub game: GameKind,
    pub arena: Rect,
    pub objects: Vec<ObjectSprite>,
    pub particles: Vec<ParticleSprite>,
    pub hoops: Vec<HoopSprite>,
    pub towers: Vec<TowerSprite>,
    pub trails: Vec<TrailSprite>,
    pub hud: Hud,
}

impl FrameSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let session = &state.session;
        let now = session.elapsed;

        let objects = session
            .objects
            .iter()
            .map(|obj| {
                let (rotation, color) = match obj.payload {
                    ObjectPayload::Block => (0.0, None),
                    ObjectPayload::Projectile { rotation, color, .. } => (rotation, Some(color)),
                };
                ObjectSprite {
                    id: obj.id,
                    kind: obj.kind,
                    state: obj.state,
                    bounds: obj.bounds,
                    rotation,
                    color,
                }
            })
            .collect();

        let particles = session
            .effects
            .iter()
            .map(|p| ParticleSprite {
                pos: p.pos,
                size: p.size,
                rotation: p.rotation,
                color: p.color,
                alpha: p.alpha(),
            })
            .collect();

        let mut hoops = Vec::new();
        let mut towers = Vec::new();
        let mut trails = Vec::new();
        match &state.mode {
            GameMode::Basketball(m) => {
                hoops = m
                    .hoops
                    .iter()
                    .zip(PlayerId::all(session.player_count()))
                    .map(|(hoop, player)| HoopSprite {
                        player,
                        pos: hoop.pos,
                        rim: hoop.rim_center(m.tuning.rim_offset),
                        width: m.tuning.hoop_width,
                    })
                    .collect();
            }
            GameMode::Fruit(m) => {
                trails = m
                    .trails
                    .iter()
                    .zip(PlayerId::all(session.player_count()))
                    .filter(|(trail, _)| !trail.is_empty())
                    .map(|(trail, player)| TrailSprite {
                        player,
                        color: player_color(player),
                        points: trail.positions(),
                    })
                    .collect();
            }
            GameMode::Tower(m) => {
                towers = m
                    .lanes
                    .iter()
                    .map(|lane| TowerSprite {
                        player: lane.player,
                        slider: lane.slider,
                        stack: lane.stack.clone(),
                    })
                    .collect();
            }
            GameMode::Dodge(_) => {}
        }

        let phase = state.phase.phase;
        let hud = Hud {
            phase,
            players: session
                .scoring
                .players
                .iter()
                .map(|p| PlayerHud {
                    id: p.id,
                    score: p.score,
                    combo: p.combo,
                    alive: p.alive,
                    multiplier: p.multiplier_active(now),
                })
                .collect(),
            remaining: session.remaining(),
            tier: session.scoring.tier,
            exit_progress: state.exit.progress(),
            calibration_countdown: state.phase.calibration_remaining().ceil() as u32,
            game_over: state.phase.game_over_reason,
            outcome: (phase == GamePhase::GameOver).then(|| session.scoring.outcome()),
        };

        Self {
            tick: state.time_ticks,
            game: state.game(),
            arena: session.arena,
            objects,
            particles,
            hoops,
            towers,
            trails,
            hud,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::tick::{TickInput, tick};

    fn playing(game: GameKind, players: u8) -> GameState {
        let settings = Settings {
            calibration_secs: 0.0,
            ..Default::default()
        };
        let mut state = GameState::new(game, settings, 7).unwrap();
        let select = TickInput {
            select_players: Some(players),
            ..Default::default()
        };
        tick(&mut state, &select, None, SIM_DT);
        state
    }

    #[test]
    fn test_menu_snapshot() {
        let state = GameState::new(GameKind::Dodge, Settings::default(), 1).unwrap();
        let snap = FrameSnapshot::from_state(&state);
        assert_eq!(snap.hud.phase, GamePhase::Menu);
        assert!(snap.objects.is_empty());
        assert!(snap.hud.outcome.is_none());
        assert_eq!(snap.hud.remaining, 180.0);
    }

    #[test]
    fn test_calibration_countdown() {
        let mut state = GameState::new(GameKind::Tower, Settings::default(), 1).unwrap();
        let select = TickInput {
            select_players: Some(1),
            ..Default::default()
        };
        tick(&mut state, &select, None, SIM_DT);
        let snap = FrameSnapshot::from_state(&state);
        assert_eq!(snap.hud.phase, GamePhase::Calibrating);
        assert_eq!(snap.hud.calibration_countdown, 4);
    }

    #[test]
    fn test_mode_specific_sprites() {
        let snap = FrameSnapshot::from_state(&playing(GameKind::Basketball, 2));
        assert_eq!(snap.hoops.len(), 2);
        assert_eq!(snap.hoops[1].player, PlayerId::TWO);
        assert!(snap.towers.is_empty());

        let snap = FrameSnapshot::from_state(&playing(GameKind::Tower, 2));
        assert_eq!(snap.towers.len(), 2);
        assert!(snap.hoops.is_empty());
        assert_eq!(snap.hud.players.len(), 2);
    }

    #[test]
    fn test_falling_objects_carry_color() {
        let mut state = playing(GameKind::Fruit, 1);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), None, SIM_DT);
        }
        let snap = FrameSnapshot::from_state(&state);
        assert!(!snap.objects.is_empty());
        assert!(snap.objects.iter().all(|o| o.color.is_some()));
    }

    #[test]
    fn test_json_output() {
        let snap = FrameSnapshot::from_state(&playing(GameKind::Basketball, 1));
        let json = snap.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["game"], "basketball");
        assert_eq!(value["hud"]["phase"], "Playing");
        assert_eq!(value["hud"]["players"][0]["score"], 0);
    }
}
