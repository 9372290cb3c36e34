//! The four mini-games
//!
//! Each mode turns this frame's landmarks into gameplay through the shared
//! `Session`. Modes own only what is specific to them (hoops, towers,
//! spawners, trails).

pub mod basketball;
pub mod dodge;
pub mod fruit;
pub mod tower;

use serde::{Deserialize, Serialize};

use super::collision::Contact;
use super::cooldown::CooldownGate;
use super::landmarks::{LandmarkFrame, TrackerKind};
use super::particles::BurstStyle;
use super::rect::Rect;
use super::scoring::ScoringRules;
use super::spawn::ObjectKind;
use super::state::{GameEvent, Session};
use super::zone::PlayerId;
use crate::Result;
use crate::tuning::Tuning;

pub use basketball::{BasketballMode, Hoop};
pub use dodge::DodgeMode;
pub use fruit::FruitMode;
pub use tower::{TowerLane, TowerMode};

/// Which mini-game a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Basketball,
    Fruit,
    Dodge,
    Tower,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [GameKind::Basketball, GameKind::Fruit, GameKind::Dodge, GameKind::Tower];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Basketball => "basketball",
            GameKind::Fruit => "fruit",
            GameKind::Dodge => "dodge",
            GameKind::Tower => "tower",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        GameKind::ALL.into_iter().find(|k| k.as_str() == s.to_lowercase())
    }

    /// Landmark model the game reads
    pub fn tracker(&self) -> TrackerKind {
        match self {
            GameKind::Basketball | GameKind::Fruit => TrackerKind::Hand,
            GameKind::Dodge | GameKind::Tower => TrackerKind::Pose,
        }
    }
}

/// HUD color for a player
pub fn player_color(player: PlayerId) -> u32 {
    match player.0 {
        1 => 0x00D4FF,
        _ => 0x39FF14,
    }
}

const BOMB_COLOR: u32 = 0xFF0000;

#[derive(Debug, Clone)]
pub enum GameMode {
    Basketball(BasketballMode),
    Fruit(FruitMode),
    Dodge(DodgeMode),
    Tower(TowerMode),
}

impl GameMode {
    pub fn new(kind: GameKind, tuning: &Tuning, player_count: usize, arena: Rect) -> Result<Self> {
        Ok(match kind {
            GameKind::Basketball => GameMode::Basketball(BasketballMode::new(tuning.basketball.clone(), player_count)),
            GameKind::Fruit => GameMode::Fruit(FruitMode::new(tuning.fruit.clone(), player_count)?),
            GameKind::Dodge => GameMode::Dodge(DodgeMode::new(tuning.dodge.clone())?),
            GameKind::Tower => GameMode::Tower(TowerMode::new(tuning.tower.clone(), player_count, arena)),
        })
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GameMode::Basketball(_) => GameKind::Basketball,
            GameMode::Fruit(_) => GameKind::Fruit,
            GameMode::Dodge(_) => GameKind::Dodge,
            GameMode::Tower(_) => GameKind::Tower,
        }
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        match self {
            GameMode::Basketball(m) => m.scoring_rules(),
            GameMode::Fruit(m) => m.scoring_rules(),
            GameMode::Dodge(_) | GameMode::Tower(_) => ScoringRules::default(),
        }
    }

    pub fn cooldowns(&self) -> CooldownGate {
        match self {
            GameMode::Basketball(m) => m.cooldowns(),
            _ => CooldownGate::new(),
        }
    }

    pub fn duration(&self) -> f32 {
        match self {
            GameMode::Basketball(m) => m.tuning.duration_secs,
            GameMode::Fruit(m) => m.tuning.duration_secs,
            GameMode::Dodge(m) => m.tuning.duration_secs,
            GameMode::Tower(m) => m.tuning.duration_secs,
        }
    }

    /// Whether the round ends once every player is eliminated
    pub fn ends_when_all_eliminated(&self) -> bool {
        !matches!(self, GameMode::Basketball(_))
    }

    /// Confetti burst on game over
    pub fn confetti_count(&self) -> usize {
        match self {
            GameMode::Basketball(m) => m.tuning.confetti_count,
            _ => 0,
        }
    }

    pub fn reset(&mut self, player_count: usize, arena: Rect) {
        match self {
            GameMode::Basketball(m) => m.reset(player_count),
            GameMode::Fruit(m) => m.reset(player_count),
            GameMode::Dodge(m) => m.reset(),
            GameMode::Tower(m) => m.reset(player_count, arena),
        }
    }

    /// One frame of play. Frames from the wrong tracker count as no input.
    pub fn update(&mut self, session: &mut Session, frame: Option<&LandmarkFrame>) {
        let bodies = match frame {
            Some(f) if f.tracker == self.kind().tracker() => f.bodies.as_slice(),
            Some(f) => {
                log::trace!("Ignoring {:?} frame in {}", f.tracker, self.kind().as_str());
                &[]
            }
            None => &[],
        };
        match self {
            GameMode::Basketball(m) => m.update(session, bodies),
            GameMode::Fruit(m) => m.update(session, bodies),
            GameMode::Dodge(m) => m.update(session, bodies),
            GameMode::Tower(m) => m.update(session, bodies),
        }
    }
}

/// Turn resolver contacts into events and feedback particles
pub(crate) fn report_contacts(session: &mut Session, contacts: Vec<Contact>) {
    for contact in contacts {
        match contact {
            Contact::Sliced { at, color, delta, tier, .. } => {
                session.record_score(delta, tier);
                session.effects.burst(at, color, &BurstStyle::splash());
            }
            Contact::Eliminated { at, kind, player, .. } => {
                session.emit(GameEvent::Eliminated {
                    player,
                    cause: Some(kind),
                });
                if kind == ObjectKind::Bomb {
                    session.effects.burst(at, BOMB_COLOR, &BurstStyle::splash().with_count(30));
                }
            }
            Contact::Stole { thief, victim, amount, .. } => {
                session.emit(GameEvent::Stole { thief, victim, amount });
            }
            Contact::Multiplied { player, until, .. } => {
                session.emit(GameEvent::MultiplierArmed { player, until });
            }
        }
    }
}
