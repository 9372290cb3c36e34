//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by player ID, then entity ID)
//! - No camera, rendering or platform dependencies

pub mod collision;
pub mod cooldown;
pub mod gesture;
pub mod landmarks;
pub mod modes;
pub mod motion;
pub mod particles;
pub mod phase;
pub mod rect;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod zone;

pub use collision::{CollisionResolver, Contact, HitRegion};
pub use cooldown::{CooldownGate, EventKind};
pub use gesture::{BasketDetector, ExitGesture, JumpDetector, VerticalAxis, is_thumb_up};
pub use landmarks::{CoordSpace, LandmarkFrame, LandmarkSource, TrackedBody, TrackerKind};
pub use modes::{GameKind, GameMode};
pub use motion::{MotionBuffer, TrackedPoint};
pub use particles::{Particle, ParticleEffectsSystem};
pub use phase::{GamePhase, PhaseController};
pub use rect::Rect;
pub use scoring::{DifficultyTier, GameOverReason, Outcome, ScoringEngine, ScoringRules};
pub use spawn::{GameObject, ObjectKind, SpawnScheduler};
pub use state::{GameEvent, GameState, Session};
pub use tick::{TickInput, tick};
pub use zone::{PlayerId, ZonePartitioner};
