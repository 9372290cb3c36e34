//! Game state and core simulation types
//!
//! `GameState` is the whole session: phase, players, objects, effects and the
//! active game mode. It is only ever mutated through `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::cooldown::CooldownGate;
use super::gesture::{ExitGesture, is_thumb_up};
use super::landmarks::TrackedBody;
use super::modes::{GameKind, GameMode};
use super::particles::ParticleEffectsSystem;
use super::phase::{GamePhase, PhaseController};
use super::rect::Rect;
use super::scoring::{DifficultyTier, GameOverReason, Outcome, ScoreDelta, ScoringEngine, ScoringRules, TierChange};
use super::spawn::{GameObject, ObjectKind, SpawnScheduler, SpawnTarget};
use super::zone::{PlayerId, ZonePartitioner};
use crate::Result;
use crate::settings::Settings;

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Basket { player: PlayerId, at: Vec2 },
    Jump { player: PlayerId },
    /// Points added to a player (combo is 0 for flat awards)
    Scored { player: PlayerId, points: u32, combo: u32, total: u32 },
    Stacked { player: PlayerId, width: f32, height: usize },
    /// Untouched block expired
    Avoided { player: PlayerId, points: u32 },
    /// `cause` is None for a missed stack
    Eliminated { player: PlayerId, cause: Option<ObjectKind> },
    Stole { thief: PlayerId, victim: PlayerId, amount: u32 },
    MultiplierArmed { player: PlayerId, until: f32 },
    TierRaised { from: DifficultyTier, to: DifficultyTier },
    GameOver { reason: GameOverReason, outcome: Outcome },
    QuitRequested,
}

/// Per-round gameplay state shared by every game mode
#[derive(Debug, Clone)]
pub struct Session {
    pub arena: Rect,
    pub zones: ZonePartitioner,
    pub scoring: ScoringEngine,
    pub cooldowns: CooldownGate,
    /// Live objects (sorted by id)
    pub objects: Vec<GameObject>,
    /// Visual particles (not gameplay-affecting)
    pub effects: ParticleEffectsSystem,
    /// Seconds of play in this round
    pub elapsed: f32,
    pub duration: f32,
    /// Gameplay RNG (spawning)
    pub rng: Pcg32,
    /// Events produced this tick
    pub events: Vec<GameEvent>,
    /// Next object id handed to spawners
    next_id: u32,
}

impl Session {
    pub fn new(
        seed: u64,
        player_count: usize,
        arena: Rect,
        rules: ScoringRules,
        cooldowns: CooldownGate,
        duration: f32,
        max_particles: usize,
    ) -> Self {
        Self {
            arena,
            zones: ZonePartitioner::for_players(player_count, arena),
            scoring: ScoringEngine::new(rules, player_count),
            cooldowns,
            objects: Vec::new(),
            effects: ParticleEffectsSystem::new(seed, max_particles, arena),
            elapsed: 0.0,
            duration,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn player_count(&self) -> usize {
        self.scoring.players.len()
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Report a combo-scored event
    pub fn record_score(&mut self, delta: ScoreDelta, tier: Option<TierChange>) {
        self.emit(GameEvent::Scored {
            player: delta.player,
            points: delta.points,
            combo: delta.combo,
            total: delta.total,
        });
        self.record_tier(tier);
    }

    /// Flat award through the scoring engine, reported as an event
    pub fn award(&mut self, player: PlayerId, points: u32) -> Option<u32> {
        let (awarded, tier) = self.scoring.award(player, points, self.elapsed)?;
        let total = self.scoring.player(player).map(|p| p.score).unwrap_or(0);
        self.emit(GameEvent::Scored {
            player,
            points: awarded,
            combo: 0,
            total,
        });
        self.record_tier(tier);
        Some(awarded)
    }

    pub fn record_tier(&mut self, tier: Option<TierChange>) {
        if let Some(change) = tier {
            self.emit(GameEvent::TierRaised {
                from: change.from,
                to: change.to,
            });
        }
    }

    /// Zones of players still alive, in id order
    pub fn alive_targets(&self) -> Vec<SpawnTarget> {
        self.zones
            .zones()
            .into_iter()
            .filter(|z| self.scoring.is_alive(z.player))
            .map(|z| SpawnTarget {
                zone: Some(z.player),
                area: z.bounds,
            })
            .collect()
    }

    /// Run a spawner against this session's clock and RNG
    pub fn spawn(&mut self, spawner: &mut SpawnScheduler, targets: &[SpawnTarget]) -> usize {
        let spawned = spawner.update(self.elapsed, targets, &mut self.next_id, &mut self.rng);
        let count = spawned.len();
        self.objects.extend(spawned);
        count
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub phase: PhaseController,
    pub session: Session,
    pub mode: GameMode,
    /// Thumb-up hold that ends a round or quits from the results screen
    pub exit: ExitGesture,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Rounds started so far (reseeds each restart)
    pub round: u32,
    pub quit_requested: bool,
}

impl GameState {
    /// Create a new state in the menu for the given game
    pub fn new(game: GameKind, settings: Settings, seed: u64) -> Result<Self> {
        settings.validate()?;
        let arena = settings.arena_rect();
        let mode = GameMode::new(game, &settings.tuning, 1, arena)?;
        let session = Self::build_session(&mode, &settings, seed, 1);
        Ok(Self {
            seed,
            phase: PhaseController::new(settings.calibration_secs),
            exit: ExitGesture::new(settings.exit_hold_frames),
            settings,
            session,
            mode,
            time_ticks: 0,
            round: 0,
            quit_requested: false,
        })
    }

    fn build_session(mode: &GameMode, settings: &Settings, seed: u64, player_count: usize) -> Session {
        Session::new(
            seed,
            player_count,
            settings.arena_rect(),
            mode.scoring_rules(),
            mode.cooldowns(),
            mode.duration(),
            settings.max_particles(),
        )
    }

    pub fn game(&self) -> GameKind {
        self.mode.kind()
    }

    pub fn player_count(&self) -> usize {
        self.session.player_count()
    }

    /// Fresh players, objects and effects for a new round
    pub fn reset_round(&mut self, player_count: usize) {
        let count = player_count.clamp(1, crate::consts::MAX_PLAYERS);
        let seed = self.seed.wrapping_add(u64::from(self.round));
        self.round += 1;
        let pending = std::mem::take(&mut self.session.events);
        self.session = Self::build_session(&self.mode, &self.settings, seed, count);
        self.session.events = pending;
        self.mode.reset(count, self.session.arena);
        self.exit.reset();
        log::info!("New {} round: {} player(s), seed {}", self.game().as_str(), count, seed);
    }

    /// Pose bodies or hands assigned to players: the first body per player
    /// whose anchor point lies inside the arena, in player-id order.
    pub fn assign_bodies<'a>(
        zones: &ZonePartitioner,
        bodies: impl IntoIterator<Item = &'a TrackedBody>,
        anchor: fn(&TrackedBody) -> Option<Vec2>,
    ) -> Vec<(PlayerId, Vec2, &'a TrackedBody)> {
        let mut assigned: Vec<(PlayerId, Vec2, &TrackedBody)> = Vec::new();
        for body in bodies {
            let Some(point) = anchor(body) else {
                continue;
            };
            let Some(player) = zones.player_at(point) else {
                continue;
            };
            if assigned.iter().all(|(p, _, _)| *p != player) {
                assigned.push((player, point, body));
            }
        }
        assigned.sort_by_key(|(p, _, _)| *p);
        assigned
    }

    /// Playing hands per player by palm center. A thumb-up hand is the exit
    /// gesture, not play, so it never claims a zone.
    pub fn assign_hands<'a>(
        zones: &ZonePartitioner,
        hands: &'a [TrackedBody],
    ) -> Vec<(PlayerId, Vec2, &'a TrackedBody)> {
        Self::assign_bodies(zones, hands.iter().filter(|h| !is_thumb_up(h)), TrackedBody::palm_center)
    }
}
