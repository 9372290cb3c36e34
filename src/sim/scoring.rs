//! Per-player scoring, combo streaks and the shared difficulty tier
//!
//! The only place player scores, combos and alive flags change.

use serde::{Deserialize, Serialize};

use super::zone::PlayerId;

/// Session difficulty; only ever raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum DifficultyTier {
    #[default]
    Normal,
    Hard,
    Extreme,
}

impl DifficultyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Normal => "Normal",
            DifficultyTier::Hard => "Hard",
            DifficultyTier::Extreme => "Extreme",
        }
    }
}

/// Which score is compared against tier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TierBasis {
    /// Highest score among all players
    #[default]
    MaxScore,
    /// The player who just scored
    Scorer,
}

/// Combo/points/tier rules for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Max gap between scoring events that keeps a streak alive (seconds)
    pub combo_window: f32,
    /// Points for the first event in a streak
    pub base_points: u32,
    /// Combo value beyond which points stop growing
    pub combo_cap: u32,
    /// Score thresholds, ascending, paired with the tier they unlock
    pub tier_thresholds: Vec<(u32, DifficultyTier)>,
    pub tier_basis: TierBasis,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            combo_window: 1.5,
            base_points: 1,
            combo_cap: 10,
            tier_thresholds: Vec::new(),
            tier_basis: TierBasis::MaxScore,
        }
    }
}

impl ScoringRules {
    /// Points for an event at the given combo: `base + min(combo, cap) - 1`
    pub fn points_for(&self, combo: u32) -> u32 {
        self.base_points + combo.clamp(1, self.combo_cap.max(1)) - 1
    }
}

/// One player slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub score: u32,
    pub combo: u32,
    pub alive: bool,
    pub last_event_time: Option<f32>,
    pub death_time: Option<f32>,
    /// Scoring multiplier active until this time (seconds)
    pub multiplier_until: f32,
}

impl PlayerState {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            score: 0,
            combo: 0,
            alive: true,
            last_event_time: None,
            death_time: None,
            multiplier_until: 0.0,
        }
    }

    pub fn multiplier_active(&self, now: f32) -> bool {
        now < self.multiplier_until
    }
}

/// Result of a combo-scored event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDelta {
    pub player: PlayerId,
    pub points: u32,
    pub combo: u32,
    pub total: u32,
}

/// A one-way tier raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierChange {
    pub from: DifficultyTier,
    pub to: DifficultyTier,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    TimeUp,
    AllEliminated,
    ExitGesture,
}

/// Winner of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(PlayerId),
    Draw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringEngine {
    pub rules: ScoringRules,
    pub players: Vec<PlayerState>,
    pub tier: DifficultyTier,
}

impl ScoringEngine {
    pub fn new(rules: ScoringRules, player_count: usize) -> Self {
        Self {
            rules,
            players: PlayerId::all(player_count).map(PlayerState::new).collect(),
            tier: DifficultyTier::Normal,
        }
    }

    /// Fresh players and tier, same rules
    pub fn reset(&mut self) {
        let count = self.players.len();
        self.players = PlayerId::all(count).map(PlayerState::new).collect();
        self.tier = DifficultyTier::Normal;
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id.index())
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id.index())
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(|p| p.alive)
    }

    /// Alive player ids in id order
    pub fn alive_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| p.alive).map(|p| p.id)
    }

    pub fn all_eliminated(&self) -> bool {
        self.players.iter().all(|p| !p.alive)
    }

    pub fn max_score(&self) -> u32 {
        self.players.iter().map(|p| p.score).max().unwrap_or(0)
    }

    /// Positive scoring event with combo accounting
    ///
    /// Dead players never score. Returns the delta and, if a threshold was
    /// crossed, the tier change.
    pub fn score(&mut self, id: PlayerId, now: f32) -> Option<(ScoreDelta, Option<TierChange>)> {
        let rules = self.rules.clone();
        let player = self.player_mut(id)?;
        if !player.alive {
            return None;
        }

        let in_window = player
            .last_event_time
            .is_some_and(|last| now - last < rules.combo_window);
        player.combo = if in_window { player.combo + 1 } else { 1 };

        let points = rules.points_for(player.combo);
        player.score += points;
        player.last_event_time = Some(now);

        let delta = ScoreDelta {
            player: id,
            points,
            combo: player.combo,
            total: player.score,
        };
        log::debug!("{} scored {} (combo {}) -> {}", id, points, delta.combo, delta.total);

        let change = self.escalate(id);
        Some((delta, change))
    }

    /// Flat award outside the combo system (avoidance, stacking)
    ///
    /// Doubled while the player's multiplier is armed.
    pub fn award(&mut self, id: PlayerId, points: u32, now: f32) -> Option<(u32, Option<TierChange>)> {
        let player = self.player_mut(id)?;
        if !player.alive {
            return None;
        }
        let points = if player.multiplier_active(now) { points * 2 } else { points };
        player.score += points;
        let change = self.escalate(id);
        Some((points, change))
    }

    /// Move `floor(victim / 2)` points from victim to thief; returns the amount
    pub fn steal(&mut self, thief: PlayerId, victim: PlayerId) -> u32 {
        if thief == victim || !self.is_alive(thief) {
            return 0;
        }
        let Some(amount) = self.player(victim).map(|v| v.score / 2) else {
            return 0;
        };
        if let Some(v) = self.player_mut(victim) {
            v.score -= amount;
        }
        if let Some(t) = self.player_mut(thief) {
            t.score += amount;
        }
        self.escalate(thief);
        amount
    }

    /// Arm (or extend) a timed multiplier; never shortens an existing one
    pub fn arm_multiplier(&mut self, id: PlayerId, until: f32) {
        if let Some(p) = self.player_mut(id) {
            if p.alive {
                p.multiplier_until = p.multiplier_until.max(until);
            }
        }
    }

    /// Fatal event: terminal for this player until reset
    pub fn eliminate(&mut self, id: PlayerId, now: f32) -> bool {
        match self.player_mut(id) {
            Some(p) if p.alive => {
                p.alive = false;
                p.combo = 0;
                p.death_time = Some(now);
                log::info!("{} eliminated at {:.2}s", id, now);
                true
            }
            _ => false,
        }
    }

    /// Raise the tier to the highest newly met threshold
    fn escalate(&mut self, scorer: PlayerId) -> Option<TierChange> {
        let basis = match self.rules.tier_basis {
            TierBasis::MaxScore => self.max_score(),
            TierBasis::Scorer => self.player(scorer).map(|p| p.score).unwrap_or(0),
        };
        let target = self
            .rules
            .tier_thresholds
            .iter()
            .filter(|(threshold, tier)| basis >= *threshold && *tier > self.tier)
            .map(|&(_, tier)| tier)
            .max()?;

        let change = TierChange {
            from: self.tier,
            to: target,
        };
        self.tier = target;
        log::info!("Difficulty raised: {} -> {}", change.from.as_str(), change.to.as_str());
        Some(change)
    }

    /// Terminal condition check for the running session
    pub fn terminal(&self, elapsed: f32, duration: f32, last_standing: bool) -> Option<GameOverReason> {
        if elapsed >= duration {
            return Some(GameOverReason::TimeUp);
        }
        if last_standing && self.all_eliminated() {
            return Some(GameOverReason::AllEliminated);
        }
        None
    }

    /// Highest score wins; equal top scores draw
    pub fn outcome(&self) -> Outcome {
        let best = self.max_score();
        let mut leaders = self.players.iter().filter(|p| p.score == best);
        match (leaders.next(), leaders.next()) {
            (Some(p), None) => Outcome::Winner(p.id),
            _ => Outcome::Draw,
        }
    }
}
