//! Two-hoop basketball
//!
//! The palm (hand landmark 9) is the ball. A make is the palm dropping through
//! the player's own rim; hoops start moving once the difficulty tier rises.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player_color;
use crate::sim::cooldown::{CooldownGate, EventKind};
use crate::sim::gesture::{BasketConfig, BasketDetector};
use crate::sim::landmarks::TrackedBody;
use crate::sim::particles::BurstStyle;
use crate::sim::scoring::{DifficultyTier, ScoringRules, TierBasis};
use crate::sim::state::{GameEvent, GameState, Session};
use crate::tuning::BasketballTuning;

/// A hoop bouncing inside its own half of the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hoop {
    /// Sprite origin (top-left)
    pub pos: Vec2,
    /// Unit step direction per axis (each component ±1)
    pub dir: Vec2,
    /// (min_x, max_x, min_y, max_y)
    pub bounds: (f32, f32, f32, f32),
}

impl Hoop {
    pub fn rim_center(&self, offset: (f32, f32)) -> Vec2 {
        self.pos + Vec2::new(offset.0, offset.1)
    }

    /// Move one frame; reverse an axis when it reaches its bound
    pub fn step(&mut self, speed: f32, width: f32) {
        let (min_x, max_x, min_y, max_y) = self.bounds;
        self.pos += self.dir * speed;
        if self.pos.x <= min_x || self.pos.x >= max_x - width {
            self.dir.x = -self.dir.x;
        }
        if self.pos.y <= min_y || self.pos.y >= max_y {
            self.dir.y = -self.dir.y;
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasketballMode {
    pub tuning: BasketballTuning,
    pub hoops: Vec<Hoop>,
    detector: BasketDetector,
}

impl BasketballMode {
    pub fn new(tuning: BasketballTuning, player_count: usize) -> Self {
        let config = BasketConfig {
            window: 3,
            min_fall: tuning.min_fall,
            rim_radius: tuning.rim_radius,
            axis: tuning.axis,
        };
        let detector = BasketDetector::new(config, player_count, tuning.buffer_capacity);
        let mut mode = Self {
            tuning,
            hoops: Vec::new(),
            detector,
        };
        mode.reset(player_count);
        mode
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            combo_window: self.tuning.combo_window,
            base_points: self.tuning.base_points,
            combo_cap: 10,
            tier_thresholds: vec![
                (self.tuning.hard_threshold, DifficultyTier::Hard),
                (self.tuning.extreme_threshold, DifficultyTier::Extreme),
            ],
            tier_basis: TierBasis::MaxScore,
        }
    }

    pub fn cooldowns(&self) -> CooldownGate {
        CooldownGate::new().with_cooldown(EventKind::Basket, self.tuning.basket_cooldown_secs)
    }

    pub fn reset(&mut self, player_count: usize) {
        let count = player_count.clamp(1, 2);
        // Left hoop drifts right, right hoop drifts left; both start downward
        let dirs = [Vec2::new(1.0, 1.0), Vec2::new(-1.0, 1.0)];
        self.hoops = (0..count)
            .map(|i| Hoop {
                pos: Vec2::new(self.tuning.hoop_starts[i].0, self.tuning.hoop_starts[i].1),
                dir: dirs[i],
                bounds: self.tuning.hoop_bounds[i],
            })
            .collect();
        self.detector = BasketDetector::new(self.detector.config, count, self.tuning.buffer_capacity);
    }

    /// Hoop speed for the current tier (None = static)
    pub fn hoop_speed(&self, tier: DifficultyTier) -> Option<f32> {
        match tier {
            DifficultyTier::Normal => None,
            DifficultyTier::Hard => Some(self.tuning.hard_speed),
            DifficultyTier::Extreme => Some(self.tuning.extreme_speed),
        }
    }

    pub fn update(&mut self, session: &mut Session, hands: &[TrackedBody]) {
        if let Some(speed) = self.hoop_speed(session.scoring.tier) {
            for hoop in &mut self.hoops {
                hoop.step(speed, self.tuning.hoop_width);
            }
        }

        let now = session.elapsed;
        for (player, palm, _) in GameState::assign_hands(&session.zones, hands) {
            let Some(hoop) = self.hoops.get(player.index()) else {
                continue;
            };
            let rim = hoop.rim_center(self.tuning.rim_offset);
            if !self.detector.observe(player, palm, rim, now, &mut session.cooldowns) {
                continue;
            }

            session.emit(GameEvent::Basket { player, at: palm });
            if let Some((delta, tier)) = session.scoring.score(player, now) {
                log::info!("{} basket: +{} (combo {})", player, delta.points, delta.combo);
                session.record_score(delta, tier);
            }
            let style = BurstStyle::basket().with_count(self.tuning.burst_count);
            session.effects.burst(palm, player_color(player), &style);
        }
    }
}
