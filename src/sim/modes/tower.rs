//! Tower stacking
//!
//! A block slides back and forth across each player's zone. Jumping drops it
//! onto the player's tower, trimmed to the part that overlaps the top block.
//! Missing the tower entirely ends that player's run.

use serde::{Deserialize, Serialize};

use crate::sim::gesture::JumpDetector;
use crate::sim::landmarks::TrackedBody;
use crate::sim::rect::Rect;
use crate::sim::state::{GameEvent, GameState, Session};
use crate::sim::zone::{PlayerId, ZonePartitioner};
use crate::tuning::TowerTuning;

/// One player's slider and tower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerLane {
    pub player: PlayerId,
    pub zone: Rect,
    pub slider: Rect,
    /// +1 moving right, -1 moving left
    pub dir: f32,
    /// Placed blocks, bottom first
    pub stack: Vec<Rect>,
    pub jump: JumpDetector,
}

impl TowerLane {
    fn new(player: PlayerId, zone: Rect, arena: &Rect, tuning: &TowerTuning) -> Self {
        Self {
            player,
            zone,
            slider: Rect::new(
                zone.x,
                arena.bottom() - tuning.base_offset,
                tuning.block_width,
                tuning.block_height,
            ),
            dir: 1.0,
            stack: Vec::new(),
            jump: JumpDetector::new(tuning.jump_threshold, tuning.jump_cooldown_frames),
        }
    }

    /// Slide one frame, bouncing off the zone edges
    pub fn slide(&mut self, speed: f32) {
        self.slider.x += speed * self.dir;
        if self.slider.x <= self.zone.x || self.slider.right() >= self.zone.right() {
            self.dir = -self.dir;
        }
    }

    /// Drop the slider onto the tower
    ///
    /// Returns the placed block, or None when it misses the top block.
    pub fn drop_block(&mut self, arena: &Rect, tuning: &TowerTuning) -> Option<Rect> {
        let placed = match self.stack.last() {
            None => self.slider,
            Some(top) => {
                let (x, w) = self.slider.horizontal_overlap(top)?;
                Rect::new(x, top.y - self.slider.h, w, self.slider.h)
            }
        };
        self.stack.push(placed);
        self.slider = Rect::new(
            self.zone.x + tuning.start_inset,
            arena.bottom() - tuning.base_offset,
            placed.w.max(tuning.min_block_width),
            tuning.block_height,
        );
        self.dir = 1.0;
        Some(placed)
    }
}

#[derive(Debug, Clone)]
pub struct TowerMode {
    pub tuning: TowerTuning,
    pub lanes: Vec<TowerLane>,
}

impl TowerMode {
    pub fn new(tuning: TowerTuning, player_count: usize, arena: Rect) -> Self {
        let mut mode = Self {
            tuning,
            lanes: Vec::new(),
        };
        mode.reset(player_count, arena);
        mode
    }

    pub fn reset(&mut self, player_count: usize, arena: Rect) {
        let zones = ZonePartitioner::for_players(player_count, arena);
        self.lanes = zones
            .zones()
            .into_iter()
            .map(|z| TowerLane::new(z.player, z.bounds, &arena, &self.tuning))
            .collect();
    }

    pub fn update(&mut self, session: &mut Session, poses: &[TrackedBody]) {
        let hips = GameState::assign_bodies(&session.zones, poses, TrackedBody::hip_center);
        let speed = self.tuning.speed_at(session.elapsed);
        let arena = session.arena;

        for lane in &mut self.lanes {
            let player = lane.player;
            if !session.scoring.is_alive(player) {
                continue;
            }
            let jumped = match hips.iter().find(|(p, _, _)| *p == player) {
                Some((_, hip, _)) => lane.jump.update(hip.y),
                None => {
                    lane.jump.idle();
                    false
                }
            };

            if jumped {
                session.emit(GameEvent::Jump { player });
                match lane.drop_block(&arena, &self.tuning) {
                    Some(block) => {
                        session.emit(GameEvent::Stacked {
                            player,
                            width: block.w,
                            height: lane.stack.len(),
                        });
                        session.award(player, 1);
                    }
                    None => {
                        if session.scoring.eliminate(player, session.elapsed) {
                            session.emit(GameEvent::Eliminated { player, cause: None });
                        }
                        continue;
                    }
                }
            }
            lane.slide(speed);
        }
    }
}
