//! Landmark sources for headless runs
//!
//! `ReplaySource` plays back a recorded JSON array of frames. `SyntheticSource`
//! scripts plausible motion for each game so sessions can run without a
//! camera or tracker attached.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::path::Path;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::SIM_DT;
use crate::sim::landmarks::{LandmarkFrame, LandmarkSource, TrackedBody, TrackerKind, hand, pose};
use crate::sim::modes::GameKind;
use crate::sim::rect::Rect;
use crate::sim::zone::{Zone, ZonePartitioner};
use crate::tuning::Tuning;
use crate::{Error, Result};

// ── Replay ─────────────────────────────────────────────────

/// Recorded frames, converted to arena pixels on load
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: VecDeque<LandmarkFrame>,
    tracker: TrackerKind,
}

impl ReplaySource {
    /// Load a JSON array of frames; every frame must come from the same tracker
    pub fn load(path: &Path, arena: Rect) -> Result<Self> {
        let replay_error = |reason: String| Error::Replay {
            path: path.to_path_buf(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| replay_error(e.to_string()))?;
        let frames: Vec<LandmarkFrame> = serde_json::from_str(&contents).map_err(|e| replay_error(e.to_string()))?;
        let source = Self::from_frames(frames, arena).map_err(replay_error)?;
        log::info!(
            "Loaded replay {} ({} {:?} frames)",
            path.display(),
            source.remaining(),
            source.tracker
        );
        Ok(source)
    }

    pub fn from_frames(frames: Vec<LandmarkFrame>, arena: Rect) -> std::result::Result<Self, String> {
        let Some(first) = frames.first() else {
            return Err("no frames".to_string());
        };
        let tracker = first.tracker;
        if let Some(i) = frames.iter().position(|f| f.tracker != tracker) {
            return Err(format!("frame {i} is {:?}, expected {:?}", frames[i].tracker, tracker));
        }
        let frames = frames
            .into_iter()
            .map(|f| f.into_pixels(arena.w, arena.h))
            .collect();
        Ok(Self { frames, tracker })
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkSource for ReplaySource {
    fn poll(&mut self) -> Option<LandmarkFrame> {
        self.frames.pop_front()
    }

    fn tracker(&self) -> TrackerKind {
        self.tracker
    }
}

// ── Synthetic ──────────────────────────────────────────────

/// Basketball: frames between drops through the rim
const SHOT_PERIOD: u64 = 100;
/// Tower: frames between jumps
const JUMP_PERIOD: u64 = 80;
const JUMP_HEIGHT: f32 = 80.0;

/// Scripted players for one game, one body per zone
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    game: GameKind,
    zones: Vec<Zone>,
    arena: Rect,
    /// Rim centers per player (basketball only)
    rims: Vec<Vec2>,
    frame: u64,
    limit: Option<u64>,
    /// Small positional noise, like a real tracker
    rng: Pcg32,
}

impl SyntheticSource {
    pub fn new(game: GameKind, player_count: usize, arena: Rect, tuning: &Tuning, seed: u64) -> Self {
        let b = &tuning.basketball;
        let rims = b
            .hoop_starts
            .iter()
            .map(|&(x, y)| Vec2::new(x + b.rim_offset.0, y + b.rim_offset.1))
            .collect();
        Self {
            game,
            zones: ZonePartitioner::for_players(player_count, arena).zones(),
            arena,
            rims,
            frame: 0,
            limit: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Stop after `frames` polls
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    fn jitter(&mut self) -> Vec2 {
        Vec2::new(self.rng.random_range(-1.5..=1.5), self.rng.random_range(-1.5..=1.5))
    }

    fn basketball(&mut self, i: usize, zone: &Zone) -> Option<TrackedBody> {
        let rim = *self.rims.get(i)?;
        // Stagger players so their shots don't land on the same frame
        let phase = (self.frame + i as u64 * 37) % SHOT_PERIOD;
        let palm = match phase {
            // Drop through the rim over six frames
            60..66 => rim + Vec2::new(0.0, -30.0 + (phase - 60) as f32 * 10.0),
            // Wind up below and beside the hoop
            _ => Vec2::new(zone.bounds.center().x, rim.y + 250.0),
        };
        Some(open_hand(i as u32, palm + self.jitter()))
    }

    fn fruit(&mut self, i: usize, zone: &Zone) -> TrackedBody {
        let t = self.frame as f32 * SIM_DT;
        let c = zone.bounds.center();
        let palm = c + Vec2::new(
            (t * 2.0 + i as f32).sin() * zone.bounds.w * 0.4,
            (t * 3.0).cos() * zone.bounds.h * 0.3,
        );
        open_hand(i as u32, palm + self.jitter())
    }

    fn dodge(&mut self, i: usize, zone: &Zone) -> TrackedBody {
        let t = self.frame as f32 * SIM_DT;
        let hip = Vec2::new(
            zone.bounds.center().x + (t * TAU / 5.0).sin() * 120.0,
            self.arena.bottom() - 150.0,
        );
        standing_pose(i as u32, hip + self.jitter())
    }

    fn tower(&mut self, i: usize, zone: &Zone) -> TrackedBody {
        let mut hip = Vec2::new(zone.bounds.center().x, self.arena.bottom() - 150.0);
        if (self.frame + i as u64 * 23) % JUMP_PERIOD == 0 {
            hip.y -= JUMP_HEIGHT;
        }
        standing_pose(i as u32, hip + self.jitter())
    }
}

impl LandmarkSource for SyntheticSource {
    fn poll(&mut self) -> Option<LandmarkFrame> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return None;
        }
        let zones = self.zones.clone();
        let mut bodies = Vec::with_capacity(zones.len());
        for (i, zone) in zones.iter().enumerate() {
            let body = match self.game {
                GameKind::Basketball => self.basketball(i, zone),
                GameKind::Fruit => Some(self.fruit(i, zone)),
                GameKind::Dodge => Some(self.dodge(i, zone)),
                GameKind::Tower => Some(self.tower(i, zone)),
            };
            bodies.extend(body);
        }
        self.frame += 1;
        Some(LandmarkFrame::new(self.tracker(), bodies))
    }

    fn tracker(&self) -> TrackerKind {
        self.game.tracker()
    }
}

/// Open palm facing the camera: fingers up, thumb out to the side
fn open_hand(id: u32, palm: Vec2) -> TrackedBody {
    let mut points = vec![palm; hand::POINT_COUNT];
    points[hand::WRIST] = palm + Vec2::new(0.0, 40.0);
    points[hand::THUMB_MCP] = palm + Vec2::new(-25.0, 10.0);
    points[hand::THUMB_IP] = palm + Vec2::new(-40.0, 0.0);
    points[hand::THUMB_TIP] = palm + Vec2::new(-55.0, -5.0);
    for (n, (tip, pip)) in hand::FINGER_TIPS_AND_PIPS.into_iter().enumerate() {
        let x = -15.0 + n as f32 * 15.0;
        points[pip] = palm + Vec2::new(x, -30.0);
        points[tip] = palm + Vec2::new(x, -60.0);
    }
    points[hand::MIDDLE_MCP] = palm;
    TrackedBody::new(id, points)
}

/// Upright body around a hip center
fn standing_pose(id: u32, hip: Vec2) -> TrackedBody {
    let mut points = vec![hip + Vec2::new(0.0, -100.0); pose::POINT_COUNT];
    points[pose::NOSE] = hip + Vec2::new(0.0, -250.0);
    points[pose::LEFT_SHOULDER] = hip + Vec2::new(40.0, -180.0);
    points[pose::RIGHT_SHOULDER] = hip + Vec2::new(-40.0, -180.0);
    points[pose::LEFT_WRIST] = hip + Vec2::new(60.0, -80.0);
    points[pose::RIGHT_WRIST] = hip + Vec2::new(-60.0, -80.0);
    points[pose::LEFT_HIP] = hip + Vec2::new(20.0, 0.0);
    points[pose::RIGHT_HIP] = hip + Vec2::new(-20.0, 0.0);
    TrackedBody::new(id, points)
}
