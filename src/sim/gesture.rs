//! Gesture classification from landmark motion
//!
//! Each classifier consumes either a motion history or the current landmark
//! set and reports at most one event per evaluation. Short buffers and
//! missing landmarks are "no event", never an error.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cooldown::{CooldownGate, EventKind};
use super::landmarks::{TrackedBody, hand};
use super::motion::{MotionBuffer, TrackedPoint};
use super::rect::Rect;
use super::zone::PlayerId;

// ── Basket pattern ─────────────────────────────────────────

/// Which way "down" points for the y values fed to the basket classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAxis {
    /// Camera/screen space: y grows downward, a fall increases y
    #[default]
    ScreenDown,
    /// Height above the floor: a fall decreases y
    Up,
}

impl VerticalAxis {
    /// Downward displacement from `from` to `to`
    #[inline]
    fn fall(self, from: f32, to: f32) -> f32 {
        match self {
            VerticalAxis::ScreenDown => to - from,
            VerticalAxis::Up => from - to,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BasketConfig {
    /// Samples examined at the end of the buffer
    pub window: usize,
    /// Total fall across the window must exceed this
    pub min_fall: f32,
    /// Distance from the rim center within which samples count
    pub rim_radius: f32,
    pub axis: VerticalAxis,
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            window: 3,
            min_fall: 15.0,
            rim_radius: 50.0,
            axis: VerticalAxis::ScreenDown,
        }
    }
}

/// Whether the tail of a motion history looks like a ball dropping through a hoop
///
/// Needs at least `window` samples; at least one downward step among them;
/// and a total fall greater than `min_fall`.
pub fn is_basket_pattern(samples: &[TrackedPoint], config: &BasketConfig) -> bool {
    let window = config.window.max(2);
    if samples.len() < window {
        return false;
    }
    let tail = &samples[samples.len() - window..];

    let descents = tail
        .windows(2)
        .filter(|w| config.axis.fall(w[0].pos.y, w[1].pos.y) > 0.0)
        .count();
    let total_fall = config.axis.fall(tail[0].pos.y, tail[window - 1].pos.y);

    descents >= 1 && total_fall > config.min_fall
}

/// Per-zone basket detection: buffers samples near the rim and fires once
/// per physical shot.
#[derive(Debug, Clone)]
pub struct BasketDetector {
    pub config: BasketConfig,
    buffers: Vec<MotionBuffer>,
}

impl BasketDetector {
    pub fn new(config: BasketConfig, players: usize, capacity: usize) -> Self {
        Self {
            config,
            buffers: (0..players.max(1)).map(|_| MotionBuffer::new(capacity)).collect(),
        }
    }

    pub fn buffer(&self, player: PlayerId) -> Option<&MotionBuffer> {
        self.buffers.get(player.index())
    }

    /// Feed one sample of the tracked point for `player`
    ///
    /// Samples are only buffered while the point is within the rim radius and
    /// the zone's cooldown allows. On a make the zone's buffer is cleared and
    /// the fire time recorded in `gate`.
    pub fn observe(
        &mut self,
        player: PlayerId,
        point: Vec2,
        rim_center: Vec2,
        now: f32,
        gate: &mut CooldownGate,
    ) -> bool {
        let Some(buffer) = self.buffers.get_mut(player.index()) else {
            return false;
        };
        if !crate::within_radius(point, rim_center, self.config.rim_radius) {
            return false;
        }
        if !gate.allows(player, EventKind::Basket, now) {
            return false;
        }

        buffer.push(TrackedPoint::new(point, now));
        let samples = buffer.recent(self.config.window);
        if is_basket_pattern(&samples, &self.config) {
            buffer.clear();
            gate.record(player, EventKind::Basket, now);
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }
}

// ── Jump ───────────────────────────────────────────────────

/// Jump detection from a single tracked height (hip center)
///
/// Keeps only the previous y and a frame cooldown, not a full buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpDetector {
    pub last_y: Option<f32>,
    /// Frames remaining before another jump can fire
    pub cooldown: u32,
    /// Upward displacement between consecutive frames (pixels)
    pub threshold: f32,
    /// Cooldown armed on each jump (frames)
    pub cooldown_frames: u32,
}

impl Default for JumpDetector {
    fn default() -> Self {
        Self::new(60.0, 15)
    }
}

impl JumpDetector {
    pub fn new(threshold: f32, cooldown_frames: u32) -> Self {
        Self {
            last_y: None,
            cooldown: 0,
            threshold,
            cooldown_frames,
        }
    }

    /// Feed this frame's screen-space y; returns true on a jump
    ///
    /// The cooldown counts down once per call whether or not a jump fired.
    pub fn update(&mut self, y: f32) -> bool {
        let mut jumped = false;
        if let Some(last_y) = self.last_y {
            if self.cooldown == 0 && last_y - y > self.threshold {
                jumped = true;
                self.cooldown = self.cooldown_frames;
            }
        }
        self.last_y = Some(y);
        self.cooldown = self.cooldown.saturating_sub(1);
        jumped
    }

    /// Frame with no detection for this player: only the cooldown advances
    pub fn idle(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.last_y = None;
        self.cooldown = 0;
    }
}

// ── Slice / touch ──────────────────────────────────────────

/// Default half-size of a hand hitbox
pub const HAND_HITBOX_HALF: f32 = 25.0;

/// Box hitbox around a landmark (±`half` on both axes)
#[inline]
pub fn hand_hitbox(center: Vec2, half: f32) -> Rect {
    Rect::centered(center, half)
}

/// Single-frame slice test between a hand hitbox and an object
#[inline]
pub fn slices(hitbox: &Rect, bounds: &Rect) -> bool {
    hitbox.intersects(bounds)
}

/// Single-frame touch test: any landmark of a pose inside the object
pub fn touches(points: &[Vec2], bounds: &Rect) -> bool {
    points.iter().any(|&p| bounds.contains_point(p))
}

// ── Thumb-up exit gesture ──────────────────────────────────

/// Thumb extended upward with the four other fingers folded
///
/// "Above" means smaller screen y. Hands with fewer than 21 points never match.
pub fn is_thumb_up(body: &TrackedBody) -> bool {
    if body.points.len() < hand::POINT_COUNT {
        return false;
    }
    let y = |i: usize| body.points[i].y;

    let thumb_extended = y(hand::THUMB_TIP) < y(hand::THUMB_IP) && y(hand::THUMB_IP) < y(hand::THUMB_MCP);
    let fingers_folded = hand::FINGER_TIPS_AND_PIPS
        .iter()
        .all(|&(tip, pip)| y(tip) > y(pip));

    thumb_extended && fingers_folded
}

/// Hysteresis counter that turns a per-frame thumb-up into a committed exit
///
/// +1 per matching frame, -2 per non-matching frame, floored at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitGesture {
    pub count: u32,
    pub threshold: u32,
}

impl Default for ExitGesture {
    fn default() -> Self {
        Self::new(30)
    }
}

impl ExitGesture {
    pub fn new(threshold: u32) -> Self {
        Self { count: 0, threshold }
    }

    /// Integrate one frame; returns true on the frame the threshold is reached
    pub fn update(&mut self, detected: bool) -> bool {
        if detected {
            self.count += 1;
        } else {
            self.count = self.count.saturating_sub(2);
        }
        if self.count >= self.threshold {
            self.count = 0;
            return true;
        }
        false
    }

    /// 0..1 progress for the HUD
    pub fn progress(&self) -> f32 {
        if self.threshold == 0 {
            return 0.0;
        }
        (self.count as f32 / self.threshold as f32).min(1.0)
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
