//! Landmark frames supplied by the external pose/hand tracker
//!
//! A tracker delivers, once per camera frame, a possibly-empty list of tracked
//! bodies. Each body is an ordered list of 2D points whose indices carry a
//! fixed meaning for that tracker type (21-point hand, 33-point pose).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 21-point hand model indices
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    /// Middle finger MCP, used as the palm center
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;

    pub const POINT_COUNT: usize = 21;

    /// (tip, pip) pairs for the four non-thumb fingers
    pub const FINGER_TIPS_AND_PIPS: [(usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];
}

/// 33-point pose model indices
pub mod pose {
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;

    pub const POINT_COUNT: usize = 33;
}

/// Which landmark model produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    Hand,
    Pose,
}

/// Coordinate space of the points in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSpace {
    /// Camera pixels
    #[default]
    Pixels,
    /// [0, 1] on both axes
    Normalized,
}

/// One tracked hand or body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedBody {
    pub id: u32,
    pub points: Vec<Vec2>,
}

impl TrackedBody {
    pub fn new(id: u32, points: Vec<Vec2>) -> Self {
        Self { id, points }
    }

    /// Point by semantic index; `None` when the tracker returned a short list
    #[inline]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// Hip center for pose bodies
    pub fn hip_center(&self) -> Option<Vec2> {
        let left = self.point(pose::LEFT_HIP)?;
        let right = self.point(pose::RIGHT_HIP)?;
        Some(crate::midpoint(left, right))
    }

    /// Palm center for hand bodies
    pub fn palm_center(&self) -> Option<Vec2> {
        self.point(hand::MIDDLE_MCP)
    }
}

/// Everything the tracker produced for one camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub tracker: TrackerKind,
    #[serde(default)]
    pub space: CoordSpace,
    #[serde(default)]
    pub bodies: Vec<TrackedBody>,
}

impl LandmarkFrame {
    /// A frame already in pixel coordinates
    pub fn new(tracker: TrackerKind, bodies: Vec<TrackedBody>) -> Self {
        Self {
            tracker,
            space: CoordSpace::Pixels,
            bodies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Convert to pixel coordinates for an arena of the given size
    pub fn into_pixels(mut self, width: f32, height: f32) -> Self {
        if self.space == CoordSpace::Normalized {
            let scale = Vec2::new(width, height);
            for body in &mut self.bodies {
                for p in &mut body.points {
                    *p *= scale;
                }
            }
            self.space = CoordSpace::Pixels;
        }
        self
    }
}

/// Anything that can be polled once per frame for landmarks
///
/// `None` means the source is exhausted (camera closed, replay finished);
/// an empty frame means nothing was detected this frame.
pub trait LandmarkSource {
    fn poll(&mut self) -> Option<LandmarkFrame>;

    /// Which tracker model this source produces
    fn tracker(&self) -> TrackerKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_yields_none() {
        let body = TrackedBody::new(0, vec![Vec2::ZERO; 5]);
        assert!(body.palm_center().is_none());
        assert!(body.hip_center().is_none());
        assert_eq!(body.point(4), Some(Vec2::ZERO));
    }

    #[test]
    fn test_hip_center() {
        let mut points = vec![Vec2::ZERO; pose::POINT_COUNT];
        points[pose::LEFT_HIP] = Vec2::new(100.0, 400.0);
        points[pose::RIGHT_HIP] = Vec2::new(200.0, 420.0);
        let body = TrackedBody::new(1, points);
        assert_eq!(body.hip_center(), Some(Vec2::new(150.0, 410.0)));
    }

    #[test]
    fn test_normalized_to_pixels() {
        let frame = LandmarkFrame {
            tracker: TrackerKind::Hand,
            space: CoordSpace::Normalized,
            bodies: vec![TrackedBody::new(0, vec![Vec2::new(0.5, 0.25)])],
        };
        let frame = frame.into_pixels(1280.0, 720.0);
        assert_eq!(frame.space, CoordSpace::Pixels);
        assert_eq!(frame.bodies[0].points[0], Vec2::new(640.0, 180.0));
    }

    #[test]
    fn test_frame_json_defaults() {
        let frame: LandmarkFrame = serde_json::from_str(r#"{"tracker":"pose"}"#).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.space, CoordSpace::Pixels);
    }
}
