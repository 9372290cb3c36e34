//! Zone partitioning for split-screen play
//!
//! Maps a screen-space point to the player who owns that part of the screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Player slot identity (1-based, ordered for deterministic resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const ONE: PlayerId = PlayerId(1);
    pub const TWO: PlayerId = PlayerId(2);

    /// Zero-based slot index
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0.saturating_sub(1))
    }

    /// Player ids for a session of `count` players, in id order
    pub fn all(count: usize) -> impl Iterator<Item = PlayerId> {
        (1..=count.min(crate::consts::MAX_PLAYERS) as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// How the screen is split between players
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoneLayout {
    /// The whole arena belongs to player 1
    Single,
    /// Left of the midline is player 1, the rest player 2
    SplitVertical { midline_x: f32 },
}

/// Screen-space partition owned by one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub player: PlayerId,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonePartitioner {
    pub layout: ZoneLayout,
    pub arena: Rect,
}

impl ZonePartitioner {
    /// Layout for a player count: one player owns everything, two split at the midline
    pub fn for_players(count: usize, arena: Rect) -> Self {
        let layout = if count >= 2 {
            ZoneLayout::SplitVertical {
                midline_x: arena.x + arena.w / 2.0,
            }
        } else {
            ZoneLayout::Single
        };
        Self { layout, arena }
    }

    pub fn player_count(&self) -> usize {
        match self.layout {
            ZoneLayout::Single => 1,
            ZoneLayout::SplitVertical { .. } => 2,
        }
    }

    /// Owner of a point; points outside the arena belong to nobody
    pub fn player_at(&self, p: Vec2) -> Option<PlayerId> {
        if !self.arena.contains_point(p) {
            return None;
        }
        match self.layout {
            ZoneLayout::Single => Some(PlayerId::ONE),
            ZoneLayout::SplitVertical { midline_x } => {
                if p.x < midline_x {
                    Some(PlayerId::ONE)
                } else {
                    Some(PlayerId::TWO)
                }
            }
        }
    }

    /// Screen bounds of a player's zone
    pub fn zone(&self, player: PlayerId) -> Option<Zone> {
        let a = self.arena;
        let bounds = match (self.layout, player) {
            (ZoneLayout::Single, PlayerId::ONE) => a,
            (ZoneLayout::SplitVertical { midline_x }, PlayerId::ONE) => {
                Rect::new(a.x, a.y, midline_x - a.x, a.h)
            }
            (ZoneLayout::SplitVertical { midline_x }, PlayerId::TWO) => {
                Rect::new(midline_x, a.y, a.right() - midline_x, a.h)
            }
            _ => return None,
        };
        Some(Zone { player, bounds })
    }

    /// All zones in player-id order
    pub fn zones(&self) -> Vec<Zone> {
        PlayerId::all(self.player_count())
            .filter_map(|p| self.zone(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Rect {
        Rect::new(0.0, 0.0, 1280.0, 720.0)
    }

    #[test]
    fn test_single_layout_owns_everything() {
        let zones = ZonePartitioner::for_players(1, arena());
        assert_eq!(zones.player_at(Vec2::new(10.0, 10.0)), Some(PlayerId::ONE));
        assert_eq!(zones.player_at(Vec2::new(1270.0, 700.0)), Some(PlayerId::ONE));
        assert!(zones.zone(PlayerId::TWO).is_none());
    }

    #[test]
    fn test_split_midline() {
        let zones = ZonePartitioner::for_players(2, arena());
        assert_eq!(zones.player_at(Vec2::new(639.9, 300.0)), Some(PlayerId::ONE));
        // Midline itself belongs to the right-hand player
        assert_eq!(zones.player_at(Vec2::new(640.0, 300.0)), Some(PlayerId::TWO));
        assert_eq!(zones.player_at(Vec2::new(-5.0, 300.0)), None);

        let right = zones.zone(PlayerId::TWO).unwrap();
        assert_eq!(right.bounds, Rect::new(640.0, 0.0, 640.0, 720.0));
    }

    #[test]
    fn test_player_ids_ordered() {
        let ids: Vec<PlayerId> = PlayerId::all(2).collect();
        assert_eq!(ids, vec![PlayerId::ONE, PlayerId::TWO]);
        assert_eq!(PlayerId::TWO.index(), 1);
        assert_eq!(PlayerId::all(5).count(), 2);
    }
}
