//! Player hit regions against live objects
//!
//! Objects are visited in id order and players in id order, so simultaneous
//! contacts resolve the same way on every run.

use glam::Vec2;

use super::rect::Rect;
use super::scoring::{ScoreDelta, ScoringEngine, TierChange};
use super::spawn::{GameObject, ObjectKind};
use super::zone::PlayerId;

/// What a player collides with this frame
#[derive(Debug, Clone, PartialEq)]
pub enum HitRegion {
    /// Hand hitbox (slicing)
    Box(Rect),
    /// Every landmark of a pose (touching)
    Points(Vec<Vec2>),
}

impl HitRegion {
    pub fn hits(&self, bounds: &Rect) -> bool {
        match self {
            HitRegion::Box(hitbox) => super::gesture::slices(hitbox, bounds),
            HitRegion::Points(points) => super::gesture::touches(points, bounds),
        }
    }
}

/// Gameplay consequence of a single contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// Fruit consumed for combo points
    Sliced {
        object: u32,
        at: Vec2,
        color: u32,
        delta: ScoreDelta,
        tier: Option<TierChange>,
    },
    /// Bomb or normal block killed the player
    Eliminated {
        object: u32,
        at: Vec2,
        kind: ObjectKind,
        player: PlayerId,
    },
    /// Special block moved half the opponent's score
    Stole {
        object: u32,
        at: Vec2,
        thief: PlayerId,
        victim: PlayerId,
        amount: u32,
    },
    /// Gold block armed a multiplier
    Multiplied {
        object: u32,
        at: Vec2,
        player: PlayerId,
        until: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    /// Multiplier duration armed by a gold block (seconds)
    pub multiplier_secs: f32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self { multiplier_secs: 5.0 }
    }
}

impl CollisionResolver {
    pub fn new(multiplier_secs: f32) -> Self {
        Self { multiplier_secs }
    }

    /// Resolve one frame of contacts
    ///
    /// `hits` holds at most one region per player. Consumed objects are marked
    /// Expired and dropped in a single compaction pass at the end; lethal
    /// blocks stay in play. Only one player dies per object per frame.
    pub fn resolve(
        &self,
        objects: &mut Vec<GameObject>,
        hits: &[(PlayerId, HitRegion)],
        scoring: &mut ScoringEngine,
        now: f32,
    ) -> Vec<Contact> {
        let mut ordered: Vec<&(PlayerId, HitRegion)> = hits.iter().collect();
        ordered.sort_by_key(|(id, _)| *id);

        let mut contacts = Vec::new();
        for obj in objects.iter_mut() {
            if !obj.is_active() {
                continue;
            }
            for (player, region) in ordered.iter().map(|(p, r)| (*p, r)) {
                if !scoring.is_alive(player) || !region.hits(&obj.bounds) {
                    continue;
                }
                obj.touched_by.insert(player);
                if let Some(contact) = self.apply(obj, player, scoring, now) {
                    contacts.push(contact);
                    break;
                }
            }
        }

        objects.retain(|o| !o.is_expired());
        contacts
    }

    /// Effect of `player` touching `obj`; Some ends this object's resolution
    fn apply(&self, obj: &mut GameObject, player: PlayerId, scoring: &mut ScoringEngine, now: f32) -> Option<Contact> {
        let at = obj.bounds.center();
        match obj.kind {
            ObjectKind::Fruit => {
                let (delta, tier) = scoring.score(player, now)?;
                obj.expire();
                let color = match obj.payload {
                    super::spawn::ObjectPayload::Projectile { color, .. } => color,
                    super::spawn::ObjectPayload::Block => 0xFFFFFF,
                };
                log::debug!("{} sliced object {} (+{})", player, obj.id, delta.points);
                Some(Contact::Sliced {
                    object: obj.id,
                    at,
                    color,
                    delta,
                    tier,
                })
            }
            ObjectKind::Bomb | ObjectKind::Normal => {
                if !scoring.eliminate(player, now) {
                    return None;
                }
                if obj.kind == ObjectKind::Bomb {
                    obj.expire();
                }
                Some(Contact::Eliminated {
                    object: obj.id,
                    at,
                    kind: obj.kind,
                    player,
                })
            }
            ObjectKind::Special => {
                let victim = opponent(player, scoring.players.len());
                let amount = victim.map(|v| scoring.steal(player, v)).unwrap_or(0);
                obj.expire();
                log::debug!("{} stole {} via object {}", player, amount, obj.id);
                Some(Contact::Stole {
                    object: obj.id,
                    at,
                    thief: player,
                    victim: victim.unwrap_or(player),
                    amount,
                })
            }
            ObjectKind::Gold => {
                let until = now + self.multiplier_secs;
                scoring.arm_multiplier(player, until);
                obj.expire();
                Some(Contact::Multiplied {
                    object: obj.id,
                    at,
                    player,
                    until,
                })
            }
        }
    }
}

/// The other player in a two-player session
pub fn opponent(player: PlayerId, player_count: usize) -> Option<PlayerId> {
    PlayerId::all(player_count).find(|&p| p != player)
}
