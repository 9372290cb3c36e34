//! Block dodging
//!
//! Batches of blocks flash a warning, go live, then expire. Any pose landmark
//! inside a live block counts as a touch. Surviving a block pays out.

use crate::Result;
use crate::sim::collision::{CollisionResolver, HitRegion};
use crate::sim::landmarks::TrackedBody;
use crate::sim::spawn::{KindTable, Lifetime, Placement, SpawnScheduler, SpawnTarget};
use crate::sim::state::{GameEvent, GameState, Session};
use crate::tuning::DodgeTuning;

#[derive(Debug, Clone)]
pub struct DodgeMode {
    pub tuning: DodgeTuning,
    spawner: SpawnScheduler,
    resolver: CollisionResolver,
}

impl DodgeMode {
    pub fn new(tuning: DodgeTuning) -> Result<Self> {
        let size = tuning.block_size;
        let spawner = SpawnScheduler::new(
            tuning.interval,
            KindTable::new(&tuning.kinds)?,
            Placement {
                size: (size, size),
                margin_x: tuning.margin_x,
                margin_y: tuning.margin_y,
                drop_from: None,
            },
            Lifetime {
                warning: tuning.warning_secs,
                active: Some(tuning.active_secs),
            },
        )
        .with_batch(tuning.batch.0, tuning.batch.1);
        Ok(Self {
            resolver: CollisionResolver::new(tuning.multiplier_secs),
            tuning,
            spawner,
        })
    }

    pub fn reset(&mut self) {
        self.spawner.reset();
    }

    pub fn update(&mut self, session: &mut Session, poses: &[TrackedBody]) {
        let now = session.elapsed;

        // Blocks land anywhere on screen while someone is still standing
        let targets = if session.scoring.alive_players().next().is_some() {
            vec![SpawnTarget {
                zone: None,
                area: session.arena,
            }]
        } else {
            Vec::new()
        };
        session.spawn(&mut self.spawner, &targets);

        let lifetime = self.spawner.lifetime;
        let arena = session.arena;
        let mut survived = Vec::new();
        for obj in &mut session.objects {
            if obj.advance(now, &lifetime, &arena) {
                survived.push(obj.touched_by.clone());
            }
        }
        for touched in survived {
            let dodgers: Vec<_> = session
                .scoring
                .alive_players()
                .filter(|p| !touched.contains(p))
                .collect();
            for player in dodgers {
                if let Some(points) = session.award(player, self.tuning.avoid_points) {
                    session.emit(GameEvent::Avoided { player, points });
                }
            }
        }

        let hits: Vec<_> = GameState::assign_bodies(&session.zones, poses, TrackedBody::hip_center)
            .into_iter()
            .map(|(player, _, body)| (player, HitRegion::Points(body.points.clone())))
            .collect();
        let contacts = self.resolver.resolve(&mut session.objects, &hits, &mut session.scoring, now);
        super::report_contacts(session, contacts);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::Vec2;

    use super::*;
    use crate::sim::cooldown::CooldownGate;
    use crate::sim::landmarks::pose;
    use crate::sim::rect::Rect;
    use crate::sim::scoring::ScoringRules;
    use crate::sim::spawn::{GameObject, ObjectKind, ObjectPayload, ObjectState};
    use crate::sim::zone::PlayerId;

    fn session(players: usize) -> Session {
        Session::new(
            11,
            players,
            Rect::new(0.0, 0.0, 1280.0, 720.0),
            ScoringRules::default(),
            CooldownGate::new(),
            180.0,
            500,
        )
    }

    fn block(id: u32, kind: ObjectKind, x: f32) -> GameObject {
        GameObject {
            id,
            kind,
            payload: ObjectPayload::Block,
            bounds: Rect::new(x, 300.0, 100.0, 100.0),
            spawn_time: 0.0,
            state: ObjectState::Warning,
            active_since: None,
            touched_by: BTreeSet::new(),
            zone: None,
        }
    }

    /// Pose with hips at `hip` and a wrist at `wrist`
    fn pose_at(hip: Vec2, wrist: Vec2) -> TrackedBody {
        let mut points = vec![hip; pose::POINT_COUNT];
        points[pose::RIGHT_WRIST] = wrist;
        TrackedBody::new(0, points)
    }

    #[test]
    fn test_expiry_pays_non_touchers() {
        let mut mode = DodgeMode::new(DodgeTuning::default()).unwrap();
        let mut s = session(2);
        s.objects.push(block(100, ObjectKind::Normal, 300.0));
        s.objects.push(block(101, ObjectKind::Normal, 900.0));

        // Warning ends at 1.0; player 2's wrist sits in block 101 once live
        let poses = [
            pose_at(Vec2::new(200.0, 600.0), Vec2::new(100.0, 100.0)),
            pose_at(Vec2::new(1000.0, 600.0), Vec2::new(950.0, 350.0)),
        ];
        s.elapsed = 1.0;
        mode.update(&mut s, &poses);
        assert!(!s.scoring.is_alive(PlayerId::TWO));

        s.elapsed = 2.2;
        mode.update(&mut s, &poses);
        // Player 1 avoided both blocks; player 2 is out
        assert_eq!(s.scoring.player(PlayerId::ONE).unwrap().score, 2);
        assert_eq!(s.scoring.player(PlayerId::TWO).unwrap().score, 0);
        assert!(s.objects.iter().all(|o| o.id < 100));
    }

    #[test]
    fn test_gold_doubles_avoidance() {
        let mut mode = DodgeMode::new(DodgeTuning::default()).unwrap();
        let mut s = session(1);
        s.objects.push(block(100, ObjectKind::Gold, 300.0));
        s.objects.push(block(101, ObjectKind::Normal, 900.0));
        let touching_gold = [pose_at(Vec2::new(200.0, 600.0), Vec2::new(350.0, 350.0))];

        s.elapsed = 1.0;
        mode.update(&mut s, &touching_gold);
        assert!(s.events.iter().any(|e| matches!(e, GameEvent::MultiplierArmed { player: PlayerId::ONE, .. })));

        s.elapsed = 2.2;
        mode.update(&mut s, &[]);
        assert!(s.events.contains(&GameEvent::Avoided {
            player: PlayerId::ONE,
            points: 2
        }));
    }

    #[test]
    fn test_warning_blocks_harmless() {
        let mut mode = DodgeMode::new(DodgeTuning::default()).unwrap();
        let mut s = session(1);
        s.objects.push(block(100, ObjectKind::Normal, 300.0));
        s.elapsed = 0.5;
        mode.update(&mut s, &[pose_at(Vec2::new(350.0, 350.0), Vec2::new(350.0, 350.0))]);
        assert!(s.scoring.is_alive(PlayerId::ONE));
    }
}
