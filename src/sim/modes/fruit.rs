//! Fruit slicing
//!
//! Fruit and bombs fall through each alive player's zone; a palm hitbox
//! slices whatever it overlaps. Fall speed and bomb share rise every level.

use crate::Result;
use crate::sim::collision::{CollisionResolver, HitRegion};
use crate::sim::gesture::hand_hitbox;
use crate::sim::landmarks::TrackedBody;
use crate::sim::motion::{MotionBuffer, TrackedPoint};
use crate::sim::scoring::ScoringRules;
use crate::sim::spawn::{IntervalRamp, KindTable, Lifetime, ObjectKind, Placement, ProjectileMotion, SpawnScheduler};
use crate::sim::state::{GameState, Session};
use crate::sim::zone::PlayerId;
use crate::tuning::FruitTuning;

#[derive(Debug, Clone)]
pub struct FruitMode {
    pub tuning: FruitTuning,
    spawner: SpawnScheduler,
    resolver: CollisionResolver,
    level: u32,
    /// Recent palm positions per player (sword trail)
    pub trails: Vec<MotionBuffer>,
}

impl FruitMode {
    pub fn new(tuning: FruitTuning, player_count: usize) -> Result<Self> {
        let spawner = SpawnScheduler::new(
            IntervalRamp::fixed(tuning.spawn_interval_secs),
            Self::kind_table(&tuning, 0)?,
            Placement {
                size: (tuning.object_size, tuning.object_size),
                margin_x: tuning.margin,
                margin_y: (0.0, 0.0),
                drop_from: Some(tuning.drop_from),
            },
            Lifetime {
                warning: 0.0,
                active: None,
            },
        )
        .with_motion(Self::motion(&tuning, 0), tuning.palette.clone());

        let mut mode = Self {
            tuning,
            spawner,
            resolver: CollisionResolver::default(),
            level: 0,
            trails: Vec::new(),
        };
        mode.reset(player_count);
        Ok(mode)
    }

    /// Fruit/bomb split for a level, in per-mille weights
    fn kind_table(tuning: &FruitTuning, level: u32) -> Result<KindTable> {
        let bombs = (tuning.bomb_chance_at(level).clamp(0.0, 1.0) * 1000.0).round() as u32;
        KindTable::new(&[(ObjectKind::Fruit, 1000 - bombs), (ObjectKind::Bomb, bombs)])
    }

    fn motion(tuning: &FruitTuning, level: u32) -> ProjectileMotion {
        let (speed_min, speed_max) = tuning.speed_range(level);
        ProjectileMotion {
            speed_min,
            speed_max,
            spin: tuning.spin,
        }
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            combo_window: self.tuning.combo_window,
            base_points: 1,
            combo_cap: self.tuning.combo_cap,
            ..Default::default()
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn reset(&mut self, player_count: usize) {
        self.spawner.reset();
        self.set_level(0);
        self.trails = PlayerId::all(player_count)
            .map(|_| MotionBuffer::new(self.tuning.trail_length))
            .collect();
    }

    fn set_level(&mut self, level: u32) {
        match Self::kind_table(&self.tuning, level) {
            Ok(table) => self.spawner.set_table(table),
            Err(e) => log::warn!("Keeping previous fruit table: {e}"),
        }
        self.spawner.set_motion(Self::motion(&self.tuning, level));
        if level != self.level {
            log::info!("Fruit level {} (bomb chance {:.2})", level, self.tuning.bomb_chance_at(level));
        }
        self.level = level;
    }

    pub fn update(&mut self, session: &mut Session, hands: &[TrackedBody]) {
        let now = session.elapsed;
        let level = self.tuning.level(now);
        if level != self.level {
            self.set_level(level);
        }

        let targets = session.alive_targets();
        session.spawn(&mut self.spawner, &targets);

        let lifetime = self.spawner.lifetime;
        let arena = session.arena;
        for obj in &mut session.objects {
            obj.advance(now, &lifetime, &arena);
        }

        let mut hits = Vec::new();
        for (player, palm, _) in GameState::assign_hands(&session.zones, hands) {
            if !session.scoring.is_alive(player) {
                continue;
            }
            if let Some(trail) = self.trails.get_mut(player.index()) {
                trail.push(TrackedPoint::new(palm, now));
            }
            hits.push((player, HitRegion::Box(hand_hitbox(palm, self.tuning.hitbox_half))));
        }

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
    use crate::sim::landmarks::hand;
    use crate::sim::rect::Rect;
    use crate::sim::spawn::{GameObject, ObjectPayload, ObjectState};
    use crate::sim::state::GameEvent;

    fn session(mode: &FruitMode, players: usize) -> Session {
        Session::new(
            5,
            players,
            Rect::new(0.0, 0.0, 1280.0, 720.0),
            mode.scoring_rules(),
            CooldownGate::new(),
            180.0,
            500,
        )
    }

    fn falling(id: u32, kind: ObjectKind, x: f32, y: f32) -> GameObject {
        GameObject {
            id,
            kind,
            payload: ObjectPayload::Projectile {
                speed: 0.0,
                spin: 0.0,
                rotation: 0.0,
                color: 0xFFD700,
            },
            bounds: Rect::new(x, y, 40.0, 40.0),
            spawn_time: 0.0,
            state: ObjectState::Active,
            active_since: Some(0.0),
            touched_by: BTreeSet::new(),
            zone: None,
        }
    }

    fn palm_at(p: Vec2) -> TrackedBody {
        let mut points = vec![Vec2::ZERO; hand::POINT_COUNT];
        points[hand::MIDDLE_MCP] = p;
        TrackedBody::new(0, points)
    }

    #[test]
    fn test_spawns_fall_inside_alive_zones() {
        let mut mode = FruitMode::new(FruitTuning::default(), 2).unwrap();
        let mut s = session(&mode, 2);
        s.scoring.eliminate(PlayerId::ONE, 0.0);
        for frame in 0..120 {
            s.elapsed = frame as f32 / 60.0;
            mode.update(&mut s, &[]);
        }
        assert!(!s.objects.is_empty());
        for obj in &s.objects {
            assert_eq!(obj.zone, Some(PlayerId::TWO));
            assert!(obj.bounds.x >= 690.0);
        }
    }

    #[test]
    fn test_slice_combo_and_bomb() {
        let mut mode = FruitMode::new(FruitTuning::default(), 1).unwrap();
        let mut s = session(&mode, 1);
        s.objects.push(falling(100, ObjectKind::Fruit, 300.0, 300.0));
        s.objects.push(falling(101, ObjectKind::Fruit, 300.0, 500.0));

        s.elapsed = 0.01;
        mode.update(&mut s, &[palm_at(Vec2::new(320.0, 320.0))]);
        s.elapsed = 0.5;
        mode.update(&mut s, &[palm_at(Vec2::new(320.0, 520.0))]);

        let p1 = s.scoring.player(PlayerId::ONE).unwrap();
        assert_eq!(p1.combo, 2);
        assert_eq!(p1.score, 1 + 2);
        assert!(s.objects.iter().all(|o| o.id != 100 && o.id != 101));
        assert_eq!(mode.trails[0].len(), 2);

        s.objects.push(falling(102, ObjectKind::Bomb, 600.0, 300.0));
        s.elapsed = 0.6;
        mode.update(&mut s, &[palm_at(Vec2::new(610.0, 310.0))]);
        assert!(s.scoring.all_eliminated());
        assert!(s.events.contains(&GameEvent::Eliminated {
            player: PlayerId::ONE,
            cause: Some(ObjectKind::Bomb)
        }));
    }

    #[test]
    fn test_level_raises_bomb_share() {
        let mut mode = FruitMode::new(FruitTuning::default(), 1).unwrap();
        let mut s = session(&mode, 1);
        assert!((mode.spawner.table.share(ObjectKind::Bomb) - 0.2).abs() < 1e-3);
        s.elapsed = 61.0;
        mode.update(&mut s, &[]);
        assert_eq!(mode.level(), 2);
        assert!((mode.spawner.table.share(ObjectKind::Bomb) - 0.4).abs() < 1e-3);
    }
}
