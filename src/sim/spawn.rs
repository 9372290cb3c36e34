//! Time-driven spawning of transient game objects
//!
//! The spawn interval is drawn from a range that narrows with elapsed time
//! down to a floor. Objects pass through Warning before becoming Active and
//! expire after their active lifetime (blocks) or when they leave the arena
//! (projectiles).

use std::collections::BTreeSet;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::zone::PlayerId;
use crate::{Error, Result, has_elapsed};

/// Object kinds across all games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Dodge block: lethal on touch
    Normal,
    /// Dodge block: arms a scoring multiplier
    Gold,
    /// Dodge block: steals half the opponent's score
    Special,
    /// Falling bomb: lethal on slice
    Bomb,
    /// Falling fruit: scores on slice
    Fruit,
}

/// Kind-specific data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectPayload {
    /// Static block with a timed lifecycle
    Block,
    /// Falling object; speed in px/frame, spin in degrees/frame
    Projectile {
        speed: f32,
        spin: f32,
        rotation: f32,
        color: u32,
    },
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectState {
    /// Visible but not collidable
    Warning,
    Active,
    /// Marked for removal at the end of the frame
    Expired,
}

/// A spawned entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    pub id: u32,
    pub kind: ObjectKind,
    pub payload: ObjectPayload,
    pub bounds: Rect,
    pub spawn_time: f32,
    pub state: ObjectState,
    /// Time the object became Active
    pub active_since: Option<f32>,
    pub touched_by: BTreeSet<PlayerId>,
    /// Zone the object was spawned into (None = whole arena)
    pub zone: Option<PlayerId>,
}

impl GameObject {
    pub fn is_active(&self) -> bool {
        self.state == ObjectState::Active
    }

    pub fn is_expired(&self) -> bool {
        self.state == ObjectState::Expired
    }

    pub fn expire(&mut self) {
        self.state = ObjectState::Expired;
    }

    /// Advance lifecycle timers and projectile motion for one frame
    ///
    /// Returns true on the frame a block's active lifetime runs out (the
    /// caller awards avoidance points before compaction).
    pub fn advance(&mut self, now: f32, lifetime: &Lifetime, arena: &Rect) -> bool {
        if self.state == ObjectState::Warning && has_elapsed(now, self.spawn_time, lifetime.warning) {
            self.state = ObjectState::Active;
            self.active_since = Some(now);
        }

        match &mut self.payload {
            ObjectPayload::Block => {
                if let (ObjectState::Active, Some(since), Some(active)) =
                    (self.state, self.active_since, lifetime.active)
                {
                    if has_elapsed(now, since, active) {
                        self.state = ObjectState::Expired;
                        return true;
                    }
                }
            }
            ObjectPayload::Projectile { speed, spin, rotation, .. } => {
                self.bounds.y += *speed;
                *rotation = (*rotation + *spin) % 360.0;
                if self.bounds.y > arena.bottom() {
                    self.state = ObjectState::Expired;
                }
            }
        }
        false
    }
}

/// Warning and active durations (seconds); `active: None` lives until off-screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifetime {
    pub warning: f32,
    pub active: Option<f32>,
}

/// Weighted kind selection
#[derive(Debug, Clone)]
pub struct KindTable {
    kinds: Vec<ObjectKind>,
    weights: Vec<u32>,
    dist: WeightedIndex<u32>,
}

impl KindTable {
    pub fn new(entries: &[(ObjectKind, u32)]) -> Result<Self> {
        let kinds = entries.iter().map(|&(k, _)| k).collect();
        let weights: Vec<u32> = entries.iter().map(|&(_, w)| w).collect();
        let dist = WeightedIndex::new(weights.iter().copied())
            .map_err(|e| Error::Config(format!("spawn kind table: {e}")))?;
        Ok(Self { kinds, weights, dist })
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> ObjectKind {
        self.kinds[self.dist.sample(rng)]
    }

    /// Weight share of a kind in [0, 1]
    pub fn share(&self, kind: ObjectKind) -> f32 {
        let total: u32 = self.weights.iter().sum();
        let w: u32 = self
            .kinds
            .iter()
            .zip(&self.weights)
            .filter(|(k, _)| **k == kind)
            .map(|(_, w)| *w)
            .sum();
        if total == 0 { 0.0 } else { w as f32 / total as f32 }
    }
}

/// Spawn interval ramp: each bound shrinks linearly over `ramp_secs` by its
/// ramp amount, never below its floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalRamp {
    pub base_min: f32,
    pub base_max: f32,
    pub min_ramp: f32,
    pub max_ramp: f32,
    pub min_floor: f32,
    pub max_floor: f32,
    pub ramp_secs: f32,
}

impl Default for IntervalRamp {
    fn default() -> Self {
        Self {
            base_min: 2.0,
            base_max: 3.5,
            min_ramp: 1.0,
            max_ramp: 2.0,
            min_floor: 0.5,
            max_floor: 1.0,
            ramp_secs: crate::consts::ROUND_SECS,
        }
    }
}

impl IntervalRamp {
    /// Constant interval
    pub fn fixed(secs: f32) -> Self {
        Self {
            base_min: secs,
            base_max: secs,
            min_ramp: 0.0,
            max_ramp: 0.0,
            min_floor: secs,
            max_floor: secs,
            ramp_secs: 1.0,
        }
    }

    /// (min, max) interval at `elapsed` seconds; non-increasing in `elapsed`
    pub fn bounds(&self, elapsed: f32) -> (f32, f32) {
        let factor = if self.ramp_secs > 0.0 {
            elapsed.max(0.0) / self.ramp_secs
        } else {
            0.0
        };
        let min = (self.base_min - factor * self.min_ramp).max(self.min_floor);
        let max = (self.base_max - factor * self.max_ramp).max(self.max_floor);
        (min, max.max(min))
    }
}

/// Where a spawn may land
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTarget {
    pub zone: Option<PlayerId>,
    pub area: Rect,
}

/// How a spawned object is shaped and placed
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Placement {
    pub size: (f32, f32),
    /// Horizontal margin kept free inside the target area
    pub margin_x: f32,
    /// Vertical margins (top, bottom) kept free inside the target area
    pub margin_y: (f32, f32),
    /// Spawn above the arena at this y instead of inside the area
    pub drop_from: Option<f32>,
}

impl Placement {
    /// Top-left of a random placement inside `area`
    fn place<R: Rng>(&self, area: &Rect, rng: &mut R) -> (f32, f32) {
        let (w, h) = self.size;
        let x_lo = area.x + self.margin_x;
        let x_hi = (area.right() - w - self.margin_x).max(x_lo);
        let x = if x_hi > x_lo { rng.random_range(x_lo..=x_hi) } else { x_lo };

        let y = match self.drop_from {
            Some(y) => y,
            None => {
                let y_lo = area.y + self.margin_y.0;
                let y_hi = (area.bottom() - h - self.margin_y.1).max(y_lo);
                if y_hi > y_lo { rng.random_range(y_lo..=y_hi) } else { y_lo }
            }
        };
        (x, y)
    }
}

/// Projectile fall speed range and spin (px/frame, degrees/frame)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileMotion {
    pub speed_min: f32,
    pub speed_max: f32,
    pub spin: f32,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    pub ramp: IntervalRamp,
    pub table: KindTable,
    pub placement: Placement,
    pub lifetime: Lifetime,
    /// Objects per spawn (inclusive range)
    pub batch: (u32, u32),
    /// Falling motion; None spawns static blocks
    pub motion: Option<ProjectileMotion>,
    pub palette: Vec<u32>,
    next_spawn_at: Option<f32>,
}

impl SpawnScheduler {
    pub fn new(ramp: IntervalRamp, table: KindTable, placement: Placement, lifetime: Lifetime) -> Self {
        Self {
            ramp,
            table,
            placement,
            lifetime,
            batch: (1, 1),
            motion: None,
            palette: Vec::new(),
            next_spawn_at: None,
        }
    }

    pub fn with_batch(mut self, min: u32, max: u32) -> Self {
        self.batch = (min.max(1), max.max(min.max(1)));
        self
    }

    pub fn with_motion(mut self, motion: ProjectileMotion, palette: Vec<u32>) -> Self {
        self.motion = Some(motion);
        self.palette = palette;
        self
    }

    pub fn set_table(&mut self, table: KindTable) {
        self.table = table;
    }

    pub fn set_motion(&mut self, motion: ProjectileMotion) {
        self.motion = Some(motion);
    }

    pub fn reset(&mut self) {
        self.next_spawn_at = None;
    }

    /// Seconds until the next spawn is due (None before the first update)
    pub fn next_spawn_at(&self) -> Option<f32> {
        self.next_spawn_at
    }

    /// Spawn whatever is due at `elapsed` seconds into the round
    ///
    /// The first call only schedules; targets are chosen uniformly. With no
    /// targets (everyone eliminated) nothing spawns but the clock still runs.
    pub fn update<R: Rng>(
        &mut self,
        elapsed: f32,
        targets: &[SpawnTarget],
        next_id: &mut u32,
        rng: &mut R,
    ) -> Vec<GameObject> {
        let Some(due) = self.next_spawn_at else {
            self.next_spawn_at = Some(elapsed + self.ramp.bounds(elapsed).1);
            return Vec::new();
        };
        if elapsed < due {
            return Vec::new();
        }

        let mut spawned = Vec::new();
        if !targets.is_empty() {
            let count = rng.random_range(self.batch.0..=self.batch.1);
            for _ in 0..count {
                let target = targets[rng.random_range(0..targets.len())];
                spawned.push(self.spawn_one(&target, elapsed, next_id, rng));
            }
        }

        let (lo, hi) = self.ramp.bounds(elapsed);
        let interval = if hi > lo { rng.random_range(lo..=hi) } else { lo };
        self.next_spawn_at = Some(elapsed + interval);
        spawned
    }

    fn spawn_one<R: Rng>(&self, target: &SpawnTarget, now: f32, next_id: &mut u32, rng: &mut R) -> GameObject {
        let kind = self.table.pick(rng);
        let (x, y) = self.placement.place(&target.area, rng);
        let (w, h) = self.placement.size;

        let payload = match self.motion {
            Some(m) => {
                let speed = if m.speed_max > m.speed_min {
                    rng.random_range(m.speed_min..=m.speed_max)
                } else {
                    m.speed_min
                };
                let spin = if m.spin > 0.0 { rng.random_range(-m.spin..=m.spin) } else { 0.0 };
                let color = if self.palette.is_empty() {
                    0xFFFFFF
                } else {
                    self.palette[rng.random_range(0..self.palette.len())]
                };
                ObjectPayload::Projectile {
                    speed: speed.floor(),
                    spin,
                    rotation: 0.0,
                    color,
                }
            }
            None => ObjectPayload::Block,
        };

        let id = *next_id;
        *next_id += 1;

        let state = if self.lifetime.warning > 0.0 {
            ObjectState::Warning
        } else {
            ObjectState::Active
        };
        GameObject {
            id,
            kind,
            payload,
            bounds: Rect::new(x, y, w, h),
            spawn_time: now,
            state,
            active_since: (state == ObjectState::Active).then_some(now),
            touched_by: BTreeSet::new(),
            zone: target.zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn dodge_scheduler() -> SpawnScheduler {
        let table = KindTable::new(&[
            (ObjectKind::Normal, 70),
            (ObjectKind::Gold, 15),
            (ObjectKind::Special, 15),
        ])
        .unwrap();
        SpawnScheduler::new(
            IntervalRamp::default(),
            table,
            Placement {
                size: (100.0, 100.0),
                margin_x: 40.0,
                margin_y: (100.0, 100.0),
                drop_from: None,
            },
            Lifetime {
                warning: 1.0,
                active: Some(1.2),
            },
        )
        .with_batch(2, 5)
    }

    fn arena() -> Rect {
        Rect::new(0.0, 0.0, 1280.0, 720.0)
    }

    #[test]
    fn test_interval_bounds_narrow_to_floor() {
        let ramp = IntervalRamp::default();
        assert_eq!(ramp.bounds(0.0), (2.0, 3.5));
        let (min, max) = ramp.bounds(90.0);
        assert!((min - 1.5).abs() < 1e-5);
        assert!((max - 2.5).abs() < 1e-5);
        assert_eq!(ramp.bounds(10_000.0), (0.5, 1.0));
    }

    #[test]
    fn test_fixed_interval() {
        let ramp = IntervalRamp::fixed(0.2);
        assert_eq!(ramp.bounds(0.0), (0.2, 0.2));
        assert_eq!(ramp.bounds(500.0), (0.2, 0.2));
    }

    #[test]
    fn test_spawns_inside_area_with_margins() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut sched = dodge_scheduler();
        let targets = [SpawnTarget { zone: None, area: arena() }];
        let mut next_id = 1;

        assert!(sched.update(0.0, &targets, &mut next_id, &mut rng).is_empty());
        let spawned = sched.update(10.0, &targets, &mut next_id, &mut rng);
        assert!((2..=5).contains(&spawned.len()));
        for obj in &spawned {
            assert_eq!(obj.state, ObjectState::Warning);
            assert!(obj.bounds.x >= 40.0 && obj.bounds.right() <= 1240.0);
            assert!(obj.bounds.y >= 100.0 && obj.bounds.bottom() <= 620.0);
        }
        assert_eq!(next_id, 1 + spawned.len() as u32);
    }

    #[test]
    fn test_no_targets_no_spawn() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sched = dodge_scheduler();
        let mut next_id = 1;
        sched.update(0.0, &[], &mut next_id, &mut rng);
        assert!(sched.update(100.0, &[], &mut next_id, &mut rng).is_empty());
        // Still rescheduled
        assert!(sched.next_spawn_at().unwrap() > 100.0);
    }

    #[test]
    fn test_kind_table_weights() {
        let table = KindTable::new(&[(ObjectKind::Normal, 70), (ObjectKind::Gold, 30)]).unwrap();
        assert!((table.share(ObjectKind::Normal) - 0.7).abs() < 1e-6);
        assert_eq!(table.share(ObjectKind::Bomb), 0.0);

        let mut rng = Pcg32::seed_from_u64(42);
        let normals = (0..1000)
            .filter(|_| table.pick(&mut rng) == ObjectKind::Normal)
            .count();
        assert!((600..800).contains(&normals));

        assert!(KindTable::new(&[]).is_err());
        assert!(KindTable::new(&[(ObjectKind::Fruit, 0)]).is_err());
    }

    #[test]
    fn test_block_lifecycle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sched = dodge_scheduler();
        let targets = [SpawnTarget { zone: None, area: arena() }];
        let mut next_id = 1;
        sched.update(0.0, &targets, &mut next_id, &mut rng);
        let mut obj = sched.update(5.0, &targets, &mut next_id, &mut rng).remove(0);
        let lifetime = sched.lifetime;

        assert!(!obj.advance(5.5, &lifetime, &arena()));
        assert_eq!(obj.state, ObjectState::Warning);
        assert!(!obj.advance(6.0, &lifetime, &arena()));
        assert_eq!(obj.state, ObjectState::Active);
        assert!(!obj.advance(7.0, &lifetime, &arena()));
        assert!(obj.advance(7.2, &lifetime, &arena()));
        assert!(obj.is_expired());
    }

    #[test]
    fn test_block_lifetimes_counted_in_frames() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sched = dodge_scheduler();
        let targets = [SpawnTarget { zone: None, area: arena() }];
        let mut next_id = 1;
        sched.update(0.0, &targets, &mut next_id, &mut rng);
        let mut obj = sched.update(5.0, &targets, &mut next_id, &mut rng).remove(0);
        let lifetime = sched.lifetime;

        let mut now = 5.0f32;
        let mut active_at = None;
        let mut expired_at = None;
        for frame in 1..=200u32 {
            now += crate::consts::SIM_DT;
            let expired = obj.advance(now, &lifetime, &arena());
            if active_at.is_none() && obj.is_active() {
                active_at = Some(frame);
            }
            if expired {
                expired_at = Some(frame);
                break;
            }
        }
        // 1.0 s warning and 1.2 s active at 60 Hz
        assert_eq!(active_at, Some(60));
        assert_eq!(expired_at, Some(132));
    }

    #[test]
    fn test_projectile_falls_and_expires_off_screen() {
        let mut rng = Pcg32::seed_from_u64(9);
        let table = KindTable::new(&[(ObjectKind::Fruit, 1)]).unwrap();
        let mut sched = SpawnScheduler::new(
            IntervalRamp::fixed(0.2),
            table,
            Placement {
                size: (40.0, 40.0),
                margin_x: 50.0,
                margin_y: (0.0, 0.0),
                drop_from: Some(-50.0),
            },
            Lifetime { warning: 0.0, active: None },
        )
        .with_motion(
            ProjectileMotion {
                speed_min: 5.0,
                speed_max: 10.0,
                spin: 10.0,
            },
            vec![0xFF1493],
        );
        let area = Rect::new(0.0, 0.0, 800.0, 600.0);
        let targets = [SpawnTarget { zone: Some(PlayerId::ONE), area }];
        let mut next_id = 1;
        sched.update(0.0, &targets, &mut next_id, &mut rng);
        let mut obj = sched.update(0.2, &targets, &mut next_id, &mut rng).remove(0);
        assert!(obj.is_active());
        assert_eq!(obj.bounds.y, -50.0);
        assert_eq!(obj.zone, Some(PlayerId::ONE));

        let lifetime = sched.lifetime;
        let mut frames = 0;
        while !obj.is_expired() {
            obj.advance(0.2, &lifetime, &area);
            frames += 1;
            assert!(frames < 200);
        }
        assert!(obj.bounds.y > 600.0);
    }

    proptest! {
        #[test]
        fn prop_interval_bounds_monotone(a in 0.0f32..1000.0, b in 0.0f32..1000.0) {
            let ramp = IntervalRamp::default();
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let (emin, emax) = ramp.bounds(early);
            let (lmin, lmax) = ramp.bounds(late);
            prop_assert!(lmin <= emin);
            prop_assert!(lmax <= emax);
            prop_assert!(lmin >= ramp.min_floor);
            prop_assert!(lmax >= ramp.max_floor);
            prop_assert!(lmin <= lmax);
        }
    }
}
