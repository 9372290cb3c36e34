//! Data-driven game balance
//!
//! Every constant a game mode reads lives here so a settings file can
//! rebalance a game without touching code. Defaults are the shipped values.
//! Speeds are in pixels per frame at the reference 60 Hz.

use serde::{Deserialize, Serialize};

use crate::sim::gesture::VerticalAxis;
use crate::sim::spawn::{IntervalRamp, ObjectKind};
use crate::{Error, Result};

/// Two-hoop basketball
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasketballTuning {
    pub duration_secs: f32,
    /// Hoop origins (top-left of the hoop sprite), one per player
    pub hoop_starts: [(f32, f32); 2],
    /// Rim center relative to the hoop origin
    pub rim_offset: (f32, f32),
    pub rim_radius: f32,
    /// Sprite width; the right bounce edge is `max_x - hoop_width`
    pub hoop_width: f32,
    /// Per-player hoop travel bounds (min_x, max_x, min_y, max_y)
    pub hoop_bounds: [(f32, f32, f32, f32); 2],
    pub basket_cooldown_secs: f32,
    pub buffer_capacity: usize,
    pub min_fall: f32,
    pub axis: VerticalAxis,
    pub combo_window: f32,
    pub base_points: u32,
    /// Max score that starts the hoops moving
    pub hard_threshold: u32,
    pub hard_speed: f32,
    /// Max score that speeds them up
    pub extreme_threshold: u32,
    pub extreme_speed: f32,
    pub burst_count: usize,
    pub confetti_count: usize,
}

impl Default for BasketballTuning {
    fn default() -> Self {
        Self {
            duration_secs: crate::consts::ROUND_SECS,
            hoop_starts: [(100.0, 80.0), (960.0, 80.0)],
            rim_offset: (110.0, 85.0),
            rim_radius: 50.0,
            hoop_width: 220.0,
            hoop_bounds: [(50.0, 590.0, 60.0, 350.0), (690.0, 1230.0, 60.0, 350.0)],
            basket_cooldown_secs: 1.5,
            buffer_capacity: 15,
            min_fall: 15.0,
            axis: VerticalAxis::ScreenDown,
            combo_window: 3.0,
            base_points: 2,
            hard_threshold: 8,
            hard_speed: 3.0,
            extreme_threshold: 20,
            extreme_speed: 7.0,
            burst_count: 30,
            confetti_count: 60,
        }
    }
}

/// Fruit slicing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FruitTuning {
    pub duration_secs: f32,
    pub spawn_interval_secs: f32,
    /// Seconds per difficulty level
    pub level_secs: f32,
    pub speed_min: f32,
    pub speed_min_per_level: f32,
    pub speed_max: f32,
    pub speed_max_per_level: f32,
    pub bomb_chance: f32,
    pub bomb_chance_per_level: f32,
    pub bomb_chance_max: f32,
    pub object_size: f32,
    /// Spawn y (above the top edge)
    pub drop_from: f32,
    /// Horizontal inset from the zone edges
    pub margin: f32,
    pub spin: f32,
    pub hitbox_half: f32,
    pub combo_window: f32,
    pub combo_cap: u32,
    pub trail_length: usize,
    pub palette: Vec<u32>,
}

impl Default for FruitTuning {
    fn default() -> Self {
        Self {
            duration_secs: crate::consts::ROUND_SECS,
            spawn_interval_secs: 0.2,
            level_secs: 30.0,
            speed_min: 5.0,
            speed_min_per_level: 1.5,
            speed_max: 10.0,
            speed_max_per_level: 2.5,
            bomb_chance: 0.2,
            bomb_chance_per_level: 0.1,
            bomb_chance_max: 0.5,
            object_size: 40.0,
            drop_from: -50.0,
            margin: 50.0,
            spin: 10.0,
            hitbox_half: crate::sim::gesture::HAND_HITBOX_HALF,
            combo_window: 1.5,
            combo_cap: 10,
            trail_length: 10,
            palette: vec![0xFF1493, 0x00FFFF, 0x39FF14, 0xFFD700, 0xFF6B35],
        }
    }
}

impl FruitTuning {
    pub fn level(&self, elapsed: f32) -> u32 {
        if self.level_secs <= 0.0 {
            return 0;
        }
        (elapsed.max(0.0) / self.level_secs) as u32
    }

    /// (min, max) fall speed at a level
    pub fn speed_range(&self, level: u32) -> (f32, f32) {
        let l = level as f32;
        (
            self.speed_min + self.speed_min_per_level * l,
            self.speed_max + self.speed_max_per_level * l,
        )
    }

    pub fn bomb_chance_at(&self, level: u32) -> f32 {
        (self.bomb_chance + self.bomb_chance_per_level * level as f32).min(self.bomb_chance_max)
    }
}

/// Block dodging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeTuning {
    pub duration_secs: f32,
    /// Weighted kind table
    pub kinds: Vec<(ObjectKind, u32)>,
    pub interval: IntervalRamp,
    pub batch: (u32, u32),
    pub block_size: f32,
    pub margin_x: f32,
    /// (top, bottom)
    pub margin_y: (f32, f32),
    pub warning_secs: f32,
    pub active_secs: f32,
    pub multiplier_secs: f32,
    pub avoid_points: u32,
}

impl Default for DodgeTuning {
    fn default() -> Self {
        Self {
            duration_secs: crate::consts::ROUND_SECS,
            kinds: vec![
                (ObjectKind::Normal, 70),
                (ObjectKind::Gold, 15),
                (ObjectKind::Special, 15),
            ],
            interval: IntervalRamp::default(),
            batch: (2, 5),
            block_size: 100.0,
            margin_x: 40.0,
            margin_y: (100.0, 100.0),
            warning_secs: 1.0,
            active_secs: 1.2,
            multiplier_secs: 5.0,
            avoid_points: 1,
        }
    }
}

/// Tower stacking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerTuning {
    pub duration_secs: f32,
    pub jump_threshold: f32,
    pub jump_cooldown_frames: u32,
    pub block_width: f32,
    pub block_height: f32,
    pub min_block_width: f32,
    /// Distance from the bottom edge to the slider / tower base
    pub base_offset: f32,
    /// Slider start offset from the zone's left edge
    pub start_inset: f32,
    pub base_speed: f32,
    pub speed_step: f32,
    pub speed_step_secs: f32,
}

impl Default for TowerTuning {
    fn default() -> Self {
        Self {
            duration_secs: crate::consts::ROUND_SECS,
            jump_threshold: 60.0,
            jump_cooldown_frames: 15,
            block_width: 200.0,
            block_height: 40.0,
            min_block_width: 20.0,
            base_offset: 100.0,
            start_inset: 20.0,
            base_speed: 10.0,
            speed_step: 2.0,
            speed_step_secs: 30.0,
        }
    }
}

impl TowerTuning {
    /// Slider speed at `elapsed` seconds: `base + step * floor(t / step_secs)`
    pub fn speed_at(&self, elapsed: f32) -> f32 {
        if self.speed_step_secs <= 0.0 {
            return self.base_speed;
        }
        self.base_speed + self.speed_step * (elapsed.max(0.0) / self.speed_step_secs).floor()
    }
}

/// Balance for all four games
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub basketball: BasketballTuning,
    pub fruit: FruitTuning,
    pub dodge: DodgeTuning,
    pub tower: TowerTuning,
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::Config(format!("{name} must be positive (got {value})")))
    }
}

impl Tuning {
    /// Reject values no game can run with
    pub fn validate(&self) -> Result<()> {
        let b = &self.basketball;
        positive("basketball.duration_secs", b.duration_secs)?;
        positive("basketball.rim_radius", b.rim_radius)?;
        if b.buffer_capacity < 3 {
            return Err(Error::Config("basketball.buffer_capacity must be at least 3".into()));
        }
        if b.extreme_threshold < b.hard_threshold {
            return Err(Error::Config(
                "basketball.extreme_threshold must not be below hard_threshold".into(),
            ));
        }
        let hoops = b.hoop_starts.into_iter().zip(b.hoop_bounds);
        for (i, ((x, y), (min_x, max_x, min_y, max_y))) in hoops.enumerate() {
            if min_x >= max_x - b.hoop_width || min_y >= max_y {
                return Err(Error::Config("basketball.hoop_bounds leave no room to move".into()));
            }
            if !(min_x..=max_x - b.hoop_width).contains(&x) || !(min_y..=max_y).contains(&y) {
                return Err(Error::Config(format!(
                    "basketball.hoop_starts[{i}] ({x}, {y}) lies outside its hoop_bounds"
                )));
            }
        }

        let f = &self.fruit;
        positive("fruit.duration_secs", f.duration_secs)?;
        positive("fruit.spawn_interval_secs", f.spawn_interval_secs)?;
        positive("fruit.object_size", f.object_size)?;
        positive("fruit.hitbox_half", f.hitbox_half)?;
        if f.speed_min > f.speed_max {
            return Err(Error::Config("fruit.speed_min exceeds fruit.speed_max".into()));
        }
        if !(0.0..=1.0).contains(&f.bomb_chance) || !(0.0..=1.0).contains(&f.bomb_chance_max) {
            return Err(Error::Config("fruit bomb chances must be within [0, 1]".into()));
        }
        if f.trail_length < 2 {
            return Err(Error::Config("fruit.trail_length must be at least 2".into()));
        }

        let d = &self.dodge;
        positive("dodge.duration_secs", d.duration_secs)?;
        positive("dodge.block_size", d.block_size)?;
        positive("dodge.active_secs", d.active_secs)?;
        if d.kinds.is_empty() || d.kinds.iter().all(|&(_, w)| w == 0) {
            return Err(Error::Config("dodge.kinds needs at least one weighted kind".into()));
        }
        let r = &d.interval;
        if r.base_min > r.base_max || r.min_floor > r.max_floor {
            return Err(Error::Config("dodge.interval min exceeds max".into()));
        }
        positive("dodge.interval.min_floor", r.min_floor)?;
        if d.batch.0 == 0 || d.batch.0 > d.batch.1 {
            return Err(Error::Config("dodge.batch must be a non-empty range".into()));
        }

        let t = &self.tower;
        positive("tower.duration_secs", t.duration_secs)?;
        positive("tower.block_width", t.block_width)?;
        positive("tower.block_height", t.block_height)?;
        positive("tower.jump_threshold", t.jump_threshold)?;
        if t.min_block_width > t.block_width {
            return Err(Error::Config("tower.min_block_width exceeds block_width".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_hoop_start_outside_bounds_rejected() {
        let mut tuning = Tuning::default();
        tuning.basketball.hoop_starts[1] = (100.0, 80.0);
        assert!(matches!(tuning.validate(), Err(Error::Config(_))));

        // Right edge is the last x where the hoop still fits
        let mut tuning = Tuning::default();
        tuning.basketball.hoop_starts[0] = (370.0, 350.0);
        assert!(tuning.validate().is_ok());
        tuning.basketball.hoop_starts[0] = (371.0, 350.0);
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_fruit_level_curve() {
        let f = FruitTuning::default();
        assert_eq!(f.level(29.9), 0);
        assert_eq!(f.level(60.0), 2);
        assert_eq!(f.speed_range(2), (8.0, 15.0));
        assert!((f.bomb_chance_at(0) - 0.2).abs() < 1e-6);
        assert_eq!(f.bomb_chance_at(10), 0.5);
    }

    #[test]
    fn test_tower_speed_steps() {
        let t = TowerTuning::default();
        assert_eq!(t.speed_at(0.0), 10.0);
        assert_eq!(t.speed_at(29.0), 10.0);
        assert_eq!(t.speed_at(95.0), 16.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut tuning = Tuning::default();
        tuning.dodge.interval.base_min = 5.0;
        assert!(matches!(tuning.validate(), Err(Error::Config(_))));

        let mut tuning = Tuning::default();
        tuning.dodge.kinds.clear();
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.tower.block_width = 0.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning: Tuning = serde_json::from_str(r#"{"fruit": {"combo_cap": 5}}"#).unwrap();
        assert_eq!(tuning.fruit.combo_cap, 5);
        assert_eq!(tuning.fruit.trail_length, 10);
        assert_eq!(tuning.tower.jump_threshold, 60.0);
    }
}
