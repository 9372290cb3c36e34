//! Burst and confetti particles
//!
//! Purely visual: gameplay never reads these pools, and they draw from their
//! own RNG stream so effects cannot change a seeded session.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Stream selector for the particle RNG (gameplay uses the seed directly)
const PARTICLE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// A particle for visual effects (per-frame units)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
    /// Life lost per frame
    pub decay: f32,
    /// Added to vel.y per frame
    pub gravity: f32,
}

impl Particle {
    /// Remaining life as 0..1 opacity
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    fn step(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.rotation = (self.rotation + self.spin) % 360.0;
        self.life -= self.decay;
    }
}

/// Randomized spawn ranges for one kind of burst
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BurstStyle {
    /// Max jitter of the spawn point on both axes
    pub offset: f32,
    pub vx: (f32, f32),
    pub vy: (f32, f32),
    pub life: f32,
    pub decay: (f32, f32),
    pub size: (f32, f32),
    pub gravity: f32,
    pub count: usize,
}

impl BurstStyle {
    /// Basket made: upward fountain
    pub fn basket() -> Self {
        Self {
            offset: 15.0,
            vx: (-10.0, 10.0),
            vy: (-15.0, -5.0),
            life: 80.0,
            decay: (1.0, 1.0),
            size: (4.0, 10.0),
            gravity: 0.4,
            count: 30,
        }
    }

    /// Fruit sliced / bomb hit: short fading splash
    pub fn splash() -> Self {
        Self {
            offset: 0.0,
            vx: (-5.0, 5.0),
            vy: (-8.0, -2.0),
            life: 255.0,
            decay: (3.0, 8.0),
            size: (3.0, 8.0),
            gravity: 0.3,
            count: 20,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

/// Capacity-bounded particle pool; spawns beyond capacity are dropped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticlePool {
    pub particles: Vec<Particle>,
    pub capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    /// Returns false when the pool is full
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// One frame of Euler integration, then drop dead or out-of-bounds particles
    pub fn update(&mut self, bounds: &Rect) {
        for p in &mut self.particles {
            p.step();
        }
        // 50 px horizontal slack; the bottom edge is hard
        let (left, right) = (bounds.x - 50.0, bounds.right() + 50.0);
        self.particles
            .retain(|p| p.life > 0.0 && p.pos.y <= bounds.bottom() && (left..=right).contains(&p.pos.x));
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[derive(Debug, Clone)]
pub struct ParticleEffectsSystem {
    pub bursts: ParticlePool,
    pub confetti: ParticlePool,
    /// Visible area; particles leaving it are removed
    pub bounds: Rect,
    pub palette: Vec<u32>,
    rng: Pcg32,
}

impl ParticleEffectsSystem {
    /// `max_particles` is split evenly between the two pools
    pub fn new(seed: u64, max_particles: usize, bounds: Rect) -> Self {
        let per_pool = max_particles / 2;
        Self {
            bursts: ParticlePool::new(per_pool),
            confetti: ParticlePool::new(per_pool),
            bounds,
            palette: vec![0xFF6B35, 0x2ECC71, 0x00D4FF, 0x39FF14, 0x9B59B6],
            rng: Pcg32::new(seed, PARTICLE_STREAM),
        }
    }

    /// Emit a burst at `at`; returns how many particles fit
    pub fn burst(&mut self, at: Vec2, color: u32, style: &BurstStyle) -> usize {
        let mut spawned = 0;
        for _ in 0..style.count {
            let jitter = if style.offset > 0.0 {
                Vec2::new(
                    self.rng.random_range(-style.offset..style.offset),
                    self.rng.random_range(-style.offset..style.offset),
                )
            } else {
                Vec2::ZERO
            };
            let particle = Particle {
                pos: at + jitter,
                vel: Vec2::new(range(&mut self.rng, style.vx), range(&mut self.rng, style.vy)),
                color,
                life: style.life,
                max_life: style.life,
                size: range(&mut self.rng, style.size),
                rotation: 0.0,
                spin: 0.0,
                decay: range(&mut self.rng, style.decay),
                gravity: style.gravity,
            };
            if !self.bursts.push(particle) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Confetti falling from above the visible area
    pub fn confetti(&mut self, count: usize) -> usize {
        let mut spawned = 0;
        for _ in 0..count {
            let color = if self.palette.is_empty() {
                0xFFFFFF
            } else {
                self.palette[self.rng.random_range(0..self.palette.len())]
            };
            let particle = Particle {
                pos: Vec2::new(
                    self.rng.random_range(self.bounds.x..self.bounds.right()),
                    self.rng.random_range(self.bounds.y - 50.0..self.bounds.y),
                ),
                vel: Vec2::new(self.rng.random_range(-3.0..3.0), self.rng.random_range(2.0..8.0)),
                color,
                life: self.rng.random_range(180.0..300.0),
                max_life: 300.0,
                size: self.rng.random_range(4.0..12.0),
                rotation: self.rng.random_range(0.0..360.0),
                spin: self.rng.random_range(-10.0..10.0),
                decay: 1.0,
                gravity: 0.2,
            };
            if !self.confetti.push(particle) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    pub fn update(&mut self) {
        self.bursts.update(&self.bounds);
        self.confetti.update(&self.bounds);
    }

    pub fn clear(&mut self) {
        self.bursts.clear();
        self.confetti.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.bursts.particles.iter().chain(self.confetti.particles.iter())
    }
}

/// Uniform sample from an inclusive (lo, hi) pair; degenerate ranges return lo
fn range(rng: &mut Pcg32, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..=hi) } else { lo }
}
