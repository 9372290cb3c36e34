//! Session settings
//!
//! Loaded once at startup from an optional JSON file; every field has a
//! default so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::rect::Rect;
use crate::tuning::Tuning;
use crate::{Error, Result};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset (bursts and confetti combined)
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle budget preset
    pub quality: QualityPreset,
    /// Particle effects (bursts, confetti)
    pub particles: bool,

    /// Camera frame size in pixels; landmarks are mapped into it
    pub arena_width: f32,
    pub arena_height: f32,

    /// Camera warm-up before each round
    pub calibration_secs: f32,
    /// Thumb-up frames needed to commit the exit gesture
    pub exit_hold_frames: u32,

    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            arena_width: crate::consts::ARENA_WIDTH,
            arena_height: crate::consts::ARENA_HEIGHT,
            calibration_secs: crate::consts::CALIBRATION_SECS,
            exit_hold_frames: 30,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Read and validate a JSON settings file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(Error::Config(format!(
                "arena must have a positive size (got {}x{})",
                self.arena_width, self.arena_height
            )));
        }
        if self.calibration_secs < 0.0 {
            return Err(Error::Config("calibration_secs must not be negative".into()));
        }
        if self.exit_hold_frames == 0 {
            return Err(Error::Config("exit_hold_frames must be at least 1".into()));
        }
        // Tower sliders bounce inside a split-screen half
        let lane = self.arena_width / crate::consts::MAX_PLAYERS as f32;
        if self.tuning.tower.block_width >= lane {
            return Err(Error::Config(format!(
                "tower.block_width {} must be narrower than half the arena ({lane})",
                self.tuning.tower.block_width
            )));
        }
        self.tuning.validate()
    }

    pub fn arena_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.arena_width, self.arena_height)
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }
}
