use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`FlockConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canvas extent in render pixels. Threaded into every call that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Linear map of a horizontal position onto a stereo pan in [-1, 1].
    pub fn pan_for(&self, x: f32) -> f32 {
        if self.width <= 0.0 {
            return 0.0;
        }
        (x / self.width * 2.0 - 1.0).clamp(-1.0, 1.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Fixed scalar constants of the steering model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Neighbors closer than this contribute to cohesion and alignment.
    pub perception_radius: f32,
    /// Cohesion/alignment/separation are rescaled to this magnitude.
    /// Velocity is clamped to [0.3, 1.2] times this value.
    pub max_speed: f32,
    /// Width of the band along each canvas edge where the boundary push acts.
    pub margin: f32,
    /// Boundary push at the very edge of the canvas.
    pub turn_strength: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            perception_radius: 150.0,
            max_speed: 5.0,
            margin: 150.0,
            turn_strength: 0.8,
        }
    }
}

/// Per-behavior multipliers applied before the forces are summed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringWeights {
    pub cohesion: f32,
    pub alignment: f32,
    pub separation: f32,
    pub boundary: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            cohesion: 0.01,
            alignment: 0.02,
            separation: 0.05,
            boundary: 1.0,
        }
    }
}

/// Thresholds of the two-stage sprite classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteThresholds {
    /// Lateral steering at or above this is at least "moderate".
    pub moderate: f32,
    /// Lateral steering at or above this is "strong".
    pub strong: f32,
    /// Below this lateral steering the travel counts as straight and the
    /// impact/dash override is considered.
    pub straight: f32,
    /// Accelerations weaker than this never trigger impact/dash.
    pub min_acceleration: f32,
    /// Heading/acceleration cosine below this selects "impact".
    pub opposed_dot: f32,
    /// Heading/acceleration cosine above this selects "dash".
    pub aligned_dot: f32,
}

impl Default for SpriteThresholds {
    fn default() -> Self {
        Self {
            moderate: 0.15,
            strong: 0.3,
            straight: 0.1,
            min_acceleration: 0.1,
            opposed_dot: -0.7,
            aligned_dot: 0.7,
        }
    }
}

/// Depth-driven scale and startle detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Smallest per-ghost depth history.
    pub history_min: usize,
    /// Largest per-ghost depth history.
    pub history_max: usize,
    /// `k` in `scale = base_scale * k / depth^p`.
    pub scale_constant: f32,
    /// `p` in `scale = base_scale * k / depth^p`.
    pub scale_exponent: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Relative growth over the previous depth scale that counts as a jump.
    pub jump_ratio: f32,
    /// Crossing this scale from below counts as a jump regardless of ratio.
    pub scale_ceiling: f32,
    /// Fraction of the grid hidden on each edge by the render-space remap.
    pub crop_margin: f32,
    /// Sensor readings outside [min_valid_mm, max_valid_mm] carry no data.
    pub min_valid_mm: u16,
    pub max_valid_mm: u16,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            history_min: 6,
            history_max: 10,
            scale_constant: 1500.0 * 1500.0,
            scale_exponent: 2.0,
            min_scale: 0.1,
            max_scale: 4.0,
            jump_ratio: 0.03,
            scale_ceiling: 2.5,
            crop_margin: 1.0 / 12.0,
            min_valid_mm: 300,
            max_valid_mm: 3000,
        }
    }
}

/// Cosmetic drift of scale, opacity and sprite proportions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Scale is multiplied by U(1 - jitter, 1 + jitter) while no depth frame exists.
    pub scale_jitter: f32,
    pub jitter_min_scale: f32,
    pub jitter_max_scale: f32,
    /// Opacity moves by U(-drift, drift) each tick.
    pub opacity_drift: f32,
    pub opacity_min: f32,
    pub opacity_max: f32,
    /// Sprite art size at scale 1 and reference age.
    pub sprite_width: f32,
    pub sprite_height: f32,
    pub reference_age: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            scale_jitter: 0.052,
            jitter_min_scale: 0.2,
            jitter_max_scale: 4.0,
            opacity_drift: 1.0,
            opacity_min: 3.0,
            opacity_max: 160.0,
            sprite_width: 80.0,
            sprite_height: 240.0,
            reference_age: 13.0,
        }
    }
}

/// Sound trigger gating and payload derivation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub startle_cooldown_ticks: u32,
    pub bump_cooldown_ticks: u32,
    pub volume_per_scale: f32,
    pub min_volume: f32,
    pub max_volume: f32,
    pub startle_rate: f32,
    pub bump_rate: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            startle_cooldown_ticks: 180,
            bump_cooldown_ticks: 30,
            volume_per_scale: 0.5,
            min_volume: 0.05,
            max_volume: 0.8,
            startle_rate: 1.0,
            bump_rate: 1.25,
        }
    }
}

/// Static configuration for one run of the installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub ghost_count: usize,
    pub bounds: Bounds,
    pub tick_rate_hz: f64,
    pub steering: SteeringParams,
    /// Initial values of the live-tunable weights.
    pub weights: SteeringWeights,
    /// Initial value of the live-tunable separation distance.
    pub separation_distance: f32,
    pub sprite: SpriteThresholds,
    pub depth: DepthConfig,
    pub visual: VisualConfig,
    pub sound: SoundConfig,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            seed: None,
            ghost_count: 100,
            bounds: Bounds::default(),
            tick_rate_hz: 60.0,
            steering: SteeringParams::default(),
            weights: SteeringWeights::default(),
            separation_distance: 100.0,
            sprite: SpriteThresholds::default(),
            depth: DepthConfig::default(),
            visual: VisualConfig::default(),
            sound: SoundConfig::default(),
        }
    }
}

impl FlockConfig {
    /// Read a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: FlockConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bounds.width <= 0.0 || self.bounds.height <= 0.0 {
            return Err(ConfigError::Invalid("bounds must be positive"));
        }
        if self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid("tick_rate_hz must be positive"));
        }
        let s = &self.steering;
        if s.max_speed <= 0.0 {
            return Err(ConfigError::Invalid("steering.max_speed must be positive"));
        }
        if s.perception_radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "steering.perception_radius must be positive",
            ));
        }
        if s.margin <= 0.0 {
            return Err(ConfigError::Invalid("steering.margin must be positive"));
        }
        if self.separation_distance < 0.0 {
            return Err(ConfigError::Invalid(
                "separation_distance must not be negative",
            ));
        }
        let t = &self.sprite;
        if t.moderate > t.strong {
            return Err(ConfigError::Invalid(
                "sprite.moderate must not exceed sprite.strong",
            ));
        }
        if t.opposed_dot >= t.aligned_dot {
            return Err(ConfigError::Invalid(
                "sprite.opposed_dot must be below sprite.aligned_dot",
            ));
        }
        let d = &self.depth;
        if d.history_min == 0 || d.history_min > d.history_max {
            return Err(ConfigError::Invalid(
                "depth history range must be non-empty and start above zero",
            ));
        }
        if d.scale_constant <= 0.0 {
            return Err(ConfigError::Invalid("depth.scale_constant must be positive"));
        }
        // Closer viewers must always mean bigger ghosts.
        if d.scale_exponent <= 0.0 {
            return Err(ConfigError::Invalid("depth.scale_exponent must be positive"));
        }
        if d.jump_ratio < 0.0 {
            return Err(ConfigError::Invalid("depth.jump_ratio must not be negative"));
        }
        if d.min_scale <= 0.0 || d.min_scale > d.max_scale {
            return Err(ConfigError::Invalid("depth scale clamp range is inverted"));
        }
        if !(0.0..0.5).contains(&d.crop_margin) {
            return Err(ConfigError::Invalid("depth.crop_margin must be in [0, 0.5)"));
        }
        if d.min_valid_mm > d.max_valid_mm {
            return Err(ConfigError::Invalid("depth valid window is inverted"));
        }
        let v = &self.visual;
        if v.jitter_min_scale > v.jitter_max_scale || v.opacity_min > v.opacity_max {
            return Err(ConfigError::Invalid("visual clamp range is inverted"));
        }
        if v.reference_age <= 0.0 {
            return Err(ConfigError::Invalid("visual.reference_age must be positive"));
        }
        let snd = &self.sound;
        if snd.min_volume < 0.0 || snd.max_volume > 1.0 || snd.min_volume > snd.max_volume {
            return Err(ConfigError::Invalid("sound volume range must lie in [0, 1]"));
        }
        if snd.startle_rate <= 0.0 || snd.bump_rate <= 0.0 {
            return Err(ConfigError::Invalid("sound playback rates must be positive"));
        }
        Ok(())
    }
}
