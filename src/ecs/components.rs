use glam::Vec2;

use crate::ghost::sprite::SpriteState;
use crate::util::ring::RingBuffer;

/// Current world position in canvas pixels.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Velocity in pixels per tick.
#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub Vec2);

/// Summed steering force of the current tick. Overwritten every tick.
#[derive(Debug, Clone, Copy)]
pub struct Acceleration(pub Vec2);

/// Cosmetic age sampled at spawn; biases sprite proportions only.
#[derive(Debug, Clone, Copy)]
pub struct Age(pub f32);

/// Scale, opacity and tint.
#[derive(Debug, Clone, Copy)]
pub struct Visual {
    /// Scale rolled at spawn; depth scaling is relative to it.
    pub base_scale: f32,
    /// Scale currently shown.
    pub scale: f32,
    /// Last scale derived from depth, used for jump detection.
    pub depth_scale: Option<f32>,
    /// Alpha on a 0-255 scale.
    pub opacity: f32,
    /// RGBA packed as u32.
    pub tint: u32,
}

/// Which sprite to draw and how.
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    pub state: SpriteState,
    pub mirrored: bool,
}

/// Bounded FIFO of valid depth samples (millimetres).
#[derive(Debug, Clone)]
pub struct DepthHistory(pub RingBuffer<f32>);

/// Per-sound trigger suppression, in ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundCooldowns {
    pub startle: u32,
    pub bump: u32,
}

/// Whether the boundary force was active last tick (edge detection for bumps).
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryContact(pub bool);
