use glam::Vec2;

use crate::config::SpriteThresholds;

/// Sprite alphabet. Discriminants are the art indices handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpriteState {
    /// No or mild lateral steering.
    Neutral = 0,
    /// Moderate lateral steering.
    Moderate = 1,
    /// Strong lateral steering.
    Strong = 2,
    /// Near-straight travel braking against the heading (bumping into a wall).
    Impact = 3,
    /// Near-straight travel accelerating along the heading (stretching out).
    Dash = 4,
    /// Shown after a proximity startle.
    Startled = 5,
}

impl SpriteState {
    pub const COUNT: usize = 6;
    pub const ALL: [SpriteState; Self::COUNT] = [
        Self::Neutral,
        Self::Moderate,
        Self::Strong,
        Self::Impact,
        Self::Dash,
        Self::Startled,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::Impact => "impact",
            Self::Dash => "dash",
            Self::Startled => "startled",
        }
    }

    /// Debug tint used when annotations are on (RGBA packed).
    pub fn annotation_tint(self) -> u32 {
        match self {
            Self::Neutral => 0xFFFFFFFF,
            Self::Moderate => 0xFFFF00FF,
            Self::Strong => 0x00FFFFFF,
            Self::Impact => 0xFF0000FF,
            Self::Dash => 0x0000FFFF,
            Self::Startled => 0xFF00FFFF,
        }
    }
}

/// Result of classifying one tick of motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub state: SpriteState,
    pub mirrored: bool,
    /// Signed projection of acceleration onto the velocity normal.
    /// Positive is rightward.
    pub lateral: f32,
}

/// Classify motion into a sprite. Pure function of `(acceleration, velocity)`.
///
/// Stage one buckets the lateral steering magnitude into neutral, moderate or
/// strong. Stage two runs only for near-straight travel with a non-trivial
/// acceleration, and replaces the bucket with impact (acceleration opposed to
/// the heading) or dash (acceleration along it).
pub fn classify(acceleration: Vec2, velocity: Vec2, t: &SpriteThresholds) -> Classification {
    let normal = velocity.perp().normalize_or_zero();
    let lateral = acceleration.dot(normal);
    let steer = lateral.abs();

    let mut state = if steer < t.moderate {
        SpriteState::Neutral
    } else if steer < t.strong {
        SpriteState::Moderate
    } else {
        SpriteState::Strong
    };

    if steer < t.straight && acceleration.length() > t.min_acceleration {
        let alignment = velocity
            .normalize_or_zero()
            .dot(acceleration.normalize_or_zero());
        if alignment < t.opposed_dot {
            state = SpriteState::Impact;
        } else if alignment > t.aligned_dot {
            state = SpriteState::Dash;
        }
    }

    Classification {
        state,
        mirrored: lateral > 0.0 && state != SpriteState::Neutral,
        lateral,
    }
}
