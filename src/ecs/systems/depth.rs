use crate::audio::{SoundEvent, SoundId};
use crate::config::{Bounds, DepthConfig, SoundConfig};
use crate::depth::{DepthFrame, DepthMapping};
use crate::ecs::components::{DepthHistory, Position, SoundCooldowns, Sprite, Visual};
use crate::ghost::sprite::SpriteState;

/// Displayed scale for a smoothed depth: `base * k / depth^p`, clamped.
pub fn depth_scale(base_scale: f32, depth_mm: f32, cfg: &DepthConfig) -> f32 {
    let scale = base_scale * cfg.scale_constant / depth_mm.powf(cfg.scale_exponent);
    scale.clamp(cfg.min_scale, cfg.max_scale)
}

/// Fold one sample into the history and recompute the depth-driven scale.
/// Returns true when the new scale jumped relative to the previous one.
///
/// Missing, zero or non-finite samples are dropped and leave everything as is.
pub fn fold_sample(
    history: &mut DepthHistory,
    visual: &mut Visual,
    sample: Option<f32>,
    cfg: &DepthConfig,
) -> bool {
    let Some(depth) = sample.filter(|d| d.is_finite() && *d > 0.0) else {
        return false;
    };
    history.0.push(depth);
    let Some(smoothed) = history.0.mean() else {
        return false;
    };

    let next = depth_scale(visual.base_scale, smoothed, cfg);
    let jumped = match visual.depth_scale {
        Some(prev) => {
            next > prev * (1.0 + cfg.jump_ratio)
                || (prev <= cfg.scale_ceiling && next > cfg.scale_ceiling)
        }
        None => false,
    };
    visual.depth_scale = Some(next);
    visual.scale = next;
    jumped
}

/// Everything [`apply_depth`] needs besides the ghost itself.
#[derive(Debug, Clone, Copy)]
pub struct DepthContext<'a> {
    pub depth: &'a DepthConfig,
    pub sound: &'a SoundConfig,
    pub bounds: Bounds,
}

/// Apply one depth sample to a ghost. Every scale jump shows the startled
/// sprite; if the startle cooldown is also clear it restarts the cooldown and
/// returns the startle sound to play.
pub fn apply_depth(
    history: &mut DepthHistory,
    visual: &mut Visual,
    sprite: &mut Sprite,
    cooldowns: &mut SoundCooldowns,
    x: f32,
    sample: Option<f32>,
    ctx: &DepthContext<'_>,
) -> Option<SoundEvent> {
    if !fold_sample(history, visual, sample, ctx.depth) {
        return None;
    }
    sprite.state = SpriteState::Startled;
    if cooldowns.startle > 0 {
        return None;
    }

    cooldowns.startle = ctx.sound.startle_cooldown_ticks;
    Some(SoundEvent::new(
        SoundId::Startle,
        x,
        visual.scale,
        ctx.bounds,
        ctx.sound,
    ))
}

/// Sample the installed depth frame under every ghost.
pub fn update(
    world: &mut hecs::World,
    frame: &DepthFrame,
    mapping: &DepthMapping,
    ctx: &DepthContext<'_>,
    events: &mut Vec<SoundEvent>,
) {
    for (_, (pos, history, visual, sprite, cooldowns)) in world.query_mut::<(
        &Position,
        &mut DepthHistory,
        &mut Visual,
        &mut Sprite,
        &mut SoundCooldowns,
    )>() {
        let sample = mapping.sample(frame, pos.0, ctx.bounds);
        if let Some(event) = apply_depth(history, visual, sprite, cooldowns, pos.0.x, sample, ctx) {
            events.push(event);
        }
    }
}
