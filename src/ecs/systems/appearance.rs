use crate::config::{SpriteThresholds, VisualConfig};
use crate::ecs::components::{Acceleration, Sprite, Velocity, Visual};
use crate::ghost::range;
use crate::ghost::sprite::classify;

/// Reclassify every ghost's sprite from the motion of this tick.
/// Overwrites any startle left over from the previous tick.
pub fn classify_all(world: &mut hecs::World, thresholds: &SpriteThresholds) {
    for (_, (acc, vel, sprite)) in
        world.query_mut::<(&Acceleration, &Velocity, &mut Sprite)>()
    {
        let c = classify(acc.0, vel.0, thresholds);
        sprite.state = c.state;
        sprite.mirrored = c.mirrored;
    }
}

/// Warm-white tint that brightens with scale and opacity.
pub fn tint_for(scale: f32, opacity: f32) -> u32 {
    let r = (scale * opacity * 3.0).clamp(220.0, 255.0) as u32;
    let g = (scale * opacity * 3.5).clamp(220.0, 255.0) as u32;
    let b = 255u32;
    let a = opacity.clamp(0.0, 255.0) as u32;
    r << 24 | g << 16 | b << 8 | a
}

/// Per-tick flicker: opacity drifts, scale breathes while no depth frame is
/// installed, tint follows both.
pub fn drift(
    world: &mut hecs::World,
    cfg: &VisualConfig,
    depth_active: bool,
    rng: &mut fastrand::Rng,
) {
    for (_, visual) in world.query_mut::<&mut Visual>() {
        if !depth_active {
            let jitter = range(rng, 1.0 - cfg.scale_jitter, 1.0 + cfg.scale_jitter);
            visual.scale =
                (visual.scale * jitter).clamp(cfg.jitter_min_scale, cfg.jitter_max_scale);
        }
        visual.opacity = (visual.opacity + range(rng, -cfg.opacity_drift, cfg.opacity_drift))
            .clamp(cfg.opacity_min, cfg.opacity_max);
        visual.tint = tint_for(visual.scale, visual.opacity);
    }
}
