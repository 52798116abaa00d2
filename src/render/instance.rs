use bytemuck::{Pod, Zeroable};

use crate::config::VisualConfig;
use crate::ecs::components::{Age, Position, Sprite, Velocity, Visual};
use crate::ghost::sprite::SpriteState;

/// Opacity used for every ghost while annotations are on.
const ANNOTATION_OPACITY: u32 = 100;
/// Scale used for every ghost while annotations are on.
const ANNOTATION_SCALE: f32 = 0.5;

/// Per-instance data handed to the renderer each frame.
/// Stride = 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GhostInstance {
    /// Canvas position (x, y).
    pub position: [f32; 2],
    /// Drawn size (width, height) in pixels.
    pub size: [f32; 2],
    /// RGBA color packed as u32.
    pub tint: u32,
    /// Sprite art index, see [`SpriteState`].
    pub sprite: u32,
    /// 1 when the sprite is flipped horizontally.
    pub mirrored: u32,
    /// Rotation in radians. Art faces up, so this is heading + 90 degrees.
    pub rotation: f32,
}

impl GhostInstance {
    pub fn from_components(
        pos: &Position,
        vel: &Velocity,
        visual: &Visual,
        sprite: &Sprite,
        age: &Age,
        cfg: &VisualConfig,
        annotations: bool,
    ) -> Self {
        let (scale, tint) = if annotations {
            (
                ANNOTATION_SCALE,
                (sprite.state.annotation_tint() & 0xFFFF_FF00) | ANNOTATION_OPACITY,
            )
        } else {
            (visual.scale, visual.tint)
        };

        // Older ghosts draw wider and taller.
        let age_ratio = (age.0 / cfg.reference_age).max(0.0);
        let size = [
            cfg.sprite_width * scale * age_ratio.powf(0.2),
            cfg.sprite_height * scale * age_ratio.sqrt(),
        ];

        Self {
            position: pos.0.into(),
            size,
            tint,
            sprite: sprite.state.index(),
            mirrored: sprite.mirrored as u32,
            rotation: vel.0.y.atan2(vel.0.x) + std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Whatever draws the flock. Receives the whole instance buffer once per frame.
pub trait SpriteSink {
    fn draw(&mut self, instances: &[GhostInstance]);
}

/// Headless sink: counts sprites per state and logs the tally.
#[derive(Debug, Default)]
pub struct TallySink {
    pub counts: [usize; SpriteState::COUNT],
    pub frames: u64,
}

impl SpriteSink for TallySink {
    fn draw(&mut self, instances: &[GhostInstance]) {
        self.counts = [0; SpriteState::COUNT];
        for inst in instances {
            if let Some(slot) = self.counts.get_mut(inst.sprite as usize) {
                *slot += 1;
            }
        }
        self.frames += 1;
        if log::log_enabled!(log::Level::Debug) && self.frames % 60 == 0 {
            let tally = SpriteState::ALL
                .iter()
                .zip(self.counts)
                .map(|(s, n)| format!("{} {n}", s.label()))
                .collect::<Vec<_>>()
                .join(", ");
            log::debug!("sprites: {tally}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn parts() -> (Position, Velocity, Visual, Sprite, Age) {
        (
            Position(Vec2::new(10.0, 20.0)),
            Velocity(Vec2::new(1.0, 0.0)),
            Visual {
                base_scale: 1.0,
                scale: 1.0,
                depth_scale: None,
                opacity: 40.0,
                tint: 0xDCDCFF28,
            },
            Sprite {
                state: SpriteState::Impact,
                mirrored: true,
            },
            Age(13.0),
        )
    }

    #[test]
    fn size_and_rotation_follow_motion() {
        let cfg = VisualConfig::default();
        let (p, v, vis, s, a) = parts();
        let inst = GhostInstance::from_components(&p, &v, &vis, &s, &a, &cfg, false);
        assert_eq!(inst.position, [10.0, 20.0]);
        assert!((inst.size[0] - 80.0).abs() < 1e-4);
        assert!((inst.size[1] - 240.0).abs() < 1e-4);
        assert!((inst.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(inst.tint, 0xDCDCFF28);
        assert_eq!(inst.sprite, 3);
        assert_eq!(inst.mirrored, 1);
    }

    #[test]
    fn annotations_override_look() {
        let cfg = VisualConfig::default();
        let (p, v, vis, s, a) = parts();
        let inst = GhostInstance::from_components(&p, &v, &vis, &s, &a, &cfg, true);
        assert_eq!(inst.tint, 0xFF000064);
        assert!((inst.size[0] - 40.0).abs() < 1e-4);
    }

    #[test]
    fn tally_counts_by_sprite() {
        let cfg = VisualConfig::default();
        let (p, v, vis, s, a) = parts();
        let inst = GhostInstance::from_components(&p, &v, &vis, &s, &a, &cfg, false);
        let mut sink = TallySink::default();
        sink.draw(&[inst, inst]);
        assert_eq!(sink.counts[SpriteState::Impact.index() as usize], 2);
        assert_eq!(sink.frames, 1);
    }

    #[test]
    fn tally_has_a_slot_for_every_sprite() {
        let cfg = VisualConfig::default();
        let (p, v, vis, _, a) = parts();
        let frame: Vec<GhostInstance> = SpriteState::ALL
            .iter()
            .map(|&state| {
                let s = Sprite {
                    state,
                    mirrored: false,
                };
                GhostInstance::from_components(&p, &v, &vis, &s, &a, &cfg, false)
            })
            .collect();
        let mut sink = TallySink::default();
        sink.draw(&frame);
        assert_eq!(sink.counts.len(), SpriteState::ALL.len());
        assert!(sink.counts.iter().all(|&n| n == 1));
    }
}
