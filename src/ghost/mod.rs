pub mod sprite;

use glam::Vec2;

use crate::config::{Bounds, FlockConfig};
use crate::ecs::components::*;
use crate::util::ring::RingBuffer;

use self::sprite::SpriteState;

/// Spawn the whole population with randomized kinematics and looks.
pub fn spawn_ghosts(
    world: &mut hecs::World,
    count: usize,
    bounds: Bounds,
    config: &FlockConfig,
    rng: &mut fastrand::Rng,
) {
    let max_speed = config.steering.max_speed;
    let depth = &config.depth;

    for _ in 0..count {
        let pos = Vec2::new(rng.f32() * bounds.width, rng.f32() * bounds.height);
        let angle = rng.f32() * std::f32::consts::TAU;
        let speed = max_speed * range(rng, 0.5, 1.0);
        let base_scale = 0.5 * range(rng, 1.0, 6.0).sqrt();
        let opacity = range(rng, 5.0, 100.0);
        let history_len = rng.usize(depth.history_min..=depth.history_max);

        world.spawn((
            Position(pos),
            Velocity(Vec2::from_angle(angle) * speed),
            Acceleration(Vec2::ZERO),
            Age(range(rng, 3.0, 20.0)),
            Visual {
                base_scale,
                scale: base_scale,
                depth_scale: None,
                opacity,
                tint: 0xFFFFFFFF,
            },
            Sprite {
                state: SpriteState::Neutral,
                mirrored: false,
            },
            DepthHistory(RingBuffer::new(history_len)),
            SoundCooldowns::default(),
            BoundaryContact::default(),
        ));
    }
}

/// Uniform sample in `[lo, hi)`.
pub fn range(rng: &mut fastrand::Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_ghosts_respect_ranges() {
        let config = FlockConfig::default();
        let bounds = Bounds::new(640.0, 480.0);
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(11);
        spawn_ghosts(&mut world, 50, bounds, &config, &mut rng);

        assert_eq!(world.len(), 50);
        for (_, (pos, vel, age, visual, history)) in world
            .query::<(&Position, &Velocity, &Age, &Visual, &DepthHistory)>()
            .iter()
        {
            assert!(pos.0.x >= 0.0 && pos.0.x < bounds.width);
            assert!(pos.0.y >= 0.0 && pos.0.y < bounds.height);
            let speed = vel.0.length();
            assert!(speed >= 2.5 - 1e-4 && speed <= 5.0 + 1e-4);
            assert!(age.0 >= 3.0 && age.0 < 20.0);
            assert!(visual.base_scale >= 0.5 - 1e-4 && visual.base_scale < 1.23);
            assert!(visual.opacity >= 5.0 && visual.opacity < 100.0);
            let cap = history.0.capacity();
            assert!((6..=10).contains(&cap));
        }
    }

    #[test]
    fn same_seed_same_flock() {
        let config = FlockConfig::default();
        let bounds = Bounds::default();
        let positions = |seed| {
            let mut world = hecs::World::new();
            let mut rng = fastrand::Rng::with_seed(seed);
            spawn_ghosts(&mut world, 10, bounds, &config, &mut rng);
            let mut out: Vec<(f32, f32)> = world
                .query::<&Position>()
                .iter()
                .map(|(_, p)| (p.0.x, p.0.y))
                .collect();
            out.sort_by(|a, b| a.partial_cmp(b).unwrap());
            out
        };
        assert_eq!(positions(3), positions(3));
    }
}
