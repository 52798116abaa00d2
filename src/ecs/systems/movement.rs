use glam::Vec2;

use crate::ecs::components::{Acceleration, Position, Velocity};

/// Lower speed clamp as a fraction of max speed. Keeps ghosts from stalling.
pub const MIN_SPEED_FACTOR: f32 = 0.3;
/// Upper speed clamp as a fraction of max speed.
pub const MAX_SPEED_FACTOR: f32 = 1.2;

const EPSILON: f32 = 1.0e-6;

/// Add the tick's acceleration and clamp the speed into
/// `[0.3, 1.2] * max_speed`, keeping the direction.
///
/// If the sum cancels out the previous heading is kept; if there is none,
/// the ghost heads along +x.
pub fn integrate_velocity(vel: Vec2, acc: Vec2, max_speed: f32) -> Vec2 {
    let min = MIN_SPEED_FACTOR * max_speed;
    let max = MAX_SPEED_FACTOR * max_speed;

    let next = vel + acc;
    let speed = next.length();
    let dir = if speed > EPSILON && next.is_finite() {
        next / speed
    } else {
        let prev = vel.normalize_or_zero();
        if prev == Vec2::ZERO || !prev.is_finite() {
            Vec2::X
        } else {
            prev
        }
    };

    dir * speed.clamp(min, max)
}

/// Integrate velocity then position for every ghost.
pub fn integrate(world: &mut hecs::World, max_speed: f32) {
    for (_, (pos, vel, acc)) in
        world.query_mut::<(&mut Position, &mut Velocity, &Acceleration)>()
    {
        vel.0 = integrate_velocity(vel.0, acc.0, max_speed);
        pos.0 += vel.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f32 = 5.0;

    fn in_range(v: Vec2) -> bool {
        let s = v.length();
        s >= MIN_SPEED_FACTOR * MAX - 1e-4 && s <= MAX_SPEED_FACTOR * MAX + 1e-4
    }

    #[test]
    fn speed_always_clamped() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..1000 {
            let vel = Vec2::new(rng.f32() * 40.0 - 20.0, rng.f32() * 40.0 - 20.0);
            let acc = Vec2::new(rng.f32() * 20.0 - 10.0, rng.f32() * 20.0 - 10.0);
            assert!(in_range(integrate_velocity(vel, acc, MAX)));
        }
    }

    #[test]
    fn slow_ghost_is_sped_up_along_heading() {
        let v = integrate_velocity(Vec2::new(0.1, 0.0), Vec2::ZERO, MAX);
        assert!((v.x - 1.5).abs() < 1e-5);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn fast_ghost_is_capped() {
        let v = integrate_velocity(Vec2::new(0.0, 3.0), Vec2::new(0.0, 10.0), MAX);
        assert!((v.y - 6.0).abs() < 1e-5);
    }

    #[test]
    fn cancelled_velocity_keeps_heading() {
        let v = integrate_velocity(Vec2::new(2.0, 0.0), Vec2::new(-2.0, 0.0), MAX);
        assert!(in_range(v));
        assert!(v.x > 0.0);

        let still = integrate_velocity(Vec2::ZERO, Vec2::ZERO, MAX);
        assert!(in_range(still));
    }

    #[test]
    fn position_follows_clamped_velocity() {
        let mut world = hecs::World::new();
        let e = world.spawn((
            Position(Vec2::new(100.0, 100.0)),
            Velocity(Vec2::new(4.0, 0.0)),
            Acceleration(Vec2::new(10.0, 0.0)),
        ));
        integrate(&mut world, MAX);
        let pos = world.get::<&Position>(e).unwrap().0;
        assert!((pos.x - 106.0).abs() < 1e-4);
    }
}
