use glam::Vec2;
use rayon::prelude::*;

use crate::audio::{SoundEvent, SoundId};
use crate::config::{Bounds, SoundConfig, SteeringParams, SteeringWeights};
use crate::ecs::components::{Acceleration, BoundaryContact, SoundCooldowns, Visual};
use crate::ecs::systems::snapshot::GhostSnapshot;

/// The four unweighted steering components of one ghost for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringForces {
    pub cohesion: Vec2,
    pub alignment: Vec2,
    pub separation: Vec2,
    pub boundary: Vec2,
}

impl SteeringForces {
    /// Weighted sum; this is the tick's acceleration.
    pub fn weighted_sum(&self, w: &SteeringWeights) -> Vec2 {
        self.cohesion * w.cohesion
            + self.alignment * w.alignment
            + self.separation * w.separation
            + self.boundary * w.boundary
    }
}

/// Compute the steering components for ghost `me` against the whole flock.
///
/// Cohesion sums the offsets to every neighbor inside the perception radius,
/// alignment sums their velocities; both are then rescaled to `max_speed`
/// rather than averaged. Separation adds the unit vector away from each
/// neighbor inside `separation_distance`, weighted by inverse distance,
/// averages, then rescales to `max_speed`. The ghost itself and neighbors at
/// exactly zero distance are skipped before anything is normalized.
pub fn compute_forces(
    me: usize,
    flock: &[GhostSnapshot],
    params: &SteeringParams,
    separation_distance: f32,
    bounds: Bounds,
) -> SteeringForces {
    let own = flock[me];

    let mut cohesion = Vec2::ZERO;
    let mut alignment = Vec2::ZERO;
    let mut flock_count = 0usize;
    let mut separation = Vec2::ZERO;
    let mut separation_count = 0usize;

    for (j, other) in flock.iter().enumerate() {
        if j == me {
            continue;
        }
        let offset = other.pos - own.pos;
        let dist = offset.length();
        if dist <= 0.0 || !dist.is_finite() {
            continue;
        }

        if dist < params.perception_radius {
            cohesion += offset;
            alignment += other.vel;
            flock_count += 1;
        }

        if dist < separation_distance {
            separation += (-offset / dist) / dist;
            separation_count += 1;
        }
    }

    if flock_count > 0 {
        cohesion = cohesion.normalize_or_zero() * params.max_speed;
        alignment = alignment.normalize_or_zero() * params.max_speed;
    }
    if separation_count > 0 {
        separation /= separation_count as f32;
        separation = separation.normalize_or_zero() * params.max_speed;
    }

    SteeringForces {
        cohesion,
        alignment,
        separation,
        boundary: boundary_force(own.pos, params, bounds),
    }
}

/// Linear inward push inside `margin` of each canvas edge, zero elsewhere.
/// Axes are independent, so corners get both components.
pub fn boundary_force(pos: Vec2, params: &SteeringParams, bounds: Bounds) -> Vec2 {
    let margin = params.margin;
    let strength = params.turn_strength;
    let mut force = Vec2::ZERO;

    if pos.x < margin {
        force.x = strength * (margin - pos.x) / margin;
    } else if pos.x > bounds.width - margin {
        force.x = -strength * (pos.x - (bounds.width - margin)) / margin;
    }

    if pos.y < margin {
        force.y = strength * (margin - pos.y) / margin;
    } else if pos.y > bounds.height - margin {
        force.y = -strength * (pos.y - (bounds.height - margin)) / margin;
    }

    force
}

/// Read phase: compute forces for every snapshot. Nothing is written to the
/// world here, so the scan runs in parallel.
pub fn compute_all(
    snapshots: &[GhostSnapshot],
    params: &SteeringParams,
    separation_distance: f32,
    bounds: Bounds,
    out: &mut Vec<SteeringForces>,
) {
    snapshots
        .par_iter()
        .enumerate()
        .map(|(i, _)| compute_forces(i, snapshots, params, separation_distance, bounds))
        .collect_into_vec(out);
}

/// Write phase: store each ghost's acceleration and emit a bump sound on the
/// tick its boundary force switches on.
pub fn apply(
    world: &mut hecs::World,
    snapshots: &[GhostSnapshot],
    forces: &[SteeringForces],
    weights: &SteeringWeights,
    sound: &SoundConfig,
    bounds: Bounds,
    events: &mut Vec<SoundEvent>,
) {
    for (snap, f) in snapshots.iter().zip(forces) {
        let Ok((acc, contact, cooldowns, visual)) = world.query_one_mut::<(
            &mut Acceleration,
            &mut BoundaryContact,
            &mut SoundCooldowns,
            &Visual,
        )>(snap.entity) else {
            continue;
        };

        acc.0 = f.weighted_sum(weights);

        let touching = f.boundary != Vec2::ZERO;
        if touching && !contact.0 && cooldowns.bump == 0 {
            events.push(SoundEvent::new(
                SoundId::Bump,
                snap.pos.x,
                visual.scale,
                bounds,
                sound,
            ));
            cooldowns.bump = sound.bump_cooldown_ticks;
        }
        contact.0 = touching;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ghost(x: f32, y: f32, vx: f32, vy: f32) -> GhostSnapshot {
        GhostSnapshot {
            entity: hecs::Entity::DANGLING,
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
        }
    }

    fn params() -> SteeringParams {
        SteeringParams::default()
    }

    fn big() -> Bounds {
        Bounds::new(2000.0, 2000.0)
    }

    #[test]
    fn pair_at_fifty_pixels() {
        let flock = [ghost(1000.0, 1000.0, 1.0, 0.0), ghost(1050.0, 1000.0, 0.0, 2.0)];
        let f = compute_forces(0, &flock, &params(), 100.0, big());

        assert!(f.separation.x < 0.0);
        assert!(f.separation.y.abs() < 1e-6);
        assert!((f.separation.length() - 5.0).abs() < 1e-4);

        assert!(f.cohesion.x > 0.0);
        assert!((f.cohesion.length() - 5.0).abs() < 1e-4);

        // Alignment points along the neighbor's velocity.
        assert!(f.alignment.normalize().dot(Vec2::Y) > 0.999);
        assert!((f.alignment.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn lonely_ghost_gets_zero_flocking() {
        let flock = [ghost(1000.0, 1000.0, 1.0, 0.0), ghost(1500.0, 1000.0, 0.0, 2.0)];
        let f = compute_forces(0, &flock, &params(), 100.0, big());
        assert_eq!(f.cohesion, Vec2::ZERO);
        assert_eq!(f.alignment, Vec2::ZERO);
        assert_eq!(f.separation, Vec2::ZERO);
    }

    #[test]
    fn coincident_ghosts_are_not_neighbors() {
        let flock = [
            ghost(1000.0, 1000.0, 1.0, 0.0),
            ghost(1000.0, 1000.0, 0.0, 3.0),
        ];
        for me in 0..2 {
            let f = compute_forces(me, &flock, &params(), 100.0, big());
            assert_eq!(f.cohesion, Vec2::ZERO);
            assert_eq!(f.alignment, Vec2::ZERO);
            assert_eq!(f.separation, Vec2::ZERO);
            assert!(f.cohesion.is_finite() && f.separation.is_finite());
        }
    }

    #[test]
    fn cohesion_is_rescaled_not_averaged() {
        let flock = [
            ghost(1000.0, 1000.0, 1.0, 0.0),
            ghost(1010.0, 1000.0, 1.0, 0.0),
            ghost(1000.0, 1120.0, 1.0, 0.0),
            ghost(1140.0, 1000.0, 1.0, 0.0),
        ];
        let f = compute_forces(0, &flock, &params(), 0.0, big());
        assert!((f.cohesion.length() - params().max_speed).abs() < 1e-4);
        assert!((f.alignment.length() - params().max_speed).abs() < 1e-4);
        // Zero separation distance disables separation entirely.
        assert_eq!(f.separation, Vec2::ZERO);
    }

    #[test]
    fn separation_prefers_closer_neighbors() {
        let flock = [
            ghost(1000.0, 1000.0, 1.0, 0.0),
            ghost(1010.0, 1000.0, 1.0, 0.0),
            ghost(1000.0, 1080.0, 1.0, 0.0),
        ];
        let f = compute_forces(0, &flock, &params(), 100.0, big());
        // The near neighbor on +x dominates the far one on +y.
        assert!(f.separation.x < 0.0);
        assert!(f.separation.x.abs() > f.separation.y.abs());
    }

    #[test]
    fn boundary_near_left_edge() {
        let p = SteeringParams {
            margin: 50.0,
            turn_strength: 0.8,
            ..params()
        };
        let force = boundary_force(Vec2::new(20.0, 300.0), &p, Bounds::new(800.0, 600.0));
        assert!((force.x - 0.8 * (50.0 - 20.0) / 50.0).abs() < 1e-6);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn boundary_corner_combines_axes() {
        let p = SteeringParams {
            margin: 50.0,
            turn_strength: 0.8,
            ..params()
        };
        let force = boundary_force(Vec2::new(790.0, 590.0), &p, Bounds::new(800.0, 600.0));
        assert!(force.x < 0.0 && force.y < 0.0);
        assert!((force.x - force.y).abs() < 1e-6);
        let inside = boundary_force(Vec2::new(400.0, 300.0), &p, Bounds::new(800.0, 600.0));
        assert_eq!(inside, Vec2::ZERO);
    }

    #[test]
    fn parallel_read_matches_serial() {
        let mut rng = fastrand::Rng::with_seed(5);
        let flock: Vec<GhostSnapshot> = (0..64)
            .map(|_| ghost(rng.f32() * 600.0, rng.f32() * 600.0, rng.f32(), rng.f32()))
            .collect();
        let bounds = Bounds::new(600.0, 600.0);
        let mut out = Vec::new();
        compute_all(&flock, &params(), 100.0, bounds, &mut out);
        assert_eq!(out.len(), flock.len());
        for (i, f) in out.iter().enumerate() {
            assert_eq!(*f, compute_forces(i, &flock, &params(), 100.0, bounds));
        }
    }

    #[test]
    fn weights_scale_components() {
        let f = SteeringForces {
            cohesion: Vec2::X,
            alignment: Vec2::Y,
            separation: Vec2::new(-1.0, 0.0),
            boundary: Vec2::new(0.0, 2.0),
        };
        let w = SteeringWeights {
            cohesion: 1.0,
            alignment: 0.5,
            separation: 2.0,
            boundary: 0.25,
        };
        assert_eq!(f.weighted_sum(&w), Vec2::new(-1.0, 1.0));
    }
}
