use glam::Vec2;

use crate::ecs::components::{Position, Velocity};

/// Read-only copy of a ghost's kinematics for the neighbor scan.
/// Every force of a tick is computed from these before any ghost moves.
#[derive(Debug, Clone, Copy)]
pub struct GhostSnapshot {
    pub entity: hecs::Entity,
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Rebuild the snapshot cache from current positions and velocities.
pub fn rebuild(world: &hecs::World, snapshots: &mut Vec<GhostSnapshot>) {
    snapshots.clear();
    for (entity, (pos, vel)) in world.query::<(&Position, &Velocity)>().iter() {
        snapshots.push(GhostSnapshot {
            entity,
            pos: pos.0,
            vel: vel.0,
        });
    }
}
