use crate::audio::SoundEvent;
use crate::config::{Bounds, FlockConfig, VisualConfig};
use crate::stats::PhaseTimings;
use crate::ecs::components::{Age, Position, Sprite, Velocity, Visual};
use crate::ecs::systems::{self, TickBuffers, TickContext};
use crate::ghost;
use crate::render::instance::GhostInstance;

/// The whole ghost population plus the buffers its ticks reuse.
/// Population is fixed at spawn; no ghost is ever added or removed.
pub struct Flock {
    world: hecs::World,
    bufs: TickBuffers,
    ticks: u64,
}

impl Flock {
    pub fn spawn(
        count: usize,
        bounds: Bounds,
        config: &FlockConfig,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let mut world = hecs::World::new();
        ghost::spawn_ghosts(&mut world, count, bounds, config, rng);
        log::info!(
            "Spawned {} ghosts on a {}x{} canvas",
            count,
            bounds.width,
            bounds.height
        );
        Self {
            world,
            bufs: TickBuffers::new(count),
            ticks: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    /// Advance one fixed tick. Sound triggers are appended to `events`.
    pub fn tick(
        &mut self,
        ctx: &TickContext<'_>,
        rng: &mut fastrand::Rng,
        events: &mut Vec<SoundEvent>,
        timings: &mut PhaseTimings,
    ) {
        systems::tick(&mut self.world, ctx, rng, &mut self.bufs, events, timings);
        self.ticks += 1;
    }

    /// Fill `out` with one render instance per ghost.
    pub fn build_instances(
        &self,
        cfg: &VisualConfig,
        annotations: bool,
        out: &mut Vec<GhostInstance>,
    ) {
        out.clear();
        for (_, (pos, vel, visual, sprite, age)) in self
            .world
            .query::<(&Position, &Velocity, &Visual, &Sprite, &Age)>()
            .iter()
        {
            out.push(GhostInstance::from_components(
                pos,
                vel,
                visual,
                sprite,
                age,
                cfg,
                annotations,
            ));
        }
    }
}
