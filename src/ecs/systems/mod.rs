pub mod appearance;
pub mod depth;
pub mod movement;
pub mod snapshot;
pub mod steering;

use crate::audio::{self, SoundEvent};
use crate::config::{Bounds, FlockConfig};
use crate::depth::{DepthFrame, DepthMapping};
use crate::settings::LiveSettings;
use crate::stats::{PhaseTimings, TickPhase};

use self::depth::DepthContext;
use self::snapshot::GhostSnapshot;
use self::steering::SteeringForces;

/// Read-only inputs of one tick.
pub struct TickContext<'a> {
    pub config: &'a FlockConfig,
    pub live: &'a LiveSettings,
    pub bounds: Bounds,
    /// Currently installed depth frame, if the sensor ever delivered one.
    pub depth: Option<&'a DepthFrame>,
}

/// Buffers reused across ticks.
pub struct TickBuffers {
    pub snapshots: Vec<GhostSnapshot>,
    pub forces: Vec<SteeringForces>,
}

impl TickBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
            forces: Vec::with_capacity(capacity),
        }
    }
}

/// Run all simulation systems for one fixed tick.
pub fn tick(
    world: &mut hecs::World,
    ctx: &TickContext<'_>,
    rng: &mut fastrand::Rng,
    bufs: &mut TickBuffers,
    events: &mut Vec<SoundEvent>,
    timings: &mut PhaseTimings,
) {
    let config = ctx.config;

    timings.measure(TickPhase::Cooldowns, || audio::decay_cooldowns(world));

    // Read phase works off a copy; nothing below it sees a half-moved flock.
    timings.measure(TickPhase::Snapshot, || {
        snapshot::rebuild(world, &mut bufs.snapshots)
    });

    timings.measure(TickPhase::Steering, || {
        steering::compute_all(
            &bufs.snapshots,
            &config.steering,
            ctx.live.separation_distance,
            ctx.bounds,
            &mut bufs.forces,
        );
        steering::apply(
            world,
            &bufs.snapshots,
            &bufs.forces,
            &ctx.live.weights,
            &config.sound,
            ctx.bounds,
            events,
        );
    });

    timings.measure(TickPhase::Movement, || {
        movement::integrate(world, config.steering.max_speed)
    });

    timings.measure(TickPhase::Sprites, || {
        appearance::classify_all(world, &config.sprite)
    });

    // Runs after classification so a startle shows on the tick it happens.
    if let Some(frame) = ctx.depth {
        let mapping = DepthMapping::from_config(&config.depth);
        let depth_ctx = DepthContext {
            depth: &config.depth,
            sound: &config.sound,
            bounds: ctx.bounds,
        };
        timings.measure(TickPhase::Depth, || {
            depth::update(world, frame, &mapping, &depth_ctx, events)
        });
    }

    timings.measure(TickPhase::Visual, || {
        appearance::drift(world, &config.visual, ctx.depth.is_some(), rng)
    });
}
