use crate::config::{Bounds, SoundConfig};
use crate::ecs::components::SoundCooldowns;

/// Sound buffers the core can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// A viewer stepped close: the ghost jumped in size.
    Startle,
    /// The ghost ran into the canvas margin.
    Bump,
}

impl SoundId {
    pub fn label(self) -> &'static str {
        match self {
            SoundId::Startle => "startle",
            SoundId::Bump => "bump",
        }
    }
}

/// Fire-and-forget playback request. The simulation never hears back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEvent {
    pub sound: SoundId,
    /// In [0, 1].
    pub volume: f32,
    /// In [-1, 1], left to right.
    pub pan: f32,
    /// Playback rate, > 0.
    pub rate: f32,
}

impl SoundEvent {
    /// Pan from horizontal position, volume from the ghost's scale.
    pub fn new(sound: SoundId, x: f32, scale: f32, bounds: Bounds, cfg: &SoundConfig) -> Self {
        let rate = match sound {
            SoundId::Startle => cfg.startle_rate,
            SoundId::Bump => cfg.bump_rate,
        };
        Self {
            sound,
            volume: (scale * cfg.volume_per_scale).clamp(cfg.min_volume, cfg.max_volume),
            pan: bounds.pan_for(x),
            rate,
        }
    }
}

/// Playback collaborator.
pub trait SoundSink {
    fn play(&mut self, event: &SoundEvent);
}

/// Tracks which buffers are loaded; triggers for anything else are dropped.
#[derive(Debug, Default)]
pub struct SoundBank {
    startle_loaded: bool,
    bump_loaded: bool,
    pub played: u64,
    pub skipped: u64,
}

impl SoundBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_loaded(&mut self, sound: SoundId) {
        match sound {
            SoundId::Startle => self.startle_loaded = true,
            SoundId::Bump => self.bump_loaded = true,
        }
    }

    pub fn is_loaded(&self, sound: SoundId) -> bool {
        match sound {
            SoundId::Startle => self.startle_loaded,
            SoundId::Bump => self.bump_loaded,
        }
    }
}

impl SoundSink for SoundBank {
    fn play(&mut self, event: &SoundEvent) {
        if !self.is_loaded(event.sound) {
            self.skipped += 1;
            return;
        }
        self.played += 1;
        log::debug!(
            "play {} vol={:.2} pan={:+.2} rate={:.2}",
            event.sound.label(),
            event.volume,
            event.pan,
            event.rate
        );
    }
}

/// Count every cooldown down by one tick.
pub fn decay_cooldowns(world: &mut hecs::World) {
    for (_, cooldowns) in world.query_mut::<&mut SoundCooldowns>() {
        cooldowns.startle = cooldowns.startle.saturating_sub(1);
        cooldowns.bump = cooldowns.bump.saturating_sub(1);
    }
}
