use crate::config::{FlockConfig, SteeringWeights};

/// Fraction of the configured default each weight key press moves by.
const WEIGHT_STEP: f32 = 0.25;
/// Weights never exceed this multiple of their configured default.
const WEIGHT_MAX_FACTOR: f32 = 10.0;
/// Smallest step and ceiling, so a weight configured as zero can be raised.
const MIN_WEIGHT_STEP: f32 = 0.005;
const MIN_WEIGHT_CEILING: f32 = 1.0;
/// Separation distance step in pixels.
const SEPARATION_STEP: f32 = 10.0;

/// Which steering weight a key adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    Cohesion,
    Alignment,
    Separation,
    Boundary,
}

impl WeightKind {
    pub fn label(self) -> &'static str {
        match self {
            WeightKind::Cohesion => "cohesion",
            WeightKind::Alignment => "alignment",
            WeightKind::Separation => "separation",
            WeightKind::Boundary => "boundary",
        }
    }
}

/// An interactive adjustment coming from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Increase(WeightKind),
    Decrease(WeightKind),
    WidenSeparation,
    NarrowSeparation,
    ToggleAnnotations,
    TogglePause,
    Reset,
    Quit,
}

impl KeyCommand {
    /// Map a typed character to a command. Lowercase lowers, uppercase raises.
    pub fn from_key(key: char) -> Option<Self> {
        let cmd = match key {
            'c' => KeyCommand::Decrease(WeightKind::Cohesion),
            'C' => KeyCommand::Increase(WeightKind::Cohesion),
            'l' => KeyCommand::Decrease(WeightKind::Alignment),
            'L' => KeyCommand::Increase(WeightKind::Alignment),
            's' => KeyCommand::Decrease(WeightKind::Separation),
            'S' => KeyCommand::Increase(WeightKind::Separation),
            'b' => KeyCommand::Decrease(WeightKind::Boundary),
            'B' => KeyCommand::Increase(WeightKind::Boundary),
            'd' => KeyCommand::NarrowSeparation,
            'D' => KeyCommand::WidenSeparation,
            'a' | 'A' => KeyCommand::ToggleAnnotations,
            'p' | 'P' => KeyCommand::TogglePause,
            'r' | 'R' => KeyCommand::Reset,
            'q' | 'Q' => KeyCommand::Quit,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Values the operator can change while the flock runs.
/// Owned by the driver; the simulation only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSettings {
    pub weights: SteeringWeights,
    pub separation_distance: f32,
    /// Debug colouring: tint by sprite state, fixed opacity and scale.
    pub annotations: bool,
    pub paused: bool,
    defaults: SteeringWeights,
    default_separation: f32,
    max_separation: f32,
}

impl LiveSettings {
    pub fn from_config(config: &FlockConfig) -> Self {
        Self {
            weights: config.weights,
            separation_distance: config.separation_distance,
            annotations: false,
            paused: false,
            defaults: config.weights,
            default_separation: config.separation_distance,
            max_separation: config.steering.perception_radius * 2.0,
        }
    }

    /// Apply one command. Returns false for `Quit`, which the driver handles.
    pub fn apply(&mut self, cmd: KeyCommand) -> bool {
        match cmd {
            KeyCommand::Increase(kind) => self.step_weight(kind, 1.0),
            KeyCommand::Decrease(kind) => self.step_weight(kind, -1.0),
            KeyCommand::WidenSeparation => {
                self.separation_distance =
                    (self.separation_distance + SEPARATION_STEP).min(self.max_separation);
                log::info!("separation distance -> {:.0}", self.separation_distance);
            }
            KeyCommand::NarrowSeparation => {
                self.separation_distance = (self.separation_distance - SEPARATION_STEP).max(0.0);
                log::info!("separation distance -> {:.0}", self.separation_distance);
            }
            KeyCommand::ToggleAnnotations => {
                self.annotations = !self.annotations;
                log::info!("annotations {}", if self.annotations { "ON" } else { "OFF" });
            }
            KeyCommand::TogglePause => {
                self.paused = !self.paused;
                log::info!("simulation {}", if self.paused { "paused" } else { "resumed" });
            }
            KeyCommand::Reset => {
                self.weights = self.defaults;
                self.separation_distance = self.default_separation;
                log::info!("live settings reset to config defaults");
            }
            KeyCommand::Quit => return false,
        }
        true
    }

    fn step_weight(&mut self, kind: WeightKind, direction: f32) {
        let default = match kind {
            WeightKind::Cohesion => self.defaults.cohesion,
            WeightKind::Alignment => self.defaults.alignment,
            WeightKind::Separation => self.defaults.separation,
            WeightKind::Boundary => self.defaults.boundary,
        };
        let weight = match kind {
            WeightKind::Cohesion => &mut self.weights.cohesion,
            WeightKind::Alignment => &mut self.weights.alignment,
            WeightKind::Separation => &mut self.weights.separation,
            WeightKind::Boundary => &mut self.weights.boundary,
        };
        let step = (default.abs() * WEIGHT_STEP).max(MIN_WEIGHT_STEP);
        let ceiling = (default.abs() * WEIGHT_MAX_FACTOR).max(MIN_WEIGHT_CEILING);
        *weight = (*weight + step * direction).clamp(0.0, ceiling);
        log::info!("{} weight -> {:.4}", kind.label(), *weight);
    }
}
