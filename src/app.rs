use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use instant::Instant;

use crate::audio::{SoundBank, SoundEvent, SoundId, SoundSink};
use crate::config::FlockConfig;
use crate::depth::replay::ReplayDepthSource;
use crate::depth::sim::SimulatedDepthSource;
use crate::depth::{spawn_depth_source, DepthFeed};
use crate::ecs::systems::TickContext;
use crate::flock::Flock;
use crate::input;
use crate::render::instance::{GhostInstance, SpriteSink, TallySink};
use crate::settings::{KeyCommand, LiveSettings};
use crate::stats::{FrameWindow, PhaseTimings};

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log FPS and phase timings (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// Frame pacing of the headless loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(4);

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Where depth frames come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthMode {
    Off,
    Simulated,
    Replay(PathBuf),
}

/// Driver options from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub ghosts: Option<usize>,
    /// Stop after this many ticks; run until `q` otherwise.
    pub ticks: Option<u64>,
    pub depth: DepthMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            seed: None,
            ghosts: None,
            ticks: None,
            depth: DepthMode::Simulated,
        }
    }
}

impl Options {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut opts = Options::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| format!("missing value for {flag}"))
            };
            match flag.as_str() {
                "--config" => opts.config = Some(PathBuf::from(value()?)),
                "--seed" => opts.seed = Some(parse_num(&flag, &value()?)?),
                "--ghosts" => opts.ghosts = Some(parse_num(&flag, &value()?)?),
                "--ticks" => opts.ticks = Some(parse_num(&flag, &value()?)?),
                "--depth" => {
                    opts.depth = match value()?.as_str() {
                        "off" => DepthMode::Off,
                        "sim" => DepthMode::Simulated,
                        path => DepthMode::Replay(PathBuf::from(path)),
                    }
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(opts)
    }
}

fn parse_num<T: std::str::FromStr>(flag: &str, raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{flag} expects a number, got {raw:?}"))
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level installation state.
struct App {
    config: FlockConfig,
    live: LiveSettings,
    flock: Flock,
    rng: fastrand::Rng,
    depth: DepthFeed,
    keys: Option<Receiver<KeyCommand>>,
    sound: SoundBank,
    sprites: TallySink,

    // Fixed timestep
    tick_rate: f64,
    accumulator: f64,
    max_ticks: Option<u64>,

    frames: FrameWindow,
    timings: PhaseTimings,

    // Reused each frame
    events: Vec<SoundEvent>,
    instance_buf: Vec<GhostInstance>,
    quit: bool,
}

impl App {
    fn new(config: FlockConfig, opts: &Options) -> Self {
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let flock = Flock::spawn(config.ghost_count, config.bounds, &config, &mut rng);

        let depth = match &opts.depth {
            DepthMode::Off => {
                log::info!("Depth feed disabled");
                DepthFeed::disabled()
            }
            DepthMode::Simulated => {
                log::info!("Using simulated depth sensor");
                DepthFeed::new(spawn_depth_source(SimulatedDepthSource::default()))
            }
            DepthMode::Replay(path) => {
                DepthFeed::new(spawn_depth_source(ReplayDepthSource::new(path.clone())))
            }
        };

        let mut sound = SoundBank::new();
        sound.mark_loaded(SoundId::Startle);
        sound.mark_loaded(SoundId::Bump);

        Self {
            live: LiveSettings::from_config(&config),
            tick_rate: 1.0 / config.tick_rate_hz,
            instance_buf: Vec::with_capacity(config.ghost_count),
            config,
            flock,
            rng,
            depth,
            keys: Some(input::spawn_key_reader()),
            sound,
            sprites: TallySink::default(),
            accumulator: 0.0,
            max_ticks: opts.ticks,
            frames: FrameWindow::new(FPS_LOG_INTERVAL),
            timings: PhaseTimings::new(),
            events: Vec::new(),
            quit: false,
        }
    }

    /// Apply whatever the keyboard thread delivered since last frame.
    fn handle_keys(&mut self) {
        let Some(rx) = &self.keys else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(cmd) => {
                    if !self.live.apply(cmd) {
                        log::info!("Quit requested");
                        self.quit = true;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.keys = None;
                    break;
                }
            }
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        let ctx = TickContext {
            config: &self.config,
            live: &self.live,
            bounds: self.config.bounds,
            depth: self.depth.current(),
        };

        while self.accumulator >= self.tick_rate {
            self.accumulator -= self.tick_rate;
            if self.live.paused {
                continue;
            }
            self.flock
                .tick(&ctx, &mut self.rng, &mut self.events, &mut self.timings);

            if let Some(max) = self.max_ticks {
                if self.flock.ticks() >= max {
                    self.quit = true;
                    break;
                }
            }
        }

        for event in self.events.drain(..) {
            self.sound.play(&event);
        }
    }

    fn frame(&mut self, dt: f64) {
        self.depth.poll();
        self.handle_keys();
        self.run_fixed_update(dt);

        self.flock
            .build_instances(&self.config.visual, self.live.annotations, &mut self.instance_buf);
        self.sprites.draw(&self.instance_buf);

        if let Some(r) = self.frames.push(dt) {
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | frames: {}",
                r.fps,
                r.avg_ms,
                r.min_ms,
                r.max_ms,
                r.total_frames,
            );
            log::info!(
                "tick {} | {:.0}us | {}",
                self.flock.ticks(),
                self.timings.total_us(),
                self.timings.summary()
            );
        }
    }
}

/// Entry point: load configuration and run until quit or the tick limit.
pub fn run(opts: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &opts.config {
        Some(path) => FlockConfig::load(path)?,
        None => FlockConfig::default(),
    };
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }
    if let Some(ghosts) = opts.ghosts {
        config.ghost_count = ghosts;
    }
    config.validate()?;

    let mut app = App::new(config, &opts);
    log::info!("Keys: c/C l/L s/S b/B weights, d/D distance, a annotations, p pause, r reset, q quit");

    let mut last = Instant::now();
    while !app.quit {
        std::thread::sleep(FRAME_INTERVAL);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;
        app.frame(dt);
    }

    log::info!(
        "Stopped after {} ticks: {} sounds played, {} skipped, {} depth frames",
        app.flock.ticks(),
        app.sound.played,
        app.sound.skipped,
        app.depth.frames_received
    );
    Ok(())
}
