use instant::Instant;

/// Exponential moving average.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ema {
    value: Option<f64>,
}

impl Ema {
    const ALPHA: f64 = 0.1;

    /// The first sample seeds the average directly.
    pub fn record(&mut self, sample: f64) {
        self.value = Some(match self.value {
            Some(v) => v + (sample - v) * Self::ALPHA,
            None => sample,
        });
    }

    pub fn get(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// The timed stages of one flock tick, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Cooldowns,
    Snapshot,
    Steering,
    Movement,
    Sprites,
    Depth,
    Visual,
}

impl TickPhase {
    pub const COUNT: usize = 7;
    pub const ALL: [TickPhase; Self::COUNT] = [
        Self::Cooldowns,
        Self::Snapshot,
        Self::Steering,
        Self::Movement,
        Self::Sprites,
        Self::Depth,
        Self::Visual,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cooldowns => "cooldowns",
            Self::Snapshot => "snapshot",
            Self::Steering => "steering",
            Self::Movement => "movement",
            Self::Sprites => "sprites",
            Self::Depth => "depth",
            Self::Visual => "visual",
        }
    }
}

/// Smoothed wall time per tick phase, in microseconds.
#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    phases: [Ema; TickPhase::COUNT],
}

impl PhaseTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, charging its wall time to `phase`.
    pub fn measure<R>(&mut self, phase: TickPhase, f: impl FnOnce() -> R) -> R {
        let started = Instant::now();
        let out = f();
        self.phases[phase as usize].record(started.elapsed().as_secs_f64() * 1e6);
        out
    }

    pub fn get(&self, phase: TickPhase) -> f64 {
        self.phases[phase as usize].get()
    }

    pub fn total_us(&self) -> f64 {
        self.phases.iter().map(Ema::get).sum()
    }

    /// `steering 120us | movement 8us | ...` for the periodic log line.
    pub fn summary(&self) -> String {
        TickPhase::ALL
            .iter()
            .map(|&p| format!("{} {:.0}us", p.label(), self.get(p)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Frame-time figures for one reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub fps: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_frames: u64,
}

/// Collects frame durations and closes a report every `interval_secs`.
#[derive(Debug)]
pub struct FrameWindow {
    interval_secs: f64,
    opened: Instant,
    total_frames: u64,
    frames: u32,
    sum: f64,
    min: f64,
    max: f64,
}

impl FrameWindow {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            opened: Instant::now(),
            total_frames: 0,
            frames: 0,
            sum: 0.0,
            min: f64::MAX,
            max: 0.0,
        }
    }

    /// Record one frame; returns a report when the window closes.
    pub fn push(&mut self, dt: f64) -> Option<FrameReport> {
        let elapsed = self.opened.elapsed().as_secs_f64();
        let report = self.push_elapsed(dt, elapsed);
        if report.is_some() {
            self.opened = Instant::now();
        }
        report
    }

    fn push_elapsed(&mut self, dt: f64, elapsed: f64) -> Option<FrameReport> {
        self.total_frames += 1;
        self.frames += 1;
        self.sum += dt;
        self.min = self.min.min(dt);
        self.max = self.max.max(dt);

        if elapsed < self.interval_secs {
            return None;
        }
        let report = FrameReport {
            fps: self.frames as f64 / elapsed,
            avg_ms: self.sum / self.frames as f64 * 1000.0,
            min_ms: self.min * 1000.0,
            max_ms: self.max * 1000.0,
            total_frames: self.total_frames,
        };
        self.frames = 0;
        self.sum = 0.0;
        self.min = f64::MAX;
        self.max = 0.0;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeds_then_smooths() {
        let mut ema = Ema::default();
        assert_eq!(ema.get(), 0.0);
        ema.record(100.0);
        assert_eq!(ema.get(), 100.0);
        ema.record(200.0);
        assert!((ema.get() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn measure_returns_the_closure_result() {
        let mut timings = PhaseTimings::new();
        let n = timings.measure(TickPhase::Steering, || 2 + 2);
        assert_eq!(n, 4);
        assert!(timings.get(TickPhase::Steering) >= 0.0);
        assert!(timings.summary().starts_with("cooldowns"));
    }

    #[test]
    fn window_reports_once_interval_passes() {
        let mut window = FrameWindow::new(5.0);
        assert_eq!(window.push_elapsed(0.010, 1.0), None);
        assert_eq!(window.push_elapsed(0.030, 2.0), None);
        let report = window.push_elapsed(0.020, 5.0).unwrap();
        assert!((report.fps - 0.6).abs() < 1e-9);
        assert!((report.avg_ms - 20.0).abs() < 1e-9);
        assert!((report.min_ms - 10.0).abs() < 1e-9);
        assert!((report.max_ms - 30.0).abs() < 1e-9);
        assert_eq!(report.total_frames, 3);

        // Next window starts empty but keeps the running total.
        let next = window.push_elapsed(0.016, 5.0).unwrap();
        assert_eq!(next.total_frames, 4);
        assert!((next.min_ms - 16.0).abs() < 1e-9);
    }
}
