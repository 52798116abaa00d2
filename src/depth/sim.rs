use std::f32::consts::TAU;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use super::{DepthFrame, DepthSource};

/// Reading for cells the visitor does not cover; beyond the valid window.
const BACKGROUND_MM: u16 = 4500;
/// Closest and farthest the visitor gets.
const NEAR_MM: f32 = 800.0;
const FAR_MM: f32 = 2800.0;

/// Synthetic sensor: one visitor wandering a Lissajous path in front of the
/// screen, stepping closer and backing off every `approach_period` seconds.
pub struct SimulatedDepthSource {
    pub width: usize,
    pub height: usize,
    pub fps: f32,
    /// Visitor radius as a fraction of grid height.
    pub radius: f32,
    pub approach_period: f32,
    /// Stop after this many frames; `None` runs until the receiver is gone.
    pub max_frames: Option<u64>,
}

impl Default for SimulatedDepthSource {
    fn default() -> Self {
        Self {
            width: 320,
            height: 288,
            fps: 30.0,
            radius: 0.18,
            approach_period: 8.0,
            max_frames: None,
        }
    }
}

impl SimulatedDepthSource {
    /// Render the frame for time `t` seconds.
    pub fn frame_at(&self, t: f32) -> DepthFrame {
        let w = self.width as f32;
        let h = self.height as f32;
        let cx = w * (0.5 + 0.35 * (t * 0.21).sin());
        let cy = h * (0.5 + 0.3 * (t * 0.13 + 1.0).sin());
        let r = h * self.radius;

        // 0 = far, 1 = near; eased so the visitor lingers at both ends.
        let phase = 0.5 - 0.5 * (t / self.approach_period * TAU).cos();
        let depth = FAR_MM + (NEAR_MM - FAR_MM) * phase;

        let mut samples = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                let sample = if d2 < r * r {
                    // Slightly rounded body: the centre is closest.
                    (depth + 150.0 * d2 / (r * r)) as u16
                } else {
                    BACKGROUND_MM
                };
                samples.push(sample);
            }
        }

        DepthFrame {
            width: self.width,
            height: self.height,
            samples,
        }
    }
}

impl DepthSource for SimulatedDepthSource {
    fn run(self: Box<Self>, tx: Sender<DepthFrame>) {
        if self.width == 0 || self.height == 0 || self.fps <= 0.0 {
            log::warn!("Simulated depth source has an empty grid or no frame rate; not starting");
            return;
        }
        let interval = Duration::from_secs_f32(1.0 / self.fps);
        log::info!(
            "Simulated depth source: {}x{} @ {:.0} fps",
            self.width,
            self.height,
            self.fps
        );

        let mut frame_index = 0u64;
        loop {
            if self.max_frames.is_some_and(|max| frame_index >= max) {
                break;
            }
            let t = frame_index as f32 / self.fps;
            if tx.send(self.frame_at(t)).is_err() {
                break;
            }
            frame_index += 1;
            thread::sleep(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::spawn_depth_source;

    fn small() -> SimulatedDepthSource {
        SimulatedDepthSource {
            width: 64,
            height: 48,
            ..Default::default()
        }
    }

    #[test]
    fn visitor_is_closer_than_background() {
        let source = small();
        let frame = source.frame_at(source.approach_period / 2.0);
        let nearest = (0..frame.height())
            .flat_map(|y| (0..frame.width()).map(move |x| (x, y)))
            .filter_map(|(x, y)| frame.get(x, y))
            .min()
            .unwrap();
        assert!(nearest < 1000);
        assert_eq!(frame.get(0, 0), Some(BACKGROUND_MM));
    }

    #[test]
    fn spawned_source_delivers_frames() {
        let rx = spawn_depth_source(SimulatedDepthSource {
            fps: 1000.0,
            max_frames: Some(3),
            ..small()
        });
        let frames: Vec<DepthFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].width(), 64);
    }
}
