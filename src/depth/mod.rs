pub mod replay;
pub mod sim;

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use glam::Vec2;
use thiserror::Error;

use crate::config::{Bounds, DepthConfig};

/// Bytes in the wire header (`u16` width, `u16` height).
pub const HEADER_LEN: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepthError {
    #[error("depth grid has zero width or height")]
    EmptyGrid,
    #[error("depth frame truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("depth grid {width}x{height} does not match {len} samples")]
    SizeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// One grid of depth readings in millimetres, row-major. Zero means no reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: usize,
    height: usize,
    samples: Vec<u16>,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize, samples: Vec<u16>) -> Result<Self, DepthError> {
        if width == 0 || height == 0 {
            return Err(DepthError::EmptyGrid);
        }
        if samples.len() != width * height {
            return Err(DepthError::SizeMismatch {
                width,
                height,
                len: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// Bytes one encoded frame of this size occupies.
    pub fn encoded_len(width: usize, height: usize) -> usize {
        HEADER_LEN + width * height * 2
    }

    /// Decode one little-endian frame: `u16 width, u16 height, width*height u16`.
    /// Returns the frame and the number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), DepthError> {
        if bytes.len() < HEADER_LEN {
            return Err(DepthError::Truncated {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        let width = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        let height = u16::from_le_bytes([bytes[2], bytes[3]]) as usize;
        if width == 0 || height == 0 {
            return Err(DepthError::EmptyGrid);
        }
        let expected = Self::encoded_len(width, height);
        if bytes.len() < expected {
            return Err(DepthError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        let samples = bytes[HEADER_LEN..expected]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok((Self::new(width, height, samples)?, expected))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encoded_len(self.width, self.height));
        out.extend_from_slice(&(self.width as u16).to_le_bytes());
        out.extend_from_slice(&(self.height as u16).to_le_bytes());
        for sample in &self.samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }
}

/// Maps canvas positions onto depth grid cells.
///
/// The canvas shows only the centre of the sensor image: `crop_margin` of the
/// grid is hidden on every edge. Lookups are nearest-cell, and anything outside
/// the canvas, a zero cell, or a reading outside the sensor's valid window
/// yields `None`.
#[derive(Debug, Clone, Copy)]
pub struct DepthMapping {
    pub crop_margin: f32,
    pub min_valid_mm: u16,
    pub max_valid_mm: u16,
}

impl DepthMapping {
    pub fn from_config(cfg: &DepthConfig) -> Self {
        Self {
            crop_margin: cfg.crop_margin,
            min_valid_mm: cfg.min_valid_mm,
            max_valid_mm: cfg.max_valid_mm,
        }
    }

    pub fn cell(&self, frame: &DepthFrame, pos: Vec2, bounds: Bounds) -> Option<(usize, usize)> {
        if !pos.is_finite()
            || pos.x < 0.0
            || pos.y < 0.0
            || pos.x >= bounds.width
            || pos.y >= bounds.height
        {
            return None;
        }
        let gx = remap_axis(pos.x / bounds.width, frame.width, self.crop_margin);
        let gy = remap_axis(pos.y / bounds.height, frame.height, self.crop_margin);
        Some((gx, gy))
    }

    pub fn sample(&self, frame: &DepthFrame, pos: Vec2, bounds: Bounds) -> Option<f32> {
        let (gx, gy) = self.cell(frame, pos, bounds)?;
        let raw = frame.get(gx, gy)?;
        if raw == 0 || raw < self.min_valid_mm || raw > self.max_valid_mm {
            return None;
        }
        Some(raw as f32)
    }
}

/// `t` in [0, 1) onto a cell index of an axis `len` cells long.
fn remap_axis(t: f32, len: usize, crop: f32) -> usize {
    let len_f = len as f32;
    let lo = len_f * crop;
    let span = len_f - 2.0 * lo;
    let cell = (lo + t * span).floor();
    (cell.max(0.0) as usize).min(len - 1)
}

/// Anything that can push depth frames over a channel. Runs on its own
/// thread; see [`spawn_depth_source`].
pub trait DepthSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<DepthFrame>);
}

/// Spawn a depth source on its own thread and return the receiving end.
pub fn spawn_depth_source<S: DepthSource>(source: S) -> Receiver<DepthFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// The tick loop's view of the sensor: the most recent frame, if any.
///
/// Frames are installed between ticks as a shared snapshot. Nothing here
/// blocks, so a stalled or disconnected source just leaves the last frame in
/// place.
pub struct DepthFeed {
    rx: Option<Receiver<DepthFrame>>,
    current: Option<Arc<DepthFrame>>,
    pub frames_received: u64,
    disconnected: bool,
}

impl DepthFeed {
    pub fn new(rx: Receiver<DepthFrame>) -> Self {
        Self {
            rx: Some(rx),
            current: None,
            frames_received: 0,
            disconnected: false,
        }
    }

    /// A feed that never delivers anything.
    pub fn disabled() -> Self {
        Self {
            rx: None,
            current: None,
            frames_received: 0,
            disconnected: true,
        }
    }

    /// Drain pending frames without blocking and install the newest one.
    pub fn poll(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(frame) => {
                    if self.frames_received == 0 {
                        log::info!(
                            "Depth feed connected: {}x{} grid",
                            frame.width(),
                            frame.height()
                        );
                    }
                    self.frames_received += 1;
                    self.current = Some(Arc::new(frame));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        log::warn!("Depth feed disconnected; keeping last frame");
                        self.disconnected = true;
                    }
                    self.rx = None;
                    break;
                }
            }
        }
    }

    pub fn current(&self) -> Option<&DepthFrame> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> DepthMapping {
        DepthMapping {
            crop_margin: 0.1,
            min_valid_mm: 300,
            max_valid_mm: 3000,
        }
    }

    fn frame_with(width: usize, height: usize, f: impl Fn(usize, usize) -> u16) -> DepthFrame {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        DepthFrame::new(width, height, samples).unwrap()
    }

    #[test]
    fn remap_skips_cropped_edges() {
        let frame = frame_with(100, 50, |_, _| 1000);
        let bounds = Bounds::new(1000.0, 500.0);
        let m = mapping();
        assert_eq!(m.cell(&frame, Vec2::new(0.0, 0.0), bounds), Some((10, 5)));
        assert_eq!(m.cell(&frame, Vec2::new(500.0, 250.0), bounds), Some((50, 25)));
        assert_eq!(m.cell(&frame, Vec2::new(999.9, 499.9), bounds), Some((89, 44)));
    }

    #[test]
    fn out_of_canvas_is_no_data() {
        let frame = frame_with(10, 10, |_, _| 1000);
        let bounds = Bounds::new(100.0, 100.0);
        let m = mapping();
        assert_eq!(m.sample(&frame, Vec2::new(-1.0, 50.0), bounds), None);
        assert_eq!(m.sample(&frame, Vec2::new(50.0, 100.0), bounds), None);
        assert_eq!(m.sample(&frame, Vec2::new(f32::NAN, 5.0), bounds), None);
        assert_eq!(m.sample(&frame, Vec2::new(50.0, 50.0), bounds), Some(1000.0));
    }

    #[test]
    fn invalid_readings_are_no_data() {
        let frame = frame_with(3, 1, |x, _| [0, 200, 3500][x]);
        let bounds = Bounds::new(3.0, 1.0);
        let m = DepthMapping {
            crop_margin: 0.0,
            ..mapping()
        };
        for x in 0..3 {
            assert_eq!(m.sample(&frame, Vec2::new(x as f32 + 0.5, 0.5), bounds), None);
        }
    }

    #[test]
    fn decode_reads_what_encode_wrote() {
        let frame = frame_with(4, 3, |x, y| (x * 100 + y) as u16);
        let bytes = frame.encode();
        let (decoded, used) = DepthFrame::decode(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_short_and_empty_frames() {
        assert_eq!(
            DepthFrame::decode(&[1, 0]),
            Err(DepthError::Truncated {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(DepthFrame::decode(&[0, 0, 5, 0]), Err(DepthError::EmptyGrid));
        assert_eq!(
            DepthFrame::decode(&[2, 0, 1, 0, 7, 0]),
            Err(DepthError::Truncated {
                expected: 8,
                actual: 6
            })
        );
    }

    #[test]
    fn feed_keeps_newest_and_survives_disconnect() {
        let (tx, rx) = mpsc::channel();
        let mut feed = DepthFeed::new(rx);
        feed.poll();
        assert!(feed.current().is_none());

        tx.send(frame_with(2, 2, |_, _| 500)).unwrap();
        tx.send(frame_with(2, 2, |_, _| 900)).unwrap();
        feed.poll();
        assert_eq!(feed.frames_received, 2);
        assert_eq!(feed.current().and_then(|f| f.get(0, 0)), Some(900));

        drop(tx);
        feed.poll();
        assert_eq!(feed.current().and_then(|f| f.get(1, 1)), Some(900));
    }
}
