use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use super::{DepthError, DepthFrame, DepthSource};

/// Split a recording of back-to-back wire frames into frames.
pub fn decode_recording(mut bytes: &[u8]) -> Result<Vec<DepthFrame>, DepthError> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let (frame, used) = DepthFrame::decode(bytes)?;
        frames.push(frame);
        bytes = &bytes[used..];
    }
    Ok(frames)
}

/// Plays back a recorded capture in a loop at a fixed rate.
pub struct ReplayDepthSource {
    pub path: PathBuf,
    pub fps: f32,
}

impl ReplayDepthSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fps: 30.0,
        }
    }
}

impl DepthSource for ReplayDepthSource {
    fn run(self: Box<Self>, tx: Sender<DepthFrame>) {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Cannot read depth recording {}: {e}", self.path.display());
                return;
            }
        };
        let frames = match decode_recording(&bytes) {
            Ok(f) if !f.is_empty() => f,
            Ok(_) => {
                log::warn!("Depth recording {} is empty", self.path.display());
                return;
            }
            Err(e) => {
                log::warn!("Malformed depth recording {}: {e}", self.path.display());
                return;
            }
        };
        log::info!(
            "Replaying {} depth frames from {}",
            frames.len(),
            self.path.display()
        );

        let interval = Duration::from_secs_f32(1.0 / self.fps.max(1.0));
        for frame in frames.iter().cycle() {
            if tx.send(frame.clone()).is_err() {
                break;
            }
            thread::sleep(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_splits_into_frames() {
        let a = DepthFrame::new(2, 1, vec![1000, 2000]).unwrap();
        let b = DepthFrame::new(1, 2, vec![300, 0]).unwrap();
        let mut bytes = a.encode();
        bytes.extend(b.encode());

        let frames = decode_recording(&bytes).unwrap();
        assert_eq!(frames, vec![a, b]);
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        let mut bytes = DepthFrame::new(1, 1, vec![700]).unwrap().encode();
        bytes.push(9);
        assert!(matches!(
            decode_recording(&bytes),
            Err(DepthError::Truncated { .. })
        ));
    }
}
