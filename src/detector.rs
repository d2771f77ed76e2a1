//! The landmark detector seam, plus a detector that replays recorded output.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FrameSize, LandmarkSet};

/// A per-frame face landmark detector.
///
/// The model itself is external; implementations wrap whatever inference
/// runtime produces the points.
pub trait LandmarkDetector {
    type Frame;

    /// Size of `frame` in detector pixel space.
    fn frame_size(&self, frame: &Self::Frame) -> FrameSize;

    /// Landmarks for the first face in `frame`, or `None` when no face is found.
    fn estimate(&mut self, frame: &Self::Frame) -> Result<Option<LandmarkSet>>;
}

/// Landmarks captured from a live session, one entry per video frame.
///
/// An empty entry records a frame where no face was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub width: f32,
    pub height: f32,
    pub frames: Vec<LandmarkSet>,
}

impl Recording {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let recording: Self = serde_json::from_reader(BufReader::new(file))?;
        recording.validate()?;
        Ok(recording)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let recording: Self = serde_json::from_str(json)?;
        recording.validate()?;
        Ok(recording)
    }

    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(Error::InvalidInput(format!(
                "recording has invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Frame handle for [`ReplayDetector`]: the position in the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayFrame(pub usize);

/// Serves recorded landmarks as if they were being detected live.
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    recording: Recording,
}

impl ReplayDetector {
    pub fn new(recording: Recording) -> Self {
        Self { recording }
    }

    pub fn len(&self) -> usize {
        self.recording.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recording.frames.is_empty()
    }

    /// Frame handles in recording order, for driving a pipeline.
    pub fn frames(&self) -> impl Iterator<Item = ReplayFrame> {
        (0..self.len()).map(ReplayFrame)
    }
}

impl LandmarkDetector for ReplayDetector {
    type Frame = ReplayFrame;

    fn frame_size(&self, _frame: &ReplayFrame) -> FrameSize {
        self.recording.frame_size()
    }

    fn estimate(&mut self, frame: &ReplayFrame) -> Result<Option<LandmarkSet>> {
        let landmarks = self.recording.frames.get(frame.0).ok_or_else(|| {
            Error::Device(format!(
                "frame {} is past the end of the recording ({} frames)",
                frame.0,
                self.recording.frames.len()
            ))
        })?;

        if landmarks.is_empty() {
            Ok(None)
        } else {
            Ok(Some(landmarks.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDING: &str = r#"{
        "width": 640,
        "height": 480,
        "frames": [
            [[1, 2, 0.5], [3, 4, 0.5]],
            [],
            [[5, 6]]
        ]
    }"#;

    #[test]
    fn replays_frames_in_order() {
        let mut detector = ReplayDetector::new(Recording::from_json(RECORDING).unwrap());
        let frames: Vec<_> = detector.frames().collect();
        assert_eq!(frames.len(), 3);

        assert_eq!(detector.frame_size(&frames[0]), FrameSize::new(640.0, 480.0));

        let first = detector.estimate(&frames[0]).unwrap().unwrap();
        assert_eq!(first.num_landmarks(), 2);
        assert!(detector.estimate(&frames[1]).unwrap().is_none());
        assert_eq!(detector.estimate(&frames[2]).unwrap().unwrap().num_landmarks(), 1);
    }

    #[test]
    fn frame_past_end_is_a_device_error() {
        let mut detector = ReplayDetector::new(Recording::from_json(RECORDING).unwrap());
        let err = detector.estimate(&ReplayFrame(3)).unwrap_err();
        assert!(matches!(err, Error::Device(_)));
    }

    #[test]
    fn zero_sized_recording_is_rejected() {
        let err = Recording::from_json(r#"{"width": 0, "height": 480, "frames": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
