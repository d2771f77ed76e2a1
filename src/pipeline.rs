//! Per-frame orchestration: detect, build, render, present.
//!
//! One frame at a time, on the caller's thread. The only wait is inside the
//! detector call; a slow detector simply delays the next frame. The overlay
//! is rebuilt completely before it is handed to the render target.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::detector::LandmarkDetector;
use crate::error::{Error, Result};
use crate::fan::FanPolygon;
use crate::mapping::{CoordinateMapper, MappingPolicy};
use crate::overlay::OverlayBuilder;
use crate::render::RenderTarget;
use crate::style::OverlayStyle;

/// What to show on a frame where no face was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Re-render the last overlay unchanged.
    #[default]
    KeepStale,
    /// Hide the overlay until the face is found again.
    Hide,
}

/// How a frame was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameOutcome {
    /// Fresh geometry from this frame's landmarks.
    Updated,
    /// No detection; the previous overlay was shown again.
    Stale,
    /// No detection; nothing was shown.
    Hidden,
}

/// Summary of one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub index: u64,
    pub outcome: FrameOutcome,
    pub triangles: usize,
    pub area: f32,
}

/// Totals for a [`FramePipeline::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunStats {
    pub frames: u64,
    pub updated: u64,
    pub stale: u64,
    pub hidden: u64,
}

impl RunStats {
    fn record(&mut self, outcome: FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Updated => self.updated += 1,
            FrameOutcome::Stale => self.stale += 1,
            FrameOutcome::Hidden => self.hidden += 1,
        }
    }
}

/// Drives a detector and a render target with a fixed overlay builder.
pub struct FramePipeline<D, R, M = MappingPolicy> {
    detector: D,
    target: R,
    builder: OverlayBuilder<M>,
    miss_policy: MissPolicy,
    current: Option<FanPolygon>,
    frame_index: u64,
}

impl<D, R, M> FramePipeline<D, R, M>
where
    D: LandmarkDetector,
    R: RenderTarget,
    M: CoordinateMapper,
{
    pub fn new(detector: D, target: R, builder: OverlayBuilder<M>) -> Self {
        Self {
            detector,
            target,
            builder,
            miss_policy: MissPolicy::default(),
            current: None,
            frame_index: 0,
        }
    }

    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    pub fn miss_policy(&self) -> MissPolicy {
        self.miss_policy
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn into_target(self) -> R {
        self.target
    }

    pub fn builder(&self) -> &OverlayBuilder<M> {
        &self.builder
    }

    /// The overlay currently on screen, if any.
    pub fn current_overlay(&self) -> Option<&FanPolygon> {
        self.current.as_ref()
    }

    /// Process one frame with the given style.
    ///
    /// Missed detections are handled according to the [`MissPolicy`] and are
    /// not errors. Detector, render and geometry failures propagate.
    pub fn process_frame(&mut self, frame: &D::Frame, style: &OverlayStyle) -> Result<FrameReport> {
        let index = self.frame_index;
        self.frame_index += 1;

        let size = self.detector.frame_size(frame);
        let built = match self.detector.estimate(frame)? {
            Some(landmarks) => match self.builder.build(&landmarks, size) {
                Ok(fan) => Some(fan),
                Err(Error::NoDetection) => {
                    warn!(
                        "frame {}: {} landmarks, contour needs {}; treating as missed",
                        index,
                        landmarks.num_landmarks(),
                        self.builder.contour().landmark_count()
                    );
                    None
                }
                Err(e) => return Err(e),
            },
            None => {
                debug!("frame {}: no face detected", index);
                None
            }
        };

        let outcome = match built {
            Some(fan) => {
                self.target.draw(&fan, style)?;
                self.current = Some(fan);
                FrameOutcome::Updated
            }
            None => self.handle_miss(style)?,
        };
        self.target.present()?;

        let (triangles, area) = match (&outcome, &self.current) {
            (FrameOutcome::Hidden, _) | (_, None) => (0, 0.0),
            (_, Some(fan)) => (fan.num_triangles(), fan.area()),
        };
        debug!("frame {}: {:?}, {} triangles", index, outcome, triangles);

        Ok(FrameReport {
            index,
            outcome,
            triangles,
            area,
        })
    }

    fn handle_miss(&mut self, style: &OverlayStyle) -> Result<FrameOutcome> {
        match self.miss_policy {
            MissPolicy::KeepStale => match &self.current {
                Some(fan) => {
                    self.target.draw(fan, style)?;
                    Ok(FrameOutcome::Stale)
                }
                None => {
                    self.target.hide()?;
                    Ok(FrameOutcome::Hidden)
                }
            },
            MissPolicy::Hide => {
                self.current = None;
                self.target.hide()?;
                Ok(FrameOutcome::Hidden)
            }
        }
    }

    /// Process every frame from `frames` with a fixed style.
    pub fn run<I>(&mut self, frames: I, style: &OverlayStyle) -> Result<RunStats>
    where
        I: IntoIterator<Item = D::Frame>,
    {
        self.run_with(frames, |_| *style, |_, _| Ok(()))
    }

    /// Process every frame from `frames` until the source ends.
    ///
    /// `style_for` is asked for the style of each frame by index, so colour
    /// changes take effect on the next frame. `on_frame` sees each report
    /// together with the render target after the frame is presented.
    pub fn run_with<I, S, F>(&mut self, frames: I, mut style_for: S, mut on_frame: F) -> Result<RunStats>
    where
        I: IntoIterator<Item = D::Frame>,
        S: FnMut(u64) -> OverlayStyle,
        F: FnMut(&FrameReport, &R) -> Result<()>,
    {
        let mut stats = RunStats::default();
        for frame in frames {
            let style = style_for(self.frame_index);
            let report = self.process_frame(&frame, &style)?;
            stats.record(report.outcome);
            on_frame(&report, &self.target)?;
        }
        info!(
            "processed {} frames: {} updated, {} stale, {} hidden",
            stats.frames, stats.updated, stats.stale, stats.hidden
        );
        Ok(stats)
    }
}
