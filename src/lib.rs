//! # face-overlay
//!
//! Landmark-driven overlay geometry for live face decoration.
//!
//! An external face-mesh model reports landmark points for every video frame.
//! This crate turns a fixed ring of those landmarks (the outer lips, by
//! default) into a renderable polygon aligned to the face:
//!
//! 1. Select the contour's landmarks from the detected set, in ring order
//! 2. Map each point from detector pixel space into the render target's space
//!    (undoing front-camera mirroring, flipping or normalising axes)
//! 3. Triangulate the ring as a fan around its centroid
//! 4. Hand the vertex and index buffers to a render target
//!
//! The [`FramePipeline`] repeats this once per frame and decides what to show
//! when no face is found, according to a [`MissPolicy`].
//!
//! ## Quick Start
//!
//! ```rust
//! use face_overlay::{build_fan, CoordinateMapper, FrameSize, MirrorFlip, Point};
//!
//! let frame = FrameSize::new(640.0, 480.0);
//! let ring: Vec<Point> = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
//!     .iter()
//!     .map(|&(x, y)| MirrorFlip.map(Point::new(x, y), frame))
//!     .collect();
//!
//! let fan = build_fan(&ring).unwrap();
//! assert_eq!(fan.num_triangles(), 4);
//! assert_eq!(fan.indices, vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4]);
//! ```
//!
//! ## Custom Detectors
//!
//! Implement [`LandmarkDetector`] around your inference runtime:
//!
//! ```rust
//! use face_overlay::{FrameSize, LandmarkDetector, LandmarkSet, Result};
//!
//! struct MyDetector { /* ... */ }
//!
//! impl LandmarkDetector for MyDetector {
//!     type Frame = Vec<u8>;
//!
//!     fn frame_size(&self, _frame: &Vec<u8>) -> FrameSize {
//!         FrameSize::new(640.0, 480.0)
//!     }
//!
//!     fn estimate(&mut self, _frame: &Vec<u8>) -> Result<Option<LandmarkSet>> {
//!         // Run the model; return Ok(None) when no face is found
//!         Ok(None)
//!     }
//! }
//! ```

mod config;
mod contour;
mod detector;
mod error;
mod fan;
mod mapping;
mod overlay;
mod pipeline;
mod render;
mod style;
mod types;

pub use config::{ContourSpec, OverlayConfig};
pub use contour::{
    Contour, ContourPreset, FACE_MESH_LANDMARKS, LIPS_INNER_RING, LIPS_OUTER_RING, OUTER_LIPS,
};
pub use detector::{LandmarkDetector, Recording, ReplayDetector, ReplayFrame};
pub use error::{Error, Result};
pub use fan::{build_fan, polygon_area, FanPolygon};
pub use mapping::{CoordinateMapper, Identity, MappingPolicy, MirrorFlip, NormalizeCenter};
pub use overlay::OverlayBuilder;
pub use pipeline::{FrameOutcome, FramePipeline, FrameReport, MissPolicy, RunStats};
pub use render::{AnyTarget, CanvasOrigin, CanvasTarget, MeshTarget, RenderBackend, RenderTarget};
pub use style::{Color, OverlayStyle};
pub use types::{FrameSize, Landmark, LandmarkSet, Point};
