use log::trace;

use crate::contour::Contour;
use crate::error::{Error, Result};
use crate::fan::{build_fan, FanPolygon};
use crate::mapping::{CoordinateMapper, MappingPolicy};
use crate::types::{FrameSize, LandmarkSet};

/// Builds the overlay polygon for one frame: select the contour's landmarks,
/// map them into target space, then fan-triangulate the ring.
#[derive(Debug, Clone)]
pub struct OverlayBuilder<M = MappingPolicy> {
    contour: Contour,
    mapper: M,
}

impl<M: CoordinateMapper> OverlayBuilder<M> {
    pub fn new(contour: Contour, mapper: M) -> Self {
        Self { contour, mapper }
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Build the overlay for a detected landmark set.
    ///
    /// Fails with [`Error::NoDetection`] when the set is empty or too short to
    /// contain every contour index.
    pub fn build(&self, landmarks: &LandmarkSet, frame: FrameSize) -> Result<FanPolygon> {
        let ring = self.contour.select(landmarks).ok_or(Error::NoDetection)?;

        let mapped: Vec<_> = ring
            .into_iter()
            .map(|p| self.mapper.map(p, frame))
            .collect();

        let fan = build_fan(&mapped)?;
        trace!(
            "built overlay: {} vertices, {} triangles",
            fan.vertices.len(),
            fan.num_triangles()
        );
        Ok(fan)
    }
}
