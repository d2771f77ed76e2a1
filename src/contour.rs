//! Contours: ordered landmark index rings that outline a facial region.
//!
//! Index values are specific to the detector's numbering scheme. The presets
//! here use the 468-point face mesh topology.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{LandmarkSet, Point};

/// Number of landmarks produced by the face mesh model.
pub const FACE_MESH_LANDMARKS: usize = 468;

/// Lower outer lip followed by the inner edge of the upper lip.
pub const OUTER_LIPS: [usize; 16] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308, 324, 318, 402, 317,
];

/// The full outer lip boundary, clockwise from the left mouth corner.
pub const LIPS_OUTER_RING: [usize; 20] = [
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 409, 270, 269, 267, 0, 37, 39, 40, 185,
];

/// The inner lip boundary (mouth opening).
pub const LIPS_INNER_RING: [usize; 20] = [
    78, 95, 88, 178, 87, 14, 317, 402, 318, 324, 308, 415, 310, 311, 312, 13, 82, 81, 80, 191,
];

/// Named contour presets for the face mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourPreset {
    #[default]
    OuterLips,
    LipsOuterRing,
    LipsInnerRing,
}

impl ContourPreset {
    pub fn indices(&self) -> &'static [usize] {
        match self {
            ContourPreset::OuterLips => &OUTER_LIPS,
            ContourPreset::LipsOuterRing => &LIPS_OUTER_RING,
            ContourPreset::LipsInnerRing => &LIPS_INNER_RING,
        }
    }
}

/// A validated ring of landmark indices.
///
/// Construction fails fast so that a bad contour is reported at startup
/// instead of on the first detected frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    indices: Vec<usize>,
    landmark_count: usize,
}

impl Contour {
    /// Minimum ring length that encloses an area.
    pub const MIN_LEN: usize = 3;

    /// Validate `indices` against a detector that reports `landmark_count` points.
    pub fn new(indices: Vec<usize>, landmark_count: usize) -> Result<Self> {
        if indices.len() < Self::MIN_LEN {
            return Err(Error::invalid_contour(format!(
                "{} indices given, at least {} required",
                indices.len(),
                Self::MIN_LEN
            )));
        }

        if let Some((pos, &idx)) = indices
            .iter()
            .enumerate()
            .find(|(_, idx)| **idx >= landmark_count)
        {
            return Err(Error::invalid_contour(format!(
                "index {} at position {} is out of range for {} landmarks",
                idx, pos, landmark_count
            )));
        }

        Ok(Self {
            indices,
            landmark_count,
        })
    }

    pub fn from_preset(preset: ContourPreset) -> Self {
        Self {
            indices: preset.indices().to_vec(),
            landmark_count: FACE_MESH_LANDMARKS,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Landmark count this contour was validated against.
    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    /// Pick the contour's points out of a detected landmark set, in ring order.
    ///
    /// Returns `None` when the set is too short to contain every index.
    pub fn select(&self, landmarks: &LandmarkSet) -> Option<Vec<Point>> {
        self.indices
            .iter()
            .map(|&idx| landmarks.get(idx).map(|l| l.to_point()))
            .collect()
    }
}
