//! Startup configuration.
//!
//! Everything is validated up front so that a bad contour or mapping is
//! reported before the first frame is processed.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::contour::{Contour, ContourPreset, FACE_MESH_LANDMARKS};
use crate::error::{Error, Result};
use crate::mapping::MappingPolicy;
use crate::overlay::OverlayBuilder;
use crate::pipeline::MissPolicy;
use crate::render::{CanvasOrigin, RenderBackend};
use crate::style::{Color, OverlayStyle};

/// A contour given either by preset name or as an explicit index list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContourSpec {
    Preset(ContourPreset),
    Indices(Vec<usize>),
}

impl Default for ContourSpec {
    fn default() -> Self {
        ContourSpec::Preset(ContourPreset::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub contour: ContourSpec,
    /// Points per face reported by the detector.
    pub landmark_count: usize,
    pub mapping: MappingPolicy,
    pub backend: RenderBackend,
    /// Row origin of the canvas raster. Derived from `mapping` when unset.
    pub canvas_origin: Option<CanvasOrigin>,
    pub miss_policy: MissPolicy,
    pub color: Color,
    pub opacity: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            contour: ContourSpec::default(),
            landmark_count: FACE_MESH_LANDMARKS,
            mapping: MappingPolicy::default(),
            backend: RenderBackend::default(),
            canvas_origin: None,
            miss_policy: MissPolicy::default(),
            color: Color::default(),
            opacity: OverlayStyle::DEFAULT_OPACITY,
        }
    }
}

impl OverlayConfig {
    /// Read and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.contour()?;

        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(Error::InvalidConfig(format!(
                "opacity {} is outside [0, 1]",
                self.opacity
            )));
        }

        if let MappingPolicy::NormalizeCenter { scale_x, scale_y } = self.mapping {
            if !(scale_x.is_finite() && scale_y.is_finite()) || scale_x == 0.0 || scale_y == 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "normalize_center scale must be finite and non-zero, got {}x{}",
                    scale_x, scale_y
                )));
            }
        }

        if self.backend == RenderBackend::Canvas {
            if let MappingPolicy::NormalizeCenter { .. } = self.mapping {
                return Err(Error::InvalidConfig(
                    "canvas backend draws in pixel space; use mirror_flip or identity mapping"
                        .into(),
                ));
            }
        }

        Ok(())
    }

    /// Canvas row origin matching the mapping's output space: `mirror_flip`
    /// produces bottom-left coordinates, `identity` keeps the detector's
    /// top-left ones.
    pub fn effective_canvas_origin(&self) -> CanvasOrigin {
        match (self.canvas_origin, self.mapping) {
            (Some(origin), _) => origin,
            (None, MappingPolicy::MirrorFlip) => CanvasOrigin::BottomLeft,
            (None, _) => CanvasOrigin::TopLeft,
        }
    }

    pub fn contour(&self) -> Result<Contour> {
        let indices = match &self.contour {
            ContourSpec::Preset(preset) => preset.indices().to_vec(),
            ContourSpec::Indices(indices) => indices.clone(),
        };
        Contour::new(indices, self.landmark_count)
    }

    pub fn style(&self) -> OverlayStyle {
        OverlayStyle::new(self.color, self.opacity)
    }

    pub fn build_overlay(&self) -> Result<OverlayBuilder> {
        self.validate()?;
        Ok(OverlayBuilder::new(self.contour()?, self.mapping))
    }
}
