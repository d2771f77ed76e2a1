//! Conversion from detector pixel space into render-target space.
//!
//! Detectors report landmarks in pixel coordinates with the origin at the
//! top-left of the captured frame. Front cameras capture a mirrored image, and
//! most 3D scene graphs put the origin bottom-left or at the centre, so each
//! render target needs its own mapping. No rounding or clamping is applied:
//! out-of-frame detector output passes through and is clipped by the renderer.

use serde::{Deserialize, Serialize};

use crate::types::{FrameSize, Point};

/// Maps a point from detector space into a target space.
pub trait CoordinateMapper {
    fn map(&self, point: Point, frame: FrameSize) -> Point;
}

/// Undo capture mirroring and invert the vertical axis:
/// `x' = width - x`, `y' = height - y`.
///
/// Used for a pixel-sized orthographic target with a bottom-left origin.
/// This mapping is its own inverse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MirrorFlip;

impl CoordinateMapper for MirrorFlip {
    fn map(&self, point: Point, frame: FrameSize) -> Point {
        Point::new(frame.width - point.x, frame.height - point.y)
    }
}

/// Map into a centred, resolution-independent plane of extent
/// `scale_x` by `scale_y`:
/// `x' = (x / width - 0.5) * scale_x`, `y' = -(y / height - 0.5) * scale_y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeCenter {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl NormalizeCenter {
    pub const fn new(scale_x: f32, scale_y: f32) -> Self {
        Self { scale_x, scale_y }
    }
}

impl Default for NormalizeCenter {
    fn default() -> Self {
        Self::new(2.0, 2.0)
    }
}

impl CoordinateMapper for NormalizeCenter {
    fn map(&self, point: Point, frame: FrameSize) -> Point {
        Point::new(
            (point.x / frame.width - 0.5) * self.scale_x,
            -(point.y / frame.height - 0.5) * self.scale_y,
        )
    }
}

/// Pass points through unchanged, for targets drawn in detector space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Identity;

impl CoordinateMapper for Identity {
    fn map(&self, point: Point, _frame: FrameSize) -> Point {
        point
    }
}

/// Mapping strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingPolicy {
    #[default]
    MirrorFlip,
    NormalizeCenter {
        scale_x: f32,
        scale_y: f32,
    },
    Identity,
}

impl CoordinateMapper for MappingPolicy {
    fn map(&self, point: Point, frame: FrameSize) -> Point {
        match *self {
            MappingPolicy::MirrorFlip => MirrorFlip.map(point, frame),
            MappingPolicy::NormalizeCenter { scale_x, scale_y } => {
                NormalizeCenter::new(scale_x, scale_y).map(point, frame)
            }
            MappingPolicy::Identity => Identity.map(point, frame),
        }
    }
}

impl From<NormalizeCenter> for MappingPolicy {
    fn from(n: NormalizeCenter) -> Self {
        MappingPolicy::NormalizeCenter {
            scale_x: n.scale_x,
            scale_y: n.scale_y,
        }
    }
}

impl<M: CoordinateMapper + ?Sized> CoordinateMapper for Box<M> {
    fn map(&self, point: Point, frame: FrameSize) -> Point {
        (**self).map(point, frame)
    }
}

impl<M: CoordinateMapper + ?Sized> CoordinateMapper for &M {
    fn map(&self, point: Point, frame: FrameSize) -> Point {
        (**self).map(point, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VGA: FrameSize = FrameSize::new(640.0, 480.0);

    #[test]
    fn mirror_flip_known_point() {
        let p = MirrorFlip.map(Point::new(100.0, 50.0), VGA);
        assert_eq!(p, Point::new(540.0, 430.0));
    }

    #[test]
    fn mirror_flip_is_its_own_inverse() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(639.0, 479.0),
            Point::new(-12.5, 700.25),
        ];
        for p in points {
            let back = MirrorFlip.map(MirrorFlip.map(p, VGA), VGA);
            assert_eq!(back, p);
        }
    }

    #[test]
    fn normalize_center_maps_frame_center_to_origin() {
        let mapper = NormalizeCenter::new(4.0, 3.0);
        let p = mapper.map(Point::new(320.0, 240.0), VGA);
        assert!(p.x.abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn normalize_center_flips_vertical_axis() {
        let mapper = NormalizeCenter::new(4.0, 3.0);
        let top_left = mapper.map(Point::new(0.0, 0.0), VGA);
        assert!((top_left.x - (-2.0)).abs() < 1e-6);
        assert!((top_left.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn normalize_center_preserves_midpoints() {
        let mapper = NormalizeCenter::new(4.0, 3.0);
        let a = Point::new(12.0, 400.0);
        let b = Point::new(610.0, 33.0);

        let mapped_mid = mapper.map(a.midpoint(&b), VGA);
        let mid_mapped = mapper.map(a, VGA).midpoint(&mapper.map(b, VGA));

        assert!((mapped_mid.x - mid_mapped.x).abs() < 1e-5);
        assert!((mapped_mid.y - mid_mapped.y).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_points_pass_through() {
        let p = MirrorFlip.map(Point::new(700.0, -20.0), VGA);
        assert_eq!(p, Point::new(-60.0, 500.0));
    }

    #[test]
    fn policy_dispatches_to_strategy() {
        let p = Point::new(100.0, 50.0);
        assert_eq!(MappingPolicy::MirrorFlip.map(p, VGA), MirrorFlip.map(p, VGA));
        assert_eq!(MappingPolicy::Identity.map(p, VGA), p);

        let policy: MappingPolicy = NormalizeCenter::new(4.0, 3.0).into();
        assert_eq!(policy.map(p, VGA), NormalizeCenter::new(4.0, 3.0).map(p, VGA));
    }

    #[test]
    fn policy_deserializes_from_tagged_json() {
        let policy: MappingPolicy =
            serde_json::from_str(r#"{"kind":"normalize_center","scale_x":4.0,"scale_y":3.0}"#)
                .unwrap();
        assert_eq!(
            policy,
            MappingPolicy::NormalizeCenter {
                scale_x: 4.0,
                scale_y: 3.0
            }
        );

        let policy: MappingPolicy = serde_json::from_str(r#"{"kind":"mirror_flip"}"#).unwrap();
        assert_eq!(policy, MappingPolicy::MirrorFlip);
    }
}
