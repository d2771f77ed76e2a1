//! Render targets that consume overlay geometry.
//!
//! Two kinds are provided: [`CanvasTarget`] paints the fan into an RGBA
//! raster every frame (immediate mode), while [`MeshTarget`] keeps vertex and
//! index buffers around and only marks them dirty when the geometry changes
//! (retained mode, the way a scene-graph mesh is updated).

use std::path::Path;

use image::{Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fan::FanPolygon;
use crate::style::OverlayStyle;
use crate::types::{FrameSize, Point};

/// Something that can show an overlay polygon.
pub trait RenderTarget {
    /// Replace whatever is shown with `overlay` painted in `style`.
    fn draw(&mut self, overlay: &FanPolygon, style: &OverlayStyle) -> Result<()>;

    /// Stop showing the overlay.
    fn hide(&mut self) -> Result<()>;

    /// Finish the frame.
    fn present(&mut self) -> Result<()>;
}

/// Which render target the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderBackend {
    #[default]
    Mesh,
    Canvas,
}

/// Vertical origin of canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasOrigin {
    #[default]
    TopLeft,
    /// Rows count up from the bottom edge, as after a vertical flip.
    BottomLeft,
}

/// Immediate-mode 2D target: fills the fan into a raster each frame.
#[derive(Debug, Clone)]
pub struct CanvasTarget {
    background: Option<RgbaImage>,
    canvas: RgbaImage,
    origin: CanvasOrigin,
    frames_presented: u64,
}

impl CanvasTarget {
    /// A transparent overlay layer of the given pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            background: None,
            canvas: RgbaImage::new(width, height),
            origin: CanvasOrigin::TopLeft,
            frames_presented: 0,
        }
    }

    pub fn for_frame(frame: FrameSize) -> Self {
        Self::new(frame.width.max(0.0) as u32, frame.height.max(0.0) as u32)
    }

    /// Composite the overlay onto a copy of `background` (e.g. the video frame)
    /// instead of a transparent layer.
    pub fn with_background(background: RgbaImage) -> Self {
        Self {
            canvas: background.clone(),
            background: Some(background),
            origin: CanvasOrigin::TopLeft,
            frames_presented: 0,
        }
    }

    pub fn with_origin(mut self, origin: CanvasOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.canvas.save(path)?;
        Ok(())
    }

    fn clear(&mut self) {
        match &self.background {
            Some(bg) => self.canvas.clone_from(bg),
            None => self
                .canvas
                .pixels_mut()
                .for_each(|p| *p = Rgba([0, 0, 0, 0])),
        }
    }

    fn to_canvas(&self, p: Point) -> Point {
        match self.origin {
            CanvasOrigin::TopLeft => p,
            CanvasOrigin::BottomLeft => Point::new(p.x, self.canvas.height() as f32 - p.y),
        }
    }

    /// Pixels whose centres fall inside any triangle of the fan. Computed as a
    /// mask first so shared edges are only blended once.
    fn coverage(&self, overlay: &FanPolygon) -> Vec<bool> {
        let (w, h) = self.canvas.dimensions();
        let mut mask = vec![false; (w as usize) * (h as usize)];
        if w == 0 || h == 0 {
            return mask;
        }

        for [a, b, c] in overlay.triangles() {
            let v0 = self.to_canvas(overlay.vertices[a as usize]);
            let v1 = self.to_canvas(overlay.vertices[b as usize]);
            let v2 = self.to_canvas(overlay.vertices[c as usize]);
            let finite = [v0, v1, v2].iter().all(|v| v.x.is_finite() && v.y.is_finite());
            if !finite || edge(&v0, &v1, &v2) == 0.0 {
                continue;
            }

            let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as u32;
            let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as u32;
            let max_x = v0.x.max(v1.x).max(v2.x).ceil().min((w - 1) as f32);
            let max_y = v0.y.max(v1.y).max(v2.y).ceil().min((h - 1) as f32);
            if max_x < 0.0 || max_y < 0.0 {
                continue;
            }

            for y in min_y..=max_y as u32 {
                for x in min_x..=max_x as u32 {
                    let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    if point_in_triangle(&centre, &v0, &v1, &v2) {
                        mask[(y * w + x) as usize] = true;
                    }
                }
            }
        }
        mask
    }
}

impl RenderTarget for CanvasTarget {
    fn draw(&mut self, overlay: &FanPolygon, style: &OverlayStyle) -> Result<()> {
        self.clear();
        let mask = self.coverage(overlay);
        let w = self.canvas.width();
        let src = [style.color.r, style.color.g, style.color.b];

        let mut filled = 0usize;
        for (i, covered) in mask.iter().enumerate() {
            if *covered {
                let x = i as u32 % w;
                let y = i as u32 / w;
                blend(self.canvas.get_pixel_mut(x, y), src, style.opacity);
                filled += 1;
            }
        }
        debug!("canvas: filled {} pixels", filled);
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.clear();
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames_presented += 1;
        Ok(())
    }
}

/// Source-over blend of an opaque colour at `alpha` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f32) {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let s = src[c] as f32;
        let d = dst[c] as f32;
        let v = (s * alpha + d * dst_a * (1.0 - alpha)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

fn edge(a: &Point, b: &Point, c: &Point) -> f32 {
    (a.x - c.x) * (b.y - c.y) - (b.x - c.x) * (a.y - c.y)
}

/// Accepts either winding; points on an edge count as inside.
fn point_in_triangle(p: &Point, v0: &Point, v1: &Point, v2: &Point) -> bool {
    let d1 = edge(p, v0, v1);
    let d2 = edge(p, v1, v2);
    let d3 = edge(p, v2, v0);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

/// Retained-mode target: owns the mesh buffers a 3D renderer would upload.
#[derive(Debug, Clone, Default)]
pub struct MeshTarget {
    positions: Vec<f32>,
    indices: Vec<u32>,
    style: OverlayStyle,
    visible: bool,
    version: u64,
    frames_presented: u64,
}

impl MeshTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interleaved `x, y, z` positions.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Bumped each time the buffers are replaced with different geometry.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl RenderTarget for MeshTarget {
    fn draw(&mut self, overlay: &FanPolygon, style: &OverlayStyle) -> Result<()> {
        let positions = overlay.flat_positions();
        if positions != self.positions || overlay.indices != self.indices {
            self.positions = positions;
            self.indices.clear();
            self.indices.extend_from_slice(&overlay.indices);
            self.version += 1;
            debug!(
                "mesh: uploaded {} vertices, {} indices (version {})",
                self.positions.len() / 3,
                self.indices.len(),
                self.version
            );
        }
        self.style = *style;
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.visible = false;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames_presented += 1;
        Ok(())
    }
}

/// A render target chosen at runtime from [`RenderBackend`].
#[derive(Debug, Clone)]
pub enum AnyTarget {
    Canvas(CanvasTarget),
    Mesh(MeshTarget),
}

impl AnyTarget {
    pub fn for_backend(backend: RenderBackend, frame: FrameSize, origin: CanvasOrigin) -> Self {
        match backend {
            RenderBackend::Canvas => {
                AnyTarget::Canvas(CanvasTarget::for_frame(frame).with_origin(origin))
            }
            RenderBackend::Mesh => AnyTarget::Mesh(MeshTarget::new()),
        }
    }

    pub fn as_canvas(&self) -> Option<&CanvasTarget> {
        match self {
            AnyTarget::Canvas(c) => Some(c),
            AnyTarget::Mesh(_) => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshTarget> {
        match self {
            AnyTarget::Mesh(m) => Some(m),
            AnyTarget::Canvas(_) => None,
        }
    }
}

impl RenderTarget for AnyTarget {
    fn draw(&mut self, overlay: &FanPolygon, style: &OverlayStyle) -> Result<()> {
        match self {
            AnyTarget::Canvas(c) => c.draw(overlay, style),
            AnyTarget::Mesh(m) => m.draw(overlay, style),
        }
    }

    fn hide(&mut self) -> Result<()> {
        match self {
            AnyTarget::Canvas(c) => c.hide(),
            AnyTarget::Mesh(m) => m.hide(),
        }
    }

    fn present(&mut self) -> Result<()> {
        match self {
            AnyTarget::Canvas(c) => c.present(),
            AnyTarget::Mesh(m) => m.present(),
        }
    }
}

impl<T: RenderTarget + ?Sized> RenderTarget for &mut T {
    fn draw(&mut self, overlay: &FanPolygon, style: &OverlayStyle) -> Result<()> {
        (**self).draw(overlay, style)
    }

    fn hide(&mut self) -> Result<()> {
        (**self).hide()
    }

    fn present(&mut self) -> Result<()> {
        (**self).present()
    }
}
