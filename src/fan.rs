//! Triangle-fan polygons built from an ordered contour ring.
//!
//! The ring's vertices are kept in their given order and a synthetic centroid
//! vertex is appended after them. Every boundary edge `(i, i + 1)` is joined to
//! that centroid, giving exactly one triangle per ring vertex. The result
//! covers the polygon interior exactly when the ring is simple and
//! consistently wound; self-intersecting or duplicated rings still produce a
//! fan, just with overlapping or degenerate triangles.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::Point;

/// Vertex and index buffers for one overlay polygon.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FanPolygon {
    /// Ring vertices in contour order, followed by the centroid.
    pub vertices: Vec<Point>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl FanPolygon {
    /// Number of ring vertices (the centroid excluded).
    pub fn ring_len(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index of the centroid vertex.
    pub fn center_index(&self) -> u32 {
        self.ring_len() as u32
    }

    pub fn centroid(&self) -> Option<Point> {
        self.vertices.last().copied()
    }

    /// The ring without the centroid.
    pub fn outline(&self) -> &[Point] {
        &self.vertices[..self.ring_len()]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Interleaved `x, y, z` positions with `z = 0`, the layout a 3D position
    /// buffer attribute expects.
    pub fn flat_positions(&self) -> Vec<f32> {
        let mut v = Vec::with_capacity(self.vertices.len() * 3);
        for p in &self.vertices {
            v.push(p.x);
            v.push(p.y);
            v.push(0.0);
        }
        v
    }

    /// Sum of the absolute fan triangle areas.
    ///
    /// Matches [`polygon_area`] of the outline for a simple ring around its
    /// centroid; exceeds it when triangles overlap.
    pub fn area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| {
                triangle_area(
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                )
            })
            .sum()
    }
}

/// Build a triangle fan over an ordered ring of points.
///
/// Produces `n + 1` vertices (the ring, then its centroid at index `n`) and
/// `3 * n` indices: `(i, (i + 1) % n, n)` for every `i` in `0..n`.
///
/// Returns [`Error::InvalidInput`] for an empty ring, which has no centroid.
pub fn build_fan(points: &[Point]) -> Result<FanPolygon> {
    if points.is_empty() {
        return Err(Error::InvalidInput(
            "cannot build a fan from an empty contour".into(),
        ));
    }

    let n = points.len();
    let center = centroid(points);

    let mut vertices = Vec::with_capacity(n + 1);
    vertices.extend_from_slice(points);
    vertices.push(center);

    let center_index = n as u32;
    let mut indices = Vec::with_capacity(n * 3);
    for i in 0..n {
        indices.push(i as u32);
        indices.push(((i + 1) % n) as u32);
        indices.push(center_index);
    }

    Ok(FanPolygon { vertices, indices })
}

/// Componentwise mean. Callers guarantee a non-empty slice.
fn centroid(points: &[Point]) -> Point {
    let mut sum = Point::zero();
    for p in points {
        sum += *p;
    }
    sum * (1.0 / points.len() as f32)
}

/// Area of a closed polygon using the shoelace formula.
pub fn polygon_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = points.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    (area / 2.0).abs()
}

fn triangle_area(a: Point, b: Point, c: Point) -> f32 {
    let ab = b - a;
    let ac = c - a;
    (ab.x * ac.y - ab.y * ac.x).abs() / 2.0
}
