//! `PolySet`: the triangle-soup output carrier of the evaluators.

use crate::float_types::Real;
use nalgebra::Point3;
use parry3d_f64::bounding_volume::Aabb;

/// Ordered sequence of polygons, each an ordered vertex list in 3D, plus a
/// convexity hint passed through from the generating node.
///
/// Winding carries orientation: consumers derive facet normals from vertex
/// order, so every generator in this crate keeps outward normals on outer
/// shells and inward normals on holes.
#[derive(Clone, Debug, PartialEq)]
pub struct PolySet {
    /// Polygons in generation order. After evaluation every entry is a
    /// triangle, except the planar n-gons a shadow projection may emit.
    pub polygons: Vec<Vec<Point3<Real>>>,
    /// Advisory hint for downstream rendering.
    pub convexity: u32,
}

impl PolySet {
    pub const fn new() -> Self {
        PolySet {
            polygons: Vec::new(),
            convexity: 1,
        }
    }

    /// Append one polygon given its vertices in order.
    pub fn push_polygon(&mut self, vertices: Vec<Point3<Real>>) {
        self.polygons.push(vertices);
    }

    /// Append a triangle, reversing the winding when `reversed`.
    pub fn push_triangle(
        &mut self,
        a: Point3<Real>,
        b: Point3<Real>,
        c: Point3<Real>,
        reversed: bool,
    ) {
        if reversed {
            self.polygons.push(vec![c, b, a]);
        } else {
            self.polygons.push(vec![a, b, c]);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Axis-aligned bounds of every vertex, or a trivial box at the origin
    /// for an empty set.
    pub fn bounding_box(&self) -> Aabb {
        let mut min = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut max = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

        for poly in &self.polygons {
            for v in poly {
                min.x = min.x.min(v.x);
                min.y = min.y.min(v.y);
                min.z = min.z.min(v.z);
                max.x = max.x.max(v.x);
                max.y = max.y.max(v.y);
                max.z = max.z.max(v.z);
            }
        }

        if min.x > max.x {
            return Aabb::new(Point3::origin(), Point3::origin());
        }
        Aabb::new(min, max)
    }
}

impl Default for PolySet {
    fn default() -> Self {
        Self::new()
    }
}
