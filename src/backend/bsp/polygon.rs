//! 3D polygon with a cached plane: the unit the BSP backend clips.

use crate::backend::bsp::plane::Plane;
use crate::float_types::{Real, EPSILON};
use geo::{LineString, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::{Point3, Vector3};

/// A planar, oriented polygon. Winding agrees with the plane normal: the
/// ring runs counter-clockwise when viewed from the normal side.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub vertices: Vec<Point3<Real>>,
    pub plane: Plane,
}

impl Polygon {
    /// Build a polygon from at least three vertices; `None` when the ring
    /// spans no plane.
    pub fn new(vertices: Vec<Point3<Real>>) -> Option<Self> {
        let plane = Plane::from_points(&vertices)?;
        Some(Polygon { vertices, plane })
    }

    /// Build a polygon that inherits a known plane (used for split parts,
    /// where recomputing the plane from clipped vertices would drift).
    pub fn with_plane(vertices: Vec<Point3<Real>>, plane: Plane) -> Self {
        Polygon { vertices, plane }
    }

    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Triangulate in the polygon's plane, preserving the winding.
    pub fn triangulate(&self) -> Vec<[Point3<Real>; 3]> {
        if self.vertices.len() == 3 {
            return vec![[self.vertices[0], self.vertices[1], self.vertices[2]]];
        }

        // Right-handed in-plane basis, so counter-clockwise 2D coordinates
        // correspond to the facing of the polygon.
        let normal = self.plane.normal();
        let reference = if normal.x.abs() < 0.5 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = normal.cross(&reference).normalize();
        let v = normal.cross(&u);

        let origin = self.vertices[0];
        let flat: Vec<(Real, Real)> = self
            .vertices
            .iter()
            .map(|p| {
                let d = p - origin;
                (d.dot(&u), d.dot(&v))
            })
            .collect();

        let mut ring = flat.clone();
        ring.push(ring[0]);
        let poly2d = GeoPolygon::new(LineString::from(ring), vec![]);

        let mut triangles = Vec::new();
        for tri in poly2d.earcut_triangles() {
            let corners = [tri.0, tri.1, tri.2];
            let area2 = (corners[1].x - corners[0].x) * (corners[2].y - corners[0].y)
                - (corners[2].x - corners[0].x) * (corners[1].y - corners[0].y);
            if area2.abs() < EPSILON {
                continue;
            }
            let mut lifted = corners.map(|c| origin + u * c.x + v * c.y);
            if area2 < 0.0 {
                lifted.swap(1, 2);
            }
            triangles.push(lifted);
        }
        triangles
    }
}
