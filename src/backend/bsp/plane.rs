//! Splitting plane used by the BSP reference backend.

use crate::backend::bsp::polygon::Polygon;
use crate::float_types::{Real, EPSILON};
use nalgebra::{Point3, Vector3};

pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// An oriented plane in Hessian normal form: `normal · p = offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    normal: Vector3<Real>,
    offset: Real,
}

impl Plane {
    /// Build a plane from a (not necessarily unit) normal and offset.
    pub fn new(normal: Vector3<Real>, offset: Real) -> Self {
        let len = normal.norm();
        Plane {
            normal: normal / len,
            offset: offset / len,
        }
    }

    /// Plane spanned by a vertex ring, via Newell's method. `None` when the
    /// ring is degenerate and spans no plane.
    pub fn from_points(points: &[Point3<Real>]) -> Option<Self> {
        let n = points.len();
        if n < 3 {
            return None;
        }
        let mut normal = Vector3::<Real>::zeros();
        for i in 0..n {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        let len = normal.norm();
        if len < EPSILON {
            return None;
        }
        let normal = normal / len;
        Some(Plane {
            normal,
            offset: normal.dot(&points[0].coords),
        })
    }

    pub fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub fn offset(&self) -> Real {
        self.offset
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }

    /// Classify a point against the plane.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let t = self.normal.dot(&point.coords) - self.offset;
        if t < -EPSILON {
            BACK
        } else if t > EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Whether a coplanar plane faces the same way as this one.
    pub fn orient_plane(&self, other: &Plane) -> i8 {
        if self.normal.dot(&other.normal) > 0.0 {
            FRONT
        } else {
            BACK
        }
    }

    /// Split `polygon` by this plane into
    /// `(coplanar_front, coplanar_back, front, back)` parts. Spanning
    /// polygons get new vertices on the crossing edges; split parts keep
    /// the source polygon's plane.
    pub fn split_polygon(
        &self,
        polygon: &Polygon,
    ) -> (Vec<Polygon>, Vec<Polygon>, Vec<Polygon>, Vec<Polygon>) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point(v))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.orient_plane(&polygon.plane) == FRONT {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let ti = types[i];
                    let tj = types[j];
                    let vi = polygon.vertices[i];
                    let vj = polygon.vertices[j];

                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let denom = self.normal.dot(&(vj - vi));
                        if denom.abs() > EPSILON {
                            let t = (self.offset - self.normal.dot(&vi.coords)) / denom;
                            let v = vi + (vj - vi) * t;
                            f.push(v);
                            b.push(v);
                        }
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon::with_plane(f, polygon.plane.clone()));
                }
                if b.len() >= 3 {
                    back.push(Polygon::with_plane(b, polygon.plane.clone()));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }
}
