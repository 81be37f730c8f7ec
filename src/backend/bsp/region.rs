//! 2D regions with Nef-style mark semantics over `geo` Boolean operations.

use crate::contours::signed_area2;
use crate::errors::BackendError;
use crate::float_types::{Real, EPSILON};
use geo::{BooleanOps, LineString, MultiPolygon, Polygon as GeoPolygon};
use nalgebra::Point2;

/// A regularized 2D point set: either a finite region or the complement of
/// one.
///
/// A counter-clockwise contour constructs the finite interior; a clockwise
/// contour constructs the complement of its interior. Intersecting an
/// accumulator with such a complement subtracts the hole, which is exactly
/// how hole cycles combine during flattening.
#[derive(Clone, Debug)]
pub struct Region {
    shape: MultiPolygon<Real>,
    complemented: bool,
}

enum Op {
    Union,
    Intersection,
}

impl Region {
    pub fn empty() -> Self {
        Region {
            shape: MultiPolygon::new(Vec::new()),
            complemented: false,
        }
    }

    pub fn from_multi_polygon(shape: MultiPolygon<Real>) -> Self {
        Region {
            shape,
            complemented: false,
        }
    }

    /// Build a region from a contour; the winding decides the mark (see the
    /// type docs). `Err` on contours with fewer than 3 distinct points or
    /// no area.
    pub fn from_contour(points: &[Point2<Real>]) -> Result<Self, BackendError> {
        let mut ring: Vec<Point2<Real>> = Vec::with_capacity(points.len());
        for &p in points {
            if ring.last() != Some(&p) {
                ring.push(p);
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(BackendError::DegenerateContour);
        }

        let area2 = signed_area2(&ring);
        if area2.abs() < EPSILON {
            return Err(BackendError::DegenerateContour);
        }
        let complemented = area2 < 0.0;

        let mut coords: Vec<(Real, Real)> =
            ring.iter().map(|p| (p.x, p.y)).collect();
        coords.push(coords[0]);
        let polygon = GeoPolygon::new(LineString::from(coords), vec![]);

        Ok(Region {
            shape: MultiPolygon::new(vec![polygon]),
            complemented,
        })
    }

    pub fn is_empty(&self) -> bool {
        !self.complemented && self.shape.0.is_empty()
    }

    /// The finite shape, when this region is not a complement.
    pub fn finite(&self) -> Option<&MultiPolygon<Real>> {
        (!self.complemented).then_some(&self.shape)
    }

    pub fn union_with(&mut self, other: &Region) {
        *self = self.binary(other, Op::Union);
    }

    pub fn intersect_with(&mut self, other: &Region) {
        *self = self.binary(other, Op::Intersection);
    }

    /// Binary Boolean on possibly-complemented operands, rewritten through
    /// De Morgan so only finite `geo` operations run.
    fn binary(&self, other: &Region, op: Op) -> Region {
        let (a, b) = (&self.shape, &other.shape);
        match (self.complemented, other.complemented, op) {
            (false, false, Op::Union) => Region::from_multi_polygon(a.union(b)),
            (false, false, Op::Intersection) => Region::from_multi_polygon(a.intersection(b)),
            // A ∪ ¬B = ¬(B \ A)
            (false, true, Op::Union) => Region {
                shape: b.difference(a),
                complemented: true,
            },
            // A ∩ ¬B = A \ B
            (false, true, Op::Intersection) => Region::from_multi_polygon(a.difference(b)),
            (true, false, Op::Union) => Region {
                shape: a.difference(b),
                complemented: true,
            },
            (true, false, Op::Intersection) => Region::from_multi_polygon(b.difference(a)),
            (true, true, Op::Union) => Region {
                shape: a.intersection(b),
                complemented: true,
            },
            (true, true, Op::Intersection) => Region {
                shape: a.union(b),
                complemented: true,
            },
        }
    }
}
