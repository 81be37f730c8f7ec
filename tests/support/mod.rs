//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use polycast::backend::bsp::polygon::Polygon;
use polycast::backend::bsp::region::Region;
use polycast::backend::bsp::{BspBackend, Solid};
use polycast::backend::{
    Boundary, FailureBehaviour, GeometryBackend, ShellVisitor,
};
use polycast::contours::{ContourPath, ContourSet};
use polycast::errors::BackendError;
use polycast::float_types::Real;
use polycast::polyset::PolySet;
use nalgebra::{Point2, Point3};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Signed volume of a closed triangulated PolySet, from the divergence
/// theorem: V = Σ a · (b × c) / 6 over outward-wound triangles.
pub fn signed_volume(ps: &PolySet) -> Real {
    ps.polygons
        .iter()
        .map(|tri| {
            let (a, b, c) = (tri[0].coords, tri[1].coords, tri[2].coords);
            a.dot(&b.cross(&c)) / 6.0
        })
        .sum()
}

/// Summed signed area of the polygons of a planar PolySet in the XY plane
/// (positive for counter-clockwise winding).
pub fn signed_area_xy(ps: &PolySet) -> Real {
    ps.polygons
        .iter()
        .map(|poly| {
            let n = poly.len();
            let mut sum = 0.0;
            for i in 0..n {
                let j = (i + 1) % n;
                sum += poly[i].x * poly[j].y - poly[j].x * poly[i].y;
            }
            sum / 2.0
        })
        .sum()
}

/// Assert no triangle of `ps` has bit-identical vertices, nor collinear
/// vertices under a relative tolerance.
pub fn assert_no_degenerate_triangles(ps: &PolySet) {
    for tri in &ps.polygons {
        assert_eq!(tri.len(), 3, "output polygon is not a triangle");
        assert!(
            tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0],
            "triangle has coincident vertices: {tri:?}"
        );
        let ab = tri[1] - tri[0];
        let ac = tri[2] - tri[0];
        let area2 = ab.cross(&ac).norm();
        let longest = ab.norm().max(ac.norm()).max((tri[2] - tri[1]).norm());
        assert!(
            area2 > 1e-6 * longest * longest,
            "triangle is collinear: {tri:?}"
        );
    }
}

/// A contour set holding the unit square (outer contours are clockwise).
pub fn unit_square_contours() -> ContourSet {
    contour_set(&[(
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
        true,
        false,
    )])
}

/// Unit square with a centered 0.5×0.5 hole (holes are counter-clockwise).
pub fn square_with_hole_contours() -> ContourSet {
    contour_set(&[
        (
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
            true,
            false,
        ),
        (
            vec![(0.25, 0.25), (0.75, 0.25), (0.75, 0.75), (0.25, 0.75)],
            true,
            true,
        ),
    ])
}

/// Build a contour set from `(points, is_closed, is_inner)` triples.
pub fn contour_set(paths: &[(Vec<(Real, Real)>, bool, bool)]) -> ContourSet {
    let mut set = ContourSet::new();
    for (pts, is_closed, is_inner) in paths {
        let start = set.points.len();
        set.points
            .extend(pts.iter().map(|&(x, y)| Point2::new(x, y)));
        set.paths.push(ContourPath {
            indices: (start..set.points.len()).collect(),
            is_closed: *is_closed,
            is_inner: *is_inner,
        });
    }
    set
}

/// A tetrahedron with its apex at the origin and the opposite face parallel
/// to the XY plane at z=1.
pub fn tetrahedron() -> Solid {
    let apex = Point3::new(0.0, 0.0, 0.0);
    let a = Point3::new(2.0, 0.0, 1.0);
    let b = Point3::new(-1.0, 2.0, 1.0);
    let c = Point3::new(-1.0, -2.0, 1.0);

    Solid::from_polygons(
        [
            vec![a, b, c],
            vec![apex, b, a],
            vec![apex, c, b],
            vec![apex, a, c],
        ]
        .into_iter()
        .filter_map(Polygon::new)
        .collect(),
    )
}

/// Backend test double whose plane intersection (and optionally convex
/// hull) always fails, delegating everything else to a real [`BspBackend`].
pub struct FailingBackend {
    pub inner: BspBackend,
    pub fail_hull: bool,
}

impl FailingBackend {
    pub fn new(fail_hull: bool) -> Self {
        FailingBackend {
            inner: BspBackend::new(),
            fail_hull,
        }
    }
}

impl GeometryBackend for FailingBackend {
    type Nef3 = Solid;
    type Nef2 = Region;
    type Polyhedron = Vec<Polygon>;

    fn union3(&self, lhs: &mut Solid, rhs: &Solid) -> Result<(), BackendError> {
        self.inner.union3(lhs, rhs)
    }

    fn intersect3(&self, lhs: &mut Solid, rhs: &Solid) -> Result<(), BackendError> {
        self.inner.intersect3(lhs, rhs)
    }

    fn is_simple(&self, solid: &Solid) -> bool {
        self.inner.is_simple(solid)
    }

    fn plane_intersection(&self, _solid: &Solid) -> Result<Solid, BackendError> {
        Err(BackendError::PlaneIntersection("forced failure".into()))
    }

    fn walk_shells(
        &self,
        solid: &Solid,
        visitor: &mut dyn ShellVisitor,
    ) -> Result<(), BackendError> {
        self.inner.walk_shells(solid, visitor)
    }

    fn empty_nef2(&self) -> Region {
        self.inner.empty_nef2()
    }

    fn nef2_from_contour(
        &self,
        contour: &[Point2<Real>],
        boundary: Boundary,
    ) -> Result<Region, BackendError> {
        self.inner.nef2_from_contour(contour, boundary)
    }

    fn union2(&self, lhs: &mut Region, rhs: &Region) -> Result<(), BackendError> {
        self.inner.union2(lhs, rhs)
    }

    fn intersect2(&self, lhs: &mut Region, rhs: &Region) -> Result<(), BackendError> {
        self.inner.intersect2(lhs, rhs)
    }

    fn convex_hull3(&self, points: &[Point3<Real>]) -> Result<Vec<Polygon>, BackendError> {
        if self.fail_hull {
            return Err(BackendError::ConvexHull("forced failure".into()));
        }
        self.inner.convex_hull3(points)
    }

    fn nef3_from_polyhedron(&self, polyhedron: Vec<Polygon>) -> Result<Solid, BackendError> {
        self.inner.nef3_from_polyhedron(polyhedron)
    }

    fn nef3_to_polyset(&self, solid: &Solid) -> Option<PolySet> {
        self.inner.nef3_to_polyset(solid)
    }

    fn nef2_to_polyset(&self, region: &Region) -> PolySet {
        self.inner.nef2_to_polyset(region)
    }

    fn nef2_to_contours(&self, region: &Region) -> ContourSet {
        self.inner.nef2_to_contours(region)
    }

    fn error_behaviour(&self) -> FailureBehaviour {
        self.inner.error_behaviour()
    }

    fn set_error_behaviour(&self, behaviour: FailureBehaviour) -> FailureBehaviour {
        self.inner.set_error_behaviour(behaviour)
    }
}
