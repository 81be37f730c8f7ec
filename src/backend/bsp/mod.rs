//! Floating-point reference backend: BSP clipping for 3D Booleans, `geo`
//! regions for 2D, with the same contract as an exact engine.

pub mod manifold;
pub mod plane;
pub mod polygon;
pub mod region;
pub mod shapes;
pub mod tree;

use crate::backend::{
    Boundary, FacetCycle, FailureBehaviour, GeometryBackend, HalfFacet, ShellVisitor,
};
use crate::contours::ContourSet;
use crate::errors::BackendError;
use crate::float_types::{Real, EPSILON};
use crate::polyset::PolySet;
use crate::tess::tessellate_contours;
use chull::ConvexHullWrapper;
use geo::{BooleanOps, LineString, MultiPolygon, Polygon as GeoPolygon};
use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Vector3};
use plane::{Plane, COPLANAR, SPANNING};
use polygon::Polygon;
use region::Region;
use std::cell::Cell;

/// 3D payload of the reference backend: a boundary mesh, or the planar
/// section a plane intersection produced.
#[derive(Clone, Debug)]
pub enum Solid {
    Mesh(Vec<Polygon>),
    /// A region in the z=0 plane.
    Section(MultiPolygon<Real>),
}

impl Solid {
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Solid::Mesh(polygons)
    }

    /// Rebuild a solid from PolySet output (used to feed evaluator results
    /// back into the backend).
    pub fn from_polyset(ps: &PolySet) -> Self {
        Solid::Mesh(
            ps.polygons
                .iter()
                .filter_map(|poly| Polygon::new(poly.clone()))
                .collect(),
        )
    }
}

/// The reference [`GeometryBackend`].
///
/// Single-threaded by design; the failure policy is interior-mutable state,
/// as on the exact engines this stands in for. Concurrent evaluators would
/// race on it.
#[derive(Debug)]
pub struct BspBackend {
    behaviour: Cell<FailureBehaviour>,
}

impl BspBackend {
    pub const fn new() -> Self {
        BspBackend {
            behaviour: Cell::new(FailureBehaviour::Abort),
        }
    }

    /// Apply the active failure policy to an internal failure.
    fn raise(&self, err: BackendError) -> BackendError {
        match self.behaviour.get() {
            FailureBehaviour::Abort => panic!("geometry backend failure: {err}"),
            FailureBehaviour::Recover => err,
        }
    }

    /// Difference of two solids. Not part of the evaluator-facing trait;
    /// offered so callers can assemble compound test solids.
    pub fn difference(&self, lhs: &Solid, rhs: &Solid) -> Result<Solid, BackendError> {
        match (lhs, rhs) {
            (Solid::Mesh(a), Solid::Mesh(b)) => {
                Ok(Solid::Mesh(tree::difference_polygons(a, b)))
            },
            _ => Err(self.raise(BackendError::Unsupported("difference on planar section"))),
        }
    }

    /// Cross-section of a mesh with the z=0 plane: facets lying in the
    /// plane, plus the even-odd region bounded by the crossing loops of
    /// spanning facets.
    fn cross_section(&self, polygons: &[Polygon]) -> Result<MultiPolygon<Real>, BackendError> {
        let (coplanar, edges) = section_fragments(polygons);

        let mut section = MultiPolygon::new(Vec::new());
        for ring in assemble_loops(&edges)? {
            let poly = MultiPolygon::new(vec![GeoPolygon::new(ring, vec![])]);
            section = section.xor(&poly);
        }

        for poly in &coplanar {
            let mut coords: Vec<(Real, Real)> =
                poly.vertices.iter().map(|v| (v.x, v.y)).collect();
            if crate::contours::signed_area2(
                &coords
                    .iter()
                    .map(|&(x, y)| Point2::new(x, y))
                    .collect::<Vec<_>>(),
            ) < 0.0
            {
                coords.reverse();
            }
            coords.push(coords[0]);
            let flat = MultiPolygon::new(vec![GeoPolygon::new(LineString::from(coords), vec![])]);
            section = section.union(&flat);
        }

        Ok(section)
    }
}

impl Default for BspBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryBackend for BspBackend {
    type Nef3 = Solid;
    type Nef2 = Region;
    type Polyhedron = Vec<Polygon>;

    fn union3(&self, lhs: &mut Solid, rhs: &Solid) -> Result<(), BackendError> {
        match (&*lhs, rhs) {
            (Solid::Mesh(a), Solid::Mesh(b)) => {
                *lhs = Solid::Mesh(tree::union_polygons(a, b));
                Ok(())
            },
            _ => Err(self.raise(BackendError::Unsupported("union on planar section"))),
        }
    }

    fn intersect3(&self, lhs: &mut Solid, rhs: &Solid) -> Result<(), BackendError> {
        match (&*lhs, rhs) {
            (Solid::Mesh(a), Solid::Mesh(b)) => {
                *lhs = Solid::Mesh(tree::intersect_polygons(a, b));
                Ok(())
            },
            _ => Err(self.raise(BackendError::Unsupported("intersection on planar section"))),
        }
    }

    fn is_simple(&self, solid: &Solid) -> bool {
        match solid {
            Solid::Mesh(polygons) => manifold::is_manifold(polygons),
            Solid::Section(_) => false,
        }
    }

    fn plane_intersection(&self, solid: &Solid) -> Result<Solid, BackendError> {
        match solid {
            Solid::Mesh(polygons) => match self.cross_section(polygons) {
                Ok(section) => Ok(Solid::Section(section)),
                Err(err) => Err(self.raise(err)),
            },
            Solid::Section(_) => {
                Err(self.raise(BackendError::Unsupported("section of planar section")))
            },
        }
    }

    fn walk_shells(
        &self,
        solid: &Solid,
        visitor: &mut dyn ShellVisitor,
    ) -> Result<(), BackendError> {
        match solid {
            Solid::Mesh(polygons) => {
                for poly in polygons {
                    for v in &poly.vertices {
                        visitor.vertex(v);
                    }
                    visitor.half_facet(&HalfFacet {
                        orthogonal_direction: poly.plane.normal(),
                        cycles: vec![FacetCycle::Edges(poly.vertices.clone())],
                    });
                }
            },
            Solid::Section(section) => {
                for poly in section {
                    let cycles: Vec<FacetCycle> = std::iter::once(poly.exterior())
                        .chain(poly.interiors().iter())
                        .map(|ring| {
                            FacetCycle::Edges(
                                ring_points(ring)
                                    .into_iter()
                                    .map(|p| Point3::new(p.x, p.y, 0.0))
                                    .collect(),
                            )
                        })
                        .collect();
                    for cycle in &cycles {
                        if let FacetCycle::Edges(points) = cycle {
                            for p in points {
                                visitor.vertex(p);
                            }
                        }
                    }
                    // Facets come in oriented pairs; the downward partner
                    // carries the same cycles.
                    visitor.half_facet(&HalfFacet {
                        orthogonal_direction: Vector3::z(),
                        cycles: cycles.clone(),
                    });
                    visitor.half_facet(&HalfFacet {
                        orthogonal_direction: -Vector3::z(),
                        cycles,
                    });
                }
            },
        }
        Ok(())
    }

    fn empty_nef2(&self) -> Region {
        Region::empty()
    }

    fn nef2_from_contour(
        &self,
        contour: &[Point2<Real>],
        _boundary: Boundary,
    ) -> Result<Region, BackendError> {
        // Boundary points are always part of a floating-point region; the
        // policy parameter is honored trivially.
        Region::from_contour(contour)
    }

    fn union2(&self, lhs: &mut Region, rhs: &Region) -> Result<(), BackendError> {
        lhs.union_with(rhs);
        Ok(())
    }

    fn intersect2(&self, lhs: &mut Region, rhs: &Region) -> Result<(), BackendError> {
        lhs.intersect_with(rhs);
        Ok(())
    }

    fn convex_hull3(&self, points: &[Point3<Real>]) -> Result<Vec<Polygon>, BackendError> {
        let points_for_hull: Vec<Vec<Real>> =
            points.iter().map(|p| vec![p.x, p.y, p.z]).collect();

        let hull = ConvexHullWrapper::try_new(&points_for_hull, None)
            .map_err(|e| self.raise(BackendError::ConvexHull(format!("{e:?}"))))?;
        let (verts, indices) = hull.vertices_indices();

        let polygons = indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let corner = |i: usize| {
                    let v = &verts[tri[i]];
                    Point3::new(v[0], v[1], v[2])
                };
                Polygon::new(vec![corner(0), corner(1), corner(2)])
            })
            .collect();
        Ok(polygons)
    }

    fn nef3_from_polyhedron(&self, polyhedron: Vec<Polygon>) -> Result<Solid, BackendError> {
        if polyhedron.is_empty() {
            return Err(self.raise(BackendError::ConvexHull("empty hull".into())));
        }
        Ok(Solid::Mesh(polyhedron))
    }

    fn nef3_to_polyset(&self, solid: &Solid) -> Option<PolySet> {
        match solid {
            Solid::Mesh(polygons) => {
                let mut ps = PolySet::new();
                for poly in polygons {
                    for tri in poly.triangulate() {
                        ps.push_polygon(tri.to_vec());
                    }
                }
                Some(ps)
            },
            Solid::Section(_) => None,
        }
    }

    fn nef2_to_polyset(&self, region: &Region) -> PolySet {
        let mut ps = PolySet::new();
        tessellate_contours(&mut ps, &self.nef2_to_contours(region), 0.0, true, true, 0.0);
        ps
    }

    fn nef2_to_contours(&self, region: &Region) -> ContourSet {
        match region.finite() {
            Some(shape) => ContourSet::from_multi_polygon(shape),
            None => {
                log::warn!("cannot extract contours of an unbounded region");
                ContourSet::new()
            },
        }
    }

    fn error_behaviour(&self) -> FailureBehaviour {
        self.behaviour.get()
    }

    fn set_error_behaviour(&self, behaviour: FailureBehaviour) -> FailureBehaviour {
        self.behaviour.replace(behaviour)
    }
}

/// Sort a mesh's facets against the z=0 plane: the facets lying in the
/// plane, and the crossing segments of facets that span it.
fn section_fragments(polygons: &[Polygon]) -> (Vec<&Polygon>, Vec<[Point3<Real>; 2]>) {
    let plane = Plane::new(Vector3::z(), 0.0);

    let mut flat = Vec::new();
    let mut crossings = Vec::new();

    for poly in polygons {
        let count = poly.vertices.len();
        if count < 2 {
            continue;
        }

        let sides: Vec<i8> = poly
            .vertices
            .iter()
            .map(|v| plane.orient_point(v))
            .collect();
        let overall = sides.iter().fold(COPLANAR, |acc, &s| acc | s);

        if overall == COPLANAR {
            flat.push(poly);
            continue;
        }
        if overall != SPANNING {
            continue;
        }

        let mut hits: Vec<Point3<Real>> = Vec::with_capacity(2);
        for i in 0..count {
            let j = (i + 1) % count;
            if (sides[i] | sides[j]) != SPANNING {
                continue;
            }
            let vi = poly.vertices[i];
            let span = poly.vertices[j] - vi;
            let denom = plane.normal().dot(&span);
            if denom.abs() > EPSILON {
                let t = (plane.offset() - plane.normal().dot(&vi.coords)) / denom;
                hits.push(vi + span * t);
            }
        }
        crossings.extend(hits.chunks_exact(2).map(|pair| [pair[0], pair[1]]));
    }

    (flat, crossings)
}

/// Ring coordinates without the closing duplicate.
fn ring_points(ring: &LineString<Real>) -> Vec<Point2<Real>> {
    let mut pts: Vec<Point2<Real>> = ring.coords().map(|c| Point2::new(c.x, c.y)).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}

/// Chain crossing segments into closed rings. Endpoints are matched after
/// quantization; a chain that cannot close is a failed intersection.
fn assemble_loops(
    edges: &[[Point3<Real>; 2]],
) -> Result<Vec<LineString<Real>>, BackendError> {
    const QUANTIZATION_FACTOR: Real = 1e7;
    let key = |p: &Point3<Real>| {
        (
            (p.x * QUANTIZATION_FACTOR).round() as i64,
            (p.y * QUANTIZATION_FACTOR).round() as i64,
        )
    };

    // Adjacency from quantized endpoint to incident edges.
    let mut incident: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    let mut segments = Vec::new();
    for edge in edges {
        let (a, b) = (key(&edge[0]), key(&edge[1]));
        if a == b {
            continue;
        }
        let idx = segments.len();
        segments.push((a, b, edge));
        incident.entry(a).or_default().push(idx);
        incident.entry(b).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (start_key, mut cursor, edge) = segments[start];
        let mut ring: Vec<(Real, Real)> = vec![
            (edge[0].x, edge[0].y),
            (edge[1].x, edge[1].y),
        ];

        while cursor != start_key {
            let next = incident
                .get(&cursor)
                .and_then(|candidates| {
                    candidates.iter().copied().find(|&i| !used[i])
                })
                .ok_or_else(|| {
                    BackendError::PlaneIntersection("open intersection chain".into())
                })?;
            used[next] = true;
            let (a, b, edge) = segments[next];
            let far = if a == cursor { b } else { a };
            let far_point = if a == cursor { edge[1] } else { edge[0] };
            ring.push((far_point.x, far_point.y));
            cursor = far;
        }

        // Drop the re-visited start point; LineString closes rings itself.
        ring.pop();
        if ring.len() >= 3 {
            let mut coords = ring;
            coords.push(coords[0]);
            loops.push(LineString::from(coords));
        }
    }

    Ok(loops)
}
